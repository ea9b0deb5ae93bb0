//! Normalizes a parsed fragment before it is handed to htmd.
//!
//! The fragment is re-serialized with an explicit stack. On the way, subtrees
//! nested deeper than [`MAX_DEPTH`] are flattened to their text, and elements
//! whose Markdown depends on their structure (tables, `pre > code`) get that
//! Markdown attached as [`MARKDOWN_ATTR`] for the matching handler to emit.

use crate::dom::{HtmlNode, MarkupNode, is_non_content};
use crate::formatters::rules::{render_fenced_code, render_table};

/// Attribute carrying Markdown rendered ahead of the htmd walk.
pub const MARKDOWN_ATTR: &str = "data-copydown-markdown";

/// Deepest element nesting passed to htmd. Anything below is kept as text.
pub const MAX_DEPTH: usize = 128;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

enum Step<'a> {
    Open(HtmlNode<'a>, usize),
    Close(&'a str),
}

/// Serialize the children of `root` for conversion.
pub fn prepare(root: &HtmlNode<'_>) -> String {
    let mut out = String::new();
    let mut stack: Vec<Step<'_>> = root.children().into_iter().rev().map(|child| Step::Open(child, 1)).collect();

    while let Some(step) = stack.pop() {
        let (node, depth) = match step {
            Step::Close(name) => {
                push_close_tag(&mut out, name);
                continue;
            }
            Step::Open(node, depth) => (node, depth),
        };

        let element = match node {
            HtmlNode::Text(text) => {
                push_escaped_text(&mut out, text);
                continue;
            }
            HtmlNode::Element(element) => element,
        };

        let name = element.value().name();
        if is_non_content(name) {
            continue;
        }
        if depth > MAX_DEPTH {
            push_escaped_text(&mut out, &node.text_content());
            continue;
        }

        let markdown = match name {
            "table" => Some(render_table(&node)),
            "pre" => render_fenced_code(&node),
            _ => None,
        };

        out.push('<');
        out.push_str(name);
        for (key, value) in element.value().attrs() {
            push_attr(&mut out, key, value);
        }
        if let Some(markdown) = &markdown {
            push_attr(&mut out, MARKDOWN_ATTR, markdown);
        }
        out.push('>');

        if VOID_TAGS.contains(&name) {
            continue;
        }

        stack.push(Step::Close(name));
        stack.extend(node.children().into_iter().rev().map(|child| Step::Open(child, depth + 1)));
    }

    out
}

fn push_close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ch => out.push(ch),
        }
    }
    out.push('"');
}

fn push_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ch => out.push(ch),
        }
    }
}
