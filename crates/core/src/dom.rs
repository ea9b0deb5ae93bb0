//! Minimal tree interface shared by the extractor and the converter.
//!
//! The extraction walks (main-content text measurement, selection text) and
//! the structural Markdown rules (tables, code fences) are written against
//! [`MarkupNode`] rather than a concrete DOM. [`HtmlNode`] implements it over
//! a parsed `scraper` tree; any other tree-shaped HTML representation can do
//! the same.

use scraper::{ElementRef, Node};

/// Elements whose text never reaches the reader.
pub const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link", "iframe", "svg", "canvas", "object",
    "embed",
];

/// Elements rendered as their own block, separated from surrounding content.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas", "center", "dd", "details", "dialog",
    "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "frameset", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "menu", "nav", "noframes", "ol", "output", "p",
    "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Returns true when `name` is a block-level element.
pub fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Returns true when `name` never contributes readable text.
pub fn is_non_content(name: &str) -> bool {
    NON_CONTENT_TAGS.contains(&name)
}

/// Capabilities a tree node must expose to be extracted or converted.
///
/// A node is either an element (it has a name, attributes and ordered
/// children) or a text leaf. Element names are lowercase.
pub trait MarkupNode: Sized {
    /// Lowercase tag name, or `None` for a text leaf.
    fn element_name(&self) -> Option<&str>;

    /// Attribute value by name. Always `None` for text leaves.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Text of a text leaf, or `None` for an element.
    fn text(&self) -> Option<&str>;

    /// Ordered child nodes. Comments and other non-content nodes are omitted.
    fn children(&self) -> Vec<Self>;

    fn is_element(&self, name: &str) -> bool {
        self.element_name() == Some(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Concatenation of every descendant text leaf, untouched.
    fn text_content(&self) -> String {
        if let Some(text) = self.text() {
            return text.to_string();
        }

        let mut out = String::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node.text() {
                Some(text) => out.push_str(text),
                None => stack.extend(node.children().into_iter().rev()),
            }
        }
        out
    }

    /// First child that is not a whitespace-only text leaf.
    fn first_significant_child(&self) -> Option<Self> {
        self.children()
            .into_iter()
            .find(|child| child.text().is_none_or(|text| !text.trim().is_empty()))
    }
}

/// A node of a `scraper` tree: an element or a text leaf.
#[derive(Debug, Clone, Copy)]
pub enum HtmlNode<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

impl<'a> HtmlNode<'a> {
    /// Serialized HTML of this node.
    pub fn outer_html(&self) -> String {
        match self {
            HtmlNode::Element(element) => element.html(),
            HtmlNode::Text(text) => text.to_string(),
        }
    }
}

impl<'a> From<ElementRef<'a>> for HtmlNode<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        HtmlNode::Element(element)
    }
}

impl MarkupNode for HtmlNode<'_> {
    fn element_name(&self) -> Option<&str> {
        match self {
            HtmlNode::Element(element) => Some(element.value().name()),
            HtmlNode::Text(_) => None,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match self {
            HtmlNode::Element(element) => element.value().attr(name),
            HtmlNode::Text(_) => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            HtmlNode::Element(_) => None,
            HtmlNode::Text(text) => Some(text),
        }
    }

    fn children(&self) -> Vec<Self> {
        let HtmlNode::Element(element) = self else {
            return Vec::new();
        };

        element
            .children()
            .filter_map(|child| match child.value() {
                Node::Element(_) => ElementRef::wrap(child).map(HtmlNode::Element),
                Node::Text(text) => Some(HtmlNode::Text(&**text)),
                _ => None,
            })
            .collect()
    }
}

/// Collapse every run of HTML whitespace into a single space.
///
/// Leading and trailing runs are kept as one space so that adjacent inline
/// content stays separated.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C') {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Approximates what a browser renders as the text of `node`.
///
/// Non-content elements are skipped, whitespace is collapsed outside `<pre>`,
/// and block elements and `<br>` start new lines. Lines are trimmed and blank
/// lines dropped. The walk keeps its own stack, so nesting depth is bounded
/// only by memory.
pub fn rendered_text<N: MarkupNode>(node: &N) -> String {
    let mut raw = String::new();
    let mut stack = Vec::new();
    push_rendered(node, &mut raw, &mut stack);
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Node(child) => push_rendered(&child, &mut raw, &mut stack),
            Visit::LineBreak => raw.push('\n'),
        }
    }

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pending work of the [`rendered_text`] walk.
enum Visit<N> {
    Node(N),
    LineBreak,
}

/// Writes the text that `node` itself produces and schedules its children.
fn push_rendered<N: MarkupNode>(node: &N, out: &mut String, stack: &mut Vec<Visit<N>>) {
    if let Some(text) = node.text() {
        out.push_str(&collapse_whitespace(text));
        return;
    }

    let Some(name) = node.element_name() else {
        return;
    };

    match name {
        name if is_non_content(name) => {}
        "br" => out.push('\n'),
        "pre" => {
            out.push('\n');
            out.push_str(&node.text_content());
            out.push('\n');
        }
        name => {
            if is_block(name) {
                out.push('\n');
                stack.push(Visit::LineBreak);
            }
            stack.extend(node.children().into_iter().rev().map(Visit::Node));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn with_root<F: FnOnce(HtmlNode<'_>)>(html: &str, f: F) {
        let fragment = Html::parse_fragment(html);
        f(HtmlNode::from(fragment.root_element()));
    }

    #[test]
    fn test_children_skip_comments() {
        with_root("<p>one</p><!-- gone --><p>two</p>", |root| {
            let names: Vec<_> = root
                .children()
                .iter()
                .map(|c| c.element_name().unwrap_or("#text").to_string())
                .collect();
            assert_eq!(names, vec!["p", "p"]);
        });
    }

    #[test]
    fn test_text_content_is_raw() {
        with_root("<div>  a\n <b>b</b></div>", |root| {
            assert_eq!(root.text_content(), "  a\n b");
        });
    }

    #[test]
    fn test_has_class() {
        with_root(r#"<code class="hljs language-rust">x</code>"#, |root| {
            let code = &root.children()[0];
            assert!(code.has_class("language-rust"));
            assert!(!code.has_class("language"));
        });
    }

    #[test]
    fn test_first_significant_child_skips_whitespace() {
        with_root("<pre>\n  <code>x</code></pre>", |root| {
            let pre = &root.children()[0];
            let first = pre.first_significant_child().unwrap();
            assert!(first.is_element("code"));
        });
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), " a b ");
        assert_eq!(collapse_whitespace("\u{a0}x"), "\u{a0}x");
    }

    #[test]
    fn test_rendered_text_blocks_and_scripts() {
        with_root(
            "<div><p>First   para</p><script>var x;</script><p>Second<br>line</p></div>",
            |root| {
                assert_eq!(rendered_text(&root), "First para\nSecond\nline");
            },
        );
    }

    #[test]
    fn test_rendered_text_keeps_pre() {
        with_root("<pre>a  b\n  c</pre>", |root| {
            assert_eq!(rendered_text(&root), "a  b\nc");
        });
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 5_000;
        let html = format!("{}deep{}", "<section>".repeat(depth), "</section>".repeat(depth));
        with_root(&html, |root| {
            assert_eq!(rendered_text(&root), "deep");
            assert_eq!(root.text_content(), "deep");
        });
    }
}
