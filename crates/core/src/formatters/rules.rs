//! Element handlers layered over htmd's built-in conversion.
//!
//! Each [`Rule`] names the tags it handles and a handler. Handlers are tried
//! in priority order; one that calls `handlers.fallback(element)` hands the
//! element to the next rule for that tag, and finally to htmd itself.

pub use htmd::Element as HandlerElement;
pub use htmd::element_handler::{HandlerResult, Handlers};

use crate::dom::{MarkupNode, collapse_whitespace};
use crate::formatters::prepare::MARKDOWN_ATTR;

/// Alt text used for images that have none.
pub const DEFAULT_ALT_TEXT: &str = "image";

/// Signature shared by every rule handler.
pub type Handler = fn(&dyn Handlers, HandlerElement) -> Option<HandlerResult>;

/// A prioritized override for a set of tags.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub handler: Handler,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).field("tags", &self.tags).finish()
    }
}

/// The built-in overrides, in priority order.
pub fn custom_rules() -> Vec<Rule> {
    vec![
        Rule { name: "table", tags: &["table"], handler: table },
        Rule { name: "fencedCodeBlock", tags: &["pre"], handler: fenced_code_block },
        Rule { name: "strong", tags: &["strong", "b"], handler: strong },
        Rule { name: "emphasis", tags: &["em", "i"], handler: emphasis },
        Rule { name: "image", tags: &["img"], handler: image },
    ]
}

/// Handlers pinning the base configuration where htmd's defaults differ:
/// `---` rules and `*`/`**` delimiters.
pub fn base_rules() -> Vec<Rule> {
    vec![
        Rule { name: "horizontalRule", tags: &["hr"], handler: horizontal_rule },
        Rule { name: "strongDelimiter", tags: &["strong", "b"], handler: strong_delimiter },
        Rule { name: "emphasisDelimiter", tags: &["em", "i"], handler: emphasis_delimiter },
    ]
}

fn translated(content: String) -> HandlerResult {
    HandlerResult { content, markdown_translated: true }
}

fn attr(element: &HandlerElement, name: &str) -> Option<String> {
    element
        .attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| attr.value.to_string())
}

fn horizontal_rule(_: &dyn Handlers, _: HandlerElement) -> Option<HandlerResult> {
    Some(translated("\n\n---\n\n".to_string()))
}

fn strong_delimiter(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    Some(translated(delimited(&handlers.walk_children(element.node).content, "**")))
}

fn emphasis_delimiter(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    Some(translated(delimited(&handlers.walk_children(element.node).content, "*")))
}

fn table(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    prerendered(handlers, element)
}

fn fenced_code_block(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    prerendered(handlers, element)
}

/// Emits the Markdown attached during preparation, or defers when there is none.
fn prerendered(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    match attr(&element, MARKDOWN_ATTR) {
        Some(markdown) if markdown.is_empty() => Some(translated(markdown)),
        Some(markdown) => Some(translated(format!("\n\n{}\n\n", markdown))),
        None => handlers.fallback(element),
    }
}

fn strong(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    Some(translated(hoist_whitespace(&content, "**")))
}

fn emphasis(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    Some(translated(hoist_whitespace(&content, "*")))
}

fn image(_: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
    let Some(src) = attr(&element, "src").filter(|src| !src.trim().is_empty()) else {
        return Some(translated(String::new()));
    };
    let alt = attr(&element, "alt")
        .map(|alt| alt.trim().to_string())
        .filter(|alt| !alt.is_empty())
        .unwrap_or_else(|| DEFAULT_ALT_TEXT.to_string());
    let title = attr(&element, "title").map(|title| title_suffix(&title)).unwrap_or_default();

    Some(translated(format!("![{}]({}{})", alt, src.trim(), title)))
}

/// Rows of a table in document order: direct `<tr>` children and those of
/// its row groups. Rows of nested tables are not included.
fn table_rows<N: MarkupNode>(table: &N) -> Vec<N> {
    let mut rows = Vec::new();
    for child in table.children() {
        if child.is_element("tr") {
            rows.push(child);
        } else if child.is_element("thead") || child.is_element("tbody") || child.is_element("tfoot") {
            rows.extend(child.children().into_iter().filter(|row| row.is_element("tr")));
        }
    }
    rows
}

fn cell_text<N: MarkupNode>(cell: &N) -> String {
    collapse_whitespace(&cell.text_content()).trim().replace('|', "\\|")
}

/// GFM table for `table`: a header row, a `---` separator, then the data
/// rows. Empty when the table has no cells.
pub fn render_table<N: MarkupNode>(table: &N) -> String {
    let rows: Vec<Vec<String>> = table_rows(table)
        .iter()
        .map(|row| {
            row.children()
                .iter()
                .filter(|cell| cell.is_element("th") || cell.is_element("td"))
                .map(cell_text)
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (index, cells) in rows.iter().enumerate() {
        lines.push(format!("| {} |", cells.join(" | ")));
        if index == 0 {
            lines.push(format!("| {} |", vec!["---"; cells.len()].join(" | ")));
        }
    }
    lines.join("\n")
}

/// Fenced block for a `<pre>` whose first significant child is `<code>`.
///
/// The language comes from a `language-*` class on the `<code>` element. The
/// fence is longer than any backtick run in the code.
pub fn render_fenced_code<N: MarkupNode>(pre: &N) -> Option<String> {
    let code_element = pre.first_significant_child().filter(|child| child.is_element("code"))?;
    let language = code_element
        .attr("class")
        .and_then(|classes| classes.split_whitespace().find_map(|class| class.strip_prefix("language-")))
        .unwrap_or_default();

    let code = code_element.text_content();
    let code = code.strip_suffix('\n').unwrap_or(&code);
    let fence = "`".repeat(3.max(longest_run(code, '`') + 1));

    Some(format!("{fence}{language}\n{code}\n{fence}"))
}

/// Split `content` into leading whitespace, body and trailing whitespace.
fn split_whitespace_edges(content: &str) -> (&str, &str, &str) {
    let start = content.len() - content.trim_start_matches(char::is_whitespace).len();
    let end = content.trim_end_matches(char::is_whitespace).len().max(start);
    (&content[..start], &content[start..end], &content[end..])
}

/// Wrap `content` in `delimiter`, moving its outer whitespace outside.
///
/// All-whitespace content renders as nothing.
pub fn hoist_whitespace(content: &str, delimiter: &str) -> String {
    let (lead, inner, trail) = split_whitespace_edges(content);
    if inner.is_empty() {
        return String::new();
    }
    format!("{lead}{delimiter}{inner}{delimiter}{trail}")
}

fn delimited(content: &str, delimiter: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    format!("{delimiter}{content}{delimiter}")
}

/// Length of the longest run of `ch` in `text`.
fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn title_suffix(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return String::new();
    }
    format!(" \"{}\"", title.replace('"', "\\\""))
}
