use htmd::HtmlToMarkdown;
use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, Options};
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, warn};

use crate::dom::NON_CONTENT_TAGS;
use crate::formatters::cleanup::cleanup;
use crate::formatters::prepare::prepare;
use crate::formatters::rules::{Rule, base_rules, custom_rules};
use crate::parse::Document;

/// Configuration for Markdown conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Prepend a `Source:`/`Captured:` header
    pub include_metadata: bool,
    /// URL reported on the `Source:` line
    pub base_url: Option<String>,
}

/// Metadata recorded alongside a conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureMetadata {
    pub title: String,
    pub url: String,
    /// ISO-8601 time of the conversion
    pub timestamp: String,
}

/// Output of [`convert_with_metadata`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub markdown: String,
    pub metadata: CaptureMetadata,
}

/// HTML to Markdown converter built on htmd.
///
/// The base configuration is htmd's, set to ATX headings, `-` bullets and
/// backtick fences. Override rules are registered as htmd handlers; the
/// first rule in the list has the highest priority, and a handler that falls
/// back passes the element to the next rule for the same tag.
///
/// # Example
///
/// ```rust
/// use copydown_core::MarkdownConverter;
/// use copydown_core::formatters::rules::{HandlerElement, HandlerResult, Handlers, Rule};
///
/// fn keyboard(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
///     let content = handlers.walk_children(element.node).content;
///     Some(HandlerResult { content: format!("<kbd>{}</kbd>", content), markdown_translated: true })
/// }
///
/// let converter = MarkdownConverter::new().with_rule(Rule { name: "keyboard", tags: &["kbd"], handler: keyboard });
/// assert_eq!(converter.convert("<p>Press <kbd>Ctrl</kbd></p>"), "Press <kbd>Ctrl</kbd>");
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    rules: Vec<Rule>,
}

impl MarkdownConverter {
    /// A converter with the built-in override rules.
    pub fn new() -> Self {
        Self { rules: custom_rules() }
    }

    /// A converter with no override rules, only the base configuration.
    pub fn bare() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule ahead of all existing ones.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.insert(0, rule);
    }

    /// Builder form of [`MarkdownConverter::add_rule`].
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.add_rule(rule);
        self
    }

    /// Names of the active rules in priority order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }

    /// Convert an HTML fragment to cleaned-up Markdown.
    pub fn convert(&self, html: &str) -> String {
        self.convert_document(&Document::parse_fragment(html))
    }

    /// Convert a parsed document or fragment.
    pub fn convert_document(&self, doc: &Document) -> String {
        let prepared = prepare(&doc.root_node());
        match self.htmd().convert(&prepared) {
            Ok(markdown) => cleanup(&markdown),
            Err(e) => {
                warn!(error = %e, "markdown conversion failed");
                String::new()
            }
        }
    }

    /// htmd converter with the base handlers first and the rules on top.
    ///
    /// htmd consults the most recently added handler first.
    fn htmd(&self) -> HtmlToMarkdown {
        let mut builder = HtmlToMarkdown::builder()
            .skip_tags(NON_CONTENT_TAGS.to_vec())
            .options(Options {
                heading_style: HeadingStyle::Atx,
                bullet_list_marker: BulletListMarker::Dash,
                code_block_style: CodeBlockStyle::Fenced,
                code_block_fence: CodeBlockFence::Backticks,
                ..Default::default()
            });

        for rule in base_rules().iter().chain(self.rules.iter().rev()) {
            builder = builder.add_handler(rule.tags.to_vec(), rule.handler);
        }
        builder.build()
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Current time as an ISO-8601 UTC timestamp with millisecond precision.
pub fn capture_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
    .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Convert an HTML fragment to Markdown.
///
/// Whitespace-only input converts to an empty string, whatever the options.
///
/// # Example
///
/// ```rust
/// use copydown_core::{ConversionOptions, convert};
///
/// let markdown = convert("<h1>Hello</h1><p>It <em>works</em></p>", &ConversionOptions::default());
/// assert_eq!(markdown, "# Hello\n\nIt *works*");
/// ```
pub fn convert(html: &str, options: &ConversionOptions) -> String {
    convert_with_timestamp(html, options, &capture_timestamp())
}

/// [`convert`] with a caller-supplied `Captured:` timestamp.
pub fn convert_with_timestamp(html: &str, options: &ConversionOptions, timestamp: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let body = convert_fragment(html);
    if !options.include_metadata {
        return body;
    }

    let mut header = String::new();
    if let Some(url) = &options.base_url {
        header.push_str(&format!("Source: {}\n", url));
    }
    header.push_str(&format!("Captured: {}\n", timestamp));
    format!("{}\n---\n\n{}", header, body).trim_end().to_string()
}

/// Convert an HTML fragment to Markdown under a `Source:`/`Captured:` header.
pub fn convert_with_metadata(html: &str, title: &str, url: &str) -> ConversionResult {
    let timestamp = capture_timestamp();
    let body = convert_fragment(html);
    let markdown = format!("Source: [{}]({})\nCaptured: {}\n\n---\n\n{}", title, url, timestamp, body)
        .trim_end()
        .to_string();

    ConversionResult {
        markdown,
        metadata: CaptureMetadata { title: title.to_string(), url: url.to_string(), timestamp },
    }
}

fn convert_fragment(html: &str) -> String {
    let markdown = MarkdownConverter::new().convert(html);
    debug!(html_bytes = html.len(), markdown_bytes = markdown.len(), "converted fragment");
    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::rules::{HandlerElement, HandlerResult, Handlers};
    use rstest::rstest;

    #[test]
    fn test_empty_input() {
        let with_header = ConversionOptions { include_metadata: true, base_url: Some("https://e.com".into()) };
        assert_eq!(convert("", &ConversionOptions::default()), "");
        assert_eq!(convert("   \n\t ", &with_header), "");
        assert_eq!(convert("", &with_header), "");
    }

    #[test]
    fn test_metadata_header() {
        let options = ConversionOptions { include_metadata: true, base_url: Some("https://example.com/page".into()) };
        let markdown = convert("<p>Body</p>", &options);
        let lines: Vec<&str> = markdown.lines().collect();

        assert_eq!(lines[0], "Source: https://example.com/page");
        assert!(lines[1].starts_with("Captured: "));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "---");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "Body");
    }

    #[test]
    fn test_metadata_header_without_url() {
        let options = ConversionOptions { include_metadata: true, base_url: None };
        let markdown = convert("<p>Body</p>", &options);
        assert!(markdown.starts_with("Captured: "));
        assert!(markdown.ends_with("\n\n---\n\nBody"));
    }

    #[test]
    fn test_convert_with_metadata() {
        let result = convert_with_metadata("<p>Test content</p>", "Test Page", "https://example.com/page");
        let lines: Vec<&str> = result.markdown.lines().collect();

        assert_eq!(lines[0], "Source: [Test Page](https://example.com/page)");
        assert_eq!(lines[1], format!("Captured: {}", result.metadata.timestamp));
        assert_eq!(lines[3], "---");
        assert_eq!(lines[5], "Test content");
        assert_eq!(result.metadata.title, "Test Page");
        assert_eq!(result.metadata.url, "https://example.com/page");
    }

    #[test]
    fn test_convert_with_timestamp() {
        let options = ConversionOptions { include_metadata: true, base_url: None };
        assert_eq!(
            convert_with_timestamp("<p>Body</p>", &options, "2024-01-15T10:00:00.000Z"),
            "Captured: 2024-01-15T10:00:00.000Z\n\n---\n\nBody"
        );
    }

    #[test]
    fn test_capture_timestamp_shape() {
        let timestamp = capture_timestamp();
        assert_eq!(timestamp.len(), "2024-01-15T10:00:00.000Z".len());
        assert!(timestamp.ends_with('Z'));
        assert_eq!(&timestamp[10..11], "T");
    }

    #[test]
    fn test_conversion_is_pure() {
        let html = "<h2>T</h2><ul><li>a</li></ul><table><tr><td>1</td></tr></table>";
        let options = ConversionOptions::default();
        assert_eq!(convert(html, &options), convert(html, &options));
    }

    fn drop_images(_: &dyn Handlers, _: HandlerElement) -> Option<HandlerResult> {
        Some(HandlerResult { content: String::new(), markdown_translated: true })
    }

    fn never(handlers: &dyn Handlers, element: HandlerElement) -> Option<HandlerResult> {
        handlers.fallback(element)
    }

    #[test]
    fn test_add_rule_takes_priority() {
        let converter = MarkdownConverter::new().with_rule(Rule { name: "dropImages", tags: &["img"], handler: drop_images });

        assert_eq!(converter.rule_names()[0], "dropImages");
        assert_eq!(converter.convert(r#"<p>Logo <img src="a.png"></p>"#), "Logo");
    }

    #[test]
    fn test_rule_can_defer() {
        let converter = MarkdownConverter::new().with_rule(Rule { name: "never", tags: &["strong"], handler: never });
        assert_eq!(converter.convert("<p><strong> x </strong>y</p>"), "**x** y");
    }

    #[test]
    fn test_bare_converter_has_no_rules() {
        let converter = MarkdownConverter::bare();
        assert!(converter.rule_names().is_empty());
        assert_eq!(converter.convert("<p><em>x</em> and <strong>y</strong></p><hr>"), "*x* and **y**\n\n---");
        assert_eq!(
            MarkdownConverter::new().rule_names(),
            vec!["table", "fencedCodeBlock", "strong", "emphasis", "image"]
        );
    }

    #[test]
    fn test_mixed_document() {
        let html = r#"
            <h1>Guide</h1>
            <p>Read the <a href="https://docs.rs">docs</a> first.</p>
            <ul>
                <li>Install</li>
                <li>Run <code>copydown</code></li>
            </ul>
            <blockquote><p>Quoted</p></blockquote>
        "#;
        let markdown = convert(html, &ConversionOptions::default());

        assert!(markdown.starts_with("# Guide\n\nRead the [docs](https://docs.rs) first."));
        assert!(markdown.lines().any(|line| line.starts_with('-') && line.ends_with("Install")));
        assert!(markdown.contains("`copydown`"));
        assert!(markdown.ends_with("> Quoted"));
    }

    #[rstest]
    #[case(r#"<p><a href="/x">link</a> - description</p>"#, "[link](/x) - description")]
    #[case("<p>Hello <b>world</b> = 5 and <i>x</i> # tag</p>", "Hello **world** = 5 and *x* # tag")]
    fn test_mid_line_markers_are_not_escaped(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(convert(html, &ConversionOptions::default()), expected);
    }

    #[test]
    fn test_deep_nesting_converts() {
        let depth = 3_000;
        let html = format!("{}<p>Deep <strong>text</strong></p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let markdown = convert(&html, &ConversionOptions::default());
        assert!(markdown.contains("Deep text"));
    }

    #[test]
    fn test_shallow_structure_survives_deep_siblings() {
        let depth = 3_000;
        let html = format!(
            "<h2>Title</h2>{}x{}<p>After <em>all</em></p>",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        let markdown = convert(&html, &ConversionOptions::default());
        assert!(markdown.starts_with("## Title"));
        assert!(markdown.ends_with("After *all*"));
    }
}
