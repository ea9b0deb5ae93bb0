//! Library API integration tests
use copydown_core::*;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

#[test]
fn test_full_page_article() {
    let doc = Document::parse_with_url(&read_fixture("article.html"), "https://blog.example.com/posts/ownership?ref=feed")
        .unwrap();
    let content = extract_full_page(&doc, &ExtractConfig::default());

    assert!(content.html.starts_with("<article>"));
    assert!(content.text.contains("Every value in Rust has a single owner."));
    assert!(!content.html.contains("Home"));
    assert!(!content.html.contains("Copyright"));
    assert!(!content.html.contains("cookies"));

    assert_eq!(content.metadata.title, "Understanding Ownership in Rust");
    assert_eq!(content.metadata.url, "https://blog.example.com/posts/ownership");
    assert_eq!(content.metadata.description.as_deref(), Some("Ownership, borrowing and lifetimes explained."));
    assert_eq!(content.metadata.author.as_deref(), Some("Jane Doe"));
    assert_eq!(content.metadata.published_time.as_deref(), Some("2024-03-01T09:30:00Z"));
}

#[test]
fn test_extracted_html_has_no_noise() {
    for fixture in ["article.html", "noisy.html", "landing.html"] {
        let doc = Document::parse(&read_fixture(fixture));
        let html = extract_full_page(&doc, &ExtractConfig::default()).html;

        for needle in ["<script", "<style", "advertisement", "social-share", "data-", "display: none", " hidden"] {
            assert!(!html.contains(needle), "{fixture}: found {needle}");
        }
    }
}

#[test]
fn test_noisy_page_keeps_real_content() {
    let doc = Document::parse(&read_fixture("noisy.html"));
    let content = extract_full_page(&doc, &ExtractConfig::default());

    assert!(content.html.contains("The real content of the noisy page."));
    assert!(!content.html.contains("Buy one"));
    assert!(!content.html.contains("newsletter"));
    assert!(!content.html.contains("youtube"));
    assert!(!content.html.contains("Secret"));
    assert_eq!(content.text, "The real content of the noisy page.");
}

#[test]
fn test_landing_page_uses_largest_block() {
    let doc = Document::parse(&read_fixture("landing.html"));
    let content = extract_full_page(&doc, &ExtractConfig::default());

    assert!(content.html.starts_with(r#"<section id="story">"#));
    assert!(!content.text.contains("Pricing"));
    assert!(!content.text.contains("Terms apply"));
}

#[test]
fn test_empty_page() {
    let doc = Document::parse(&read_fixture("empty.html"));
    let content = extract_full_page(&doc, &ExtractConfig::default());

    assert_eq!(content.html.trim(), "");
    assert_eq!(content.text, "");
    assert_eq!(content.metadata.title, UNTITLED);
    assert_eq!(convert(&content.html, &ConversionOptions { include_metadata: true, base_url: None }), "");
}

#[test]
fn test_article_to_markdown() {
    let doc = Document::parse(&read_fixture("article.html"));
    let content = extract_full_page(&doc, &ExtractConfig::default());
    let markdown = convert(&content.html, &ConversionOptions::default());

    assert!(markdown.starts_with("# Understanding Ownership\n\n"));
    assert!(markdown.contains("a **single owner**. When"));
    assert!(markdown.contains("the value is *dropped*."));
    assert!(markdown.contains("## Moves"));
    assert!(markdown.contains("```rust\nlet a = String::from(\"hi\");\nlet b = a;\n```"));
    assert!(markdown.contains("| Kind | Copies? |\n| --- | --- |\n| i32 | yes |\n| String | no \\| moves |"));
    assert!(markdown.ends_with("![Borrow checker diagram](/img/borrow.png \"Borrowing\")"));
    assert!(!markdown.contains("premium"));
    assert!(!markdown.contains("Hidden tracking"));
    assert!(!markdown.contains("\n\n\n"));
}

#[test]
fn test_article_with_header() {
    let doc = Document::parse_with_url(&read_fixture("article.html"), "https://blog.example.com/posts/ownership").unwrap();
    let content = extract_full_page(&doc, &ExtractConfig::default());
    let result = convert_with_metadata(&content.html, &content.metadata.title, &content.metadata.url);

    assert!(
        result
            .markdown
            .starts_with("Source: [Understanding Ownership in Rust](https://blog.example.com/posts/ownership)\nCaptured: ")
    );
    assert!(result.markdown.contains("\n\n---\n\n# Understanding Ownership"));
    assert_eq!(result.metadata.title, content.metadata.title);
}

#[test]
fn test_extract_from_selector_api() {
    let doc = Document::parse(&read_fixture("article.html"));

    let table = extract_from_selector(&doc, "table", &ExtractConfig::default()).unwrap().unwrap();
    assert!(table.html.starts_with("<table>"));
    assert!(table.text.contains("String"));

    assert!(extract_from_selector(&doc, "#does-not-exist", &ExtractConfig::default()).unwrap().is_none());
    assert!(matches!(
        extract_from_selector(&doc, "p[", &ExtractConfig::default()),
        Err(CopydownError::HtmlParseError(_))
    ));
}

#[test]
fn test_selection_api() {
    let selection = StaticSelection::default().with_range(SelectionRange::from_element(
        "DIV",
        r#"<p>Selected <em>words</em></p><div class="advertisement">Ad</div>"#,
    ));
    let content = extract_selection(&selection, &ExtractConfig::default()).unwrap();

    assert_eq!(content.text, "Selected words");
    assert_eq!(content.context.as_deref(), Some("div"));
    assert_eq!(convert(&content.html, &ConversionOptions::default()), "Selected *words*");

    assert!(extract_selection(&StaticSelection::default(), &ExtractConfig::default()).is_none());
}

#[test]
fn test_sanitize_html_api() {
    let html = r#"<a href="/x" onclick="steal()">Link</a><script>alert(1)</script>"#;
    let sanitized = sanitize_html(html);
    assert!(sanitized.contains(r#"href="/x""#));
    assert!(sanitized.contains("Link</a>"));
    assert!(!sanitized.contains("onclick"));
    assert!(!sanitized.contains("alert"));
}

#[test]
fn test_size_check_boundary() {
    let html = "x".repeat(100);
    assert!(!check_content_size(&html, 100));
    assert!(check_content_size(&html, 99));
    assert!(!exceeds_default_size(&html));
}

#[test]
fn test_cleanup_idempotent_on_real_output() {
    let doc = Document::parse(&read_fixture("article.html"));
    let content = extract_full_page(&doc, &ExtractConfig::default());
    let markdown = convert(&content.html, &ConversionOptions::default());
    assert_eq!(cleanup(&markdown), markdown);
}

#[test]
fn test_input_document_is_not_mutated() {
    let html = read_fixture("noisy.html");
    let doc = Document::parse(&html);
    let before = doc.as_string();

    let _ = extract_full_page(&doc, &ExtractConfig::default());
    let _ = extract_from_selector(&doc, "p", &ExtractConfig::default());

    assert_eq!(doc.as_string(), before);
    assert!(before.contains("<script>"));
}
