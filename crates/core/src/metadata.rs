use serde::Serialize;

use crate::Document;

/// Title used when the document has none.
pub const UNTITLED: &str = "Untitled";

/// Page-level facts captured once per extraction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    /// Document title, never empty
    pub title: String,
    /// Canonical page URL, or an empty string when nothing is known
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self { title: UNTITLED.to_string(), url: String::new(), description: None, author: None, published_time: None }
    }
}

/// Extract page metadata from a document; see [`Document::extract_metadata`].
pub fn extract_page_metadata(doc: &Document) -> PageMetadata {
    doc.extract_metadata()
}

impl Document {
    /// Extract all metadata at once
    pub fn extract_metadata(&self) -> PageMetadata {
        PageMetadata {
            title: self.extract_title(),
            url: self.extract_canonical_url(),
            description: self.extract_description(),
            author: self.extract_author(),
            published_time: self.extract_published_time(),
        }
    }

    /// Extract the `<title>` text, falling back to [`UNTITLED`]
    pub fn extract_title(&self) -> String {
        self.title()
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Extract the page URL with priority fallback:
    /// 1. `<link rel="canonical">` (resolved against the document URL)
    /// 2. Open Graph `og:url`
    /// 3. The URL the document was loaded from
    pub fn extract_canonical_url(&self) -> String {
        if let Ok(Some(link)) = self.select_first("link[rel=\"canonical\"][href]")
            && let Some(href) = link.attr("href").map(str::trim)
            && !href.is_empty()
        {
            return match self.url().map(|base| base.join(href)) {
                Some(Ok(resolved)) => resolved.to_string(),
                _ => href.to_string(),
            };
        }

        if let Some(og_url) = self.get_meta_content("og:url") {
            return og_url;
        }

        self.url().map(|url| url.to_string()).unwrap_or_default()
    }

    /// Extract the description, preferring Open Graph over the generic meta tag
    pub fn extract_description(&self) -> Option<String> {
        self.get_meta_content("og:description")
            .or_else(|| self.get_meta_content("description"))
    }

    /// Extract author with priority fallback:
    /// 1. Meta `author`
    /// 2. Meta `article:author`
    /// 3. Meta `DC.creator` / `twitter:creator`
    /// 4. JSON-LD `author` (string, object or list)
    pub fn extract_author(&self) -> Option<String> {
        ["author", "article:author", "DC.creator", "twitter:creator"]
            .into_iter()
            .find_map(|key| self.get_meta_content(key))
            .or_else(|| {
                self.extract_json_ld()
                    .and_then(|json_ld| json_ld.get("author").and_then(author_from_json_ld))
            })
    }

    /// Extract the published time with priority fallback:
    /// 1. Meta `article:published_time`
    /// 2. Meta `og:published_time`, `datePublished`, `pubdate`, `publish-date`, `date`, `DC.date.issued`
    /// 3. JSON-LD `datePublished`
    pub fn extract_published_time(&self) -> Option<String> {
        [
            "article:published_time",
            "og:published_time",
            "datePublished",
            "pubdate",
            "publish-date",
            "date",
            "DC.date.issued",
        ]
        .into_iter()
        .find_map(|key| self.get_meta_content(key))
        .or_else(|| {
            self.extract_json_ld().and_then(|json_ld| {
                json_ld
                    .get("datePublished")
                    .and_then(|date| date.as_str())
                    .map(str::to_string)
            })
        })
    }

    /// Get meta tag content by name, property or itemprop attribute
    fn get_meta_content(&self, key: &str) -> Option<String> {
        ["name", "property", "itemprop"].into_iter().find_map(|attr| {
            let selector = format!("meta[{}=\"{}\"]", attr, key);
            let element = self.select_first(&selector).ok().flatten()?;
            let content = element.attr("content")?.trim();
            (!content.is_empty()).then(|| content.to_string())
        })
    }

    /// Extract and parse the first JSON-LD object from script tags
    fn extract_json_ld(&self) -> Option<serde_json::Value> {
        let elements = self.select("script[type=\"application/ld+json\"]").ok()?;
        elements.iter().find_map(|el| {
            let value = serde_json::from_str::<serde_json::Value>(el.text().trim()).ok()?;
            match value {
                serde_json::Value::Array(items) => items.into_iter().find(|item| item.is_object()),
                serde_json::Value::Object(_) => Some(value),
                _ => None,
            }
        })
    }
}

/// Extract an author name from a JSON-LD author field.
/// Handles string, object and array forms.
fn author_from_json_ld(author: &serde_json::Value) -> Option<String> {
    let name = match author {
        serde_json::Value::String(name) => Some(name.clone()),
        serde_json::Value::Object(obj) => obj.get("name").and_then(|name| name.as_str()).map(str::to_string),
        serde_json::Value::Array(items) => items.iter().find_map(author_from_json_ld),
        _ => None,
    };
    name.filter(|name| !name.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_metadata() {
        let html = r#"
            <html>
            <head>
                <title>Test Article</title>
                <link rel="canonical" href="/articles/test">
                <meta name="description" content="Generic description">
                <meta property="og:description" content="Open Graph description">
                <meta name="author" content="Jane Doe">
                <meta property="article:published_time" content="2024-01-15T10:00:00Z">
            </head>
            <body><p>Body</p></body>
            </html>
        "#;

        let doc = Document::parse_with_url(html, "https://example.com/articles/test?utm=1").unwrap();
        let metadata = doc.extract_metadata();

        assert_eq!(metadata.title, "Test Article");
        assert_eq!(metadata.url, "https://example.com/articles/test");
        assert_eq!(metadata.description.as_deref(), Some("Open Graph description"));
        assert_eq!(metadata.author.as_deref(), Some("Jane Doe"));
        assert_eq!(metadata.published_time.as_deref(), Some("2024-01-15T10:00:00Z"));
    }

    #[test]
    fn test_untitled_fallback() {
        let doc = Document::parse("<html><head></head><body><p>x</p></body></html>");
        assert_eq!(doc.extract_metadata().title, UNTITLED);

        let doc = Document::parse("<html><head><title>   </title></head></html>");
        assert_eq!(doc.extract_title(), "Untitled");
    }

    #[test]
    fn test_meta_description_without_open_graph() {
        let doc = Document::parse(r#"<head><meta name="description" content="Plain"></head>"#);
        assert_eq!(doc.extract_description().as_deref(), Some("Plain"));
    }

    #[test]
    fn test_missing_optional_fields() {
        let doc = Document::parse("<title>Bare</title><p>Nothing else</p>");
        let metadata = doc.extract_metadata();
        assert_eq!(metadata.url, "");
        assert!(metadata.description.is_none());
        assert!(metadata.author.is_none());
        assert!(metadata.published_time.is_none());
    }

    #[test]
    fn test_url_falls_back_to_og_then_document() {
        let doc = Document::parse(r#"<head><meta property="og:url" content="https://og.example.com/x"></head>"#);
        assert_eq!(doc.extract_canonical_url(), "https://og.example.com/x");

        let doc = Document::parse_with_url("<p>x</p>", "https://example.com/page").unwrap();
        assert_eq!(doc.extract_canonical_url(), "https://example.com/page");
    }

    #[test]
    fn test_json_ld_author_and_date() {
        let html = r#"
            <head>
            <script type="application/ld+json">
                {"@type": "Article", "author": [{"@type": "Person", "name": "Ada Lovelace"}], "datePublished": "1843-10-01"}
            </script>
            </head>
        "#;
        let doc = Document::parse(html);
        assert_eq!(doc.extract_author().as_deref(), Some("Ada Lovelace"));
        assert_eq!(doc.extract_published_time().as_deref(), Some("1843-10-01"));
    }

    #[test]
    fn test_metadata_serializes_without_empty_fields() {
        let metadata = PageMetadata { title: "T".into(), url: "https://e.com".into(), ..Default::default() };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["title"], "T");
        assert!(json.get("author").is_none());
    }
}
