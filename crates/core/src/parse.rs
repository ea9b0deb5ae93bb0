//! HTML parsing and DOM querying.
//!
//! This module provides the [`Document`] and [`Element`] types. A `Document`
//! stands in for the host's fully-parsed page: the extractor only ever reads
//! from it, and every cleaning pass works on a serialized copy.
//!
//! # Example
//!
//! ```rust
//! use copydown_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Title</title></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.title(), Some("Title".to_string()));
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::HtmlNode;
use crate::{CopydownError, Result};

/// Parses a CSS selector, reporting failures as [`CopydownError::HtmlParseError`].
pub(crate) fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CopydownError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document or fragment.
///
/// # Example
///
/// ```rust
/// use copydown_core::parse::Document;
///
/// let doc = Document::parse_with_url("<title>Test</title>", "https://example.com/a").unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// assert_eq!(doc.url().map(|u| u.as_str()), Some("https://example.com/a"));
/// ```
pub struct Document {
    html: Html,
    url: Option<Url>,
}

impl Document {
    /// Parses a complete HTML document.
    ///
    /// Parsing is lenient: malformed markup is repaired the way browsers do it.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html), url: None }
    }

    /// Parses a complete HTML document that was loaded from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CopydownError::InvalidUrl`] if `url` cannot be parsed.
    pub fn parse_with_url(html: &str, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| CopydownError::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(Self { html: Html::parse_document(html), url: Some(url) })
    }

    /// Parses an HTML fragment such as a cleaned subtree or a selection.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html), url: None }
    }

    /// Gets the URL the document was loaded from, if known.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Gets the underlying `scraper::Html` instance.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the entire HTML as a string.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// The root element as a tree node (`<html>`, also for fragments).
    pub fn root_node(&self) -> HtmlNode<'_> {
        HtmlNode::Element(self.html.root_element())
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`CopydownError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use copydown_core::parse::Document;
    ///
    /// let doc = Document::parse(r#"<p class="content">First</p><p class="content">Second</p>"#);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`CopydownError::HtmlParseError`] if the selector is invalid.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the `<body>` element.
    pub fn body(&self) -> Option<Element<'_>> {
        self.select_first("body").ok().flatten()
    }

    /// Gets the content of the `<title>` element with whitespace collapsed.
    pub fn title(&self) -> Option<String> {
        let title = self.select_first("title").ok().flatten()?;
        Some(title.text().split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use copydown_core::parse::Document;
///
/// let doc = Document::parse(r#"<a href="https://example.com">Link text</a>"#);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the HTML inside this element, excluding its own tags.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the HTML of this element including its own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// This element as a tree node.
    pub fn node(&self) -> HtmlNode<'a> {
        HtmlNode::Element(self.element)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`CopydownError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}
