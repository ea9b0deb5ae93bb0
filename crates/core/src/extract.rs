use serde::Serialize;
use tracing::debug;

use crate::dom::rendered_text;
use crate::metadata::PageMetadata;
use crate::parse::{Document, Element};
use crate::preprocess::{CleanConfig, clean_html};
use crate::Result;

/// Byte length above which content is considered too large for the clipboard.
pub const DEFAULT_SIZE_THRESHOLD: usize = 1_048_576;

/// Landmarks tried in order when looking for the main content region
pub const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    "#main",
    "#content",
    ".main-content",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".page-content",
];

/// Containers scanned for the largest text block when no landmark matches
const BLOCK_CANDIDATES: &str = "div, section, article";

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Noise-removal configuration
    pub clean: CleanConfig,
    /// Ordered main-content selectors; the first match wins
    pub content_selectors: Vec<String>,
    /// Size threshold in bytes reported against by extraction
    pub size_threshold: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            clean: CleanConfig::default(),
            content_selectors: MAIN_CONTENT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            size_threshold: DEFAULT_SIZE_THRESHOLD,
        }
    }
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

/// Builder for ExtractConfig.
///
/// # Example
///
/// ```rust
/// use copydown_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .remove_hidden(false)
///     .extra_noise_selector(".promo")
///     .size_threshold(512 * 1024)
///     .build();
/// assert!(!config.clean.remove_hidden);
/// ```
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    /// Sets whether hidden elements are removed.
    pub fn remove_hidden(mut self, value: bool) -> Self {
        self.config.clean.remove_hidden = value;
        self
    }

    /// Sets whether `data-*` attributes are stripped.
    pub fn strip_data_attributes(mut self, value: bool) -> Self {
        self.config.clean.strip_data_attributes = value;
        self
    }

    /// Adds a selector removed during noise removal.
    pub fn extra_noise_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.clean.extra_selectors.push(selector.into());
        self
    }

    /// Replaces the ordered main-content selectors.
    pub fn content_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.content_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the size threshold in bytes.
    pub fn size_threshold(mut self, bytes: usize) -> Self {
        self.config.size_threshold = bytes;
        self
    }

    /// Builds the ExtractConfig.
    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

impl Default for ExtractConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of content extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedContent {
    /// Cleaned HTML of the content region
    pub html: String,
    /// Rendered plain text of the same region
    pub text: String,
    /// Page-level metadata
    pub metadata: PageMetadata,
}

/// Extract the main content of a whole page.
///
/// The body is serialized and cleaned, then the main content region is
/// located in the cleaned copy. If no region is found the whole cleaned body
/// is returned. This never fails: a page without content yields empty
/// `html` and `text`.
///
/// # Example
///
/// ```rust
/// use copydown_core::{Document, ExtractConfig, extract_full_page};
///
/// let doc = Document::parse(r#"
///     <html><head><title>Post</title></head>
///     <body><nav>Menu</nav><article><p>Story</p></article></body></html>
/// "#);
/// let content = extract_full_page(&doc, &ExtractConfig::default());
/// assert!(content.html.contains("Story"));
/// assert!(!content.html.contains("Menu"));
/// assert_eq!(content.metadata.title, "Post");
/// ```
pub fn extract_full_page(doc: &Document, config: &ExtractConfig) -> ExtractedContent {
    let metadata = doc.extract_metadata();
    let body_html = doc.body().map(|body| body.outer_html()).unwrap_or_default();
    let cleaned = Document::parse(&clean_html(&body_html, &config.clean));

    let (html, text) = match find_main_content(&cleaned, &config.content_selectors) {
        Some(main) => (main.outer_html(), rendered_text(&main.node())),
        None => {
            debug!("no main content region, falling back to the cleaned body");
            match cleaned.body() {
                Some(body) => (body.inner_html(), rendered_text(&body.node())),
                None => (String::new(), String::new()),
            }
        }
    };

    debug!(
        bytes = html.len(),
        chars = text.chars().count(),
        oversized = check_content_size(&html, config.size_threshold),
        "extracted full page"
    );
    ExtractedContent { html, text, metadata }
}

/// Locate the main content region of a cleaned document.
///
/// Tries `selectors` in order and returns the first match. Failing that,
/// returns the `div`/`section`/`article` with the longest rendered text,
/// the earliest one in document order on ties. Invalid selectors are skipped.
pub fn find_main_content<'a, S: AsRef<str>>(doc: &'a Document, selectors: &[S]) -> Option<Element<'a>> {
    for selector in selectors {
        if let Ok(Some(element)) = doc.select_first(selector.as_ref()) {
            debug!(selector = selector.as_ref(), "main content landmark matched");
            return Some(element);
        }
    }

    let mut best: Option<(usize, Element<'a>)> = None;
    for element in doc.select(BLOCK_CANDIDATES).unwrap_or_default() {
        let length = rendered_text(&element.node()).chars().count();
        if best.as_ref().is_none_or(|(best_length, _)| length > *best_length) {
            best = Some((length, element));
        }
    }

    if let Some((length, element)) = &best {
        debug!(tag = %element.tag_name(), length, "selected largest text block");
    }
    best.map(|(_, element)| element)
}

/// Extract the first element matching `selector`.
///
/// Returns `Ok(None)` when nothing matches.
///
/// # Errors
///
/// Returns [`crate::CopydownError::HtmlParseError`] if `selector` is not a valid CSS selector.
pub fn extract_from_selector(doc: &Document, selector: &str, config: &ExtractConfig) -> Result<Option<ExtractedContent>> {
    let Some(element) = doc.select_first(selector)? else {
        debug!(selector, "selector matched nothing");
        return Ok(None);
    };

    let html = clean_html(&element.outer_html(), &config.clean);
    let fragment = Document::parse_fragment(&html);
    let text = rendered_text(&fragment.root_node());

    Ok(Some(ExtractedContent { html, text, metadata: doc.extract_metadata() }))
}

/// Whether the UTF-8 byte length of `html` exceeds `threshold_bytes`.
///
/// ```rust
/// use copydown_core::check_content_size;
///
/// assert!(!check_content_size("abcd", 4));
/// assert!(check_content_size("abcde", 4));
/// ```
pub fn check_content_size(html: &str, threshold_bytes: usize) -> bool {
    html.len() > threshold_bytes
}

/// [`check_content_size`] against [`DEFAULT_SIZE_THRESHOLD`].
pub fn exceeds_default_size(html: &str) -> bool {
    check_content_size(html, DEFAULT_SIZE_THRESHOLD)
}
