//! Extraction of a user selection.
//!
//! The host exposes its selection through [`SelectionSource`]: a number of
//! ranges, each with serialized contents and the kind of its common ancestor
//! container. [`StaticSelection`] is a ready-made implementation for hosts
//! that already hold the selected markup.

use serde::Serialize;
use tracing::debug;

use crate::dom::rendered_text;
use crate::extract::ExtractConfig;
use crate::parse::Document;
use crate::preprocess::clean_html;

/// The common ancestor container of a selection range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AncestorContainer {
    /// An element, by tag name
    Element(String),
    /// A text node
    Text,
    /// Any other node kind (document, fragment, comment)
    Other,
}

/// One range of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRange {
    /// Serialized HTML of the cloned range contents
    pub contents: String,
    pub common_ancestor: AncestorContainer,
}

impl SelectionRange {
    pub fn new(contents: impl Into<String>, common_ancestor: AncestorContainer) -> Self {
        Self { contents: contents.into(), common_ancestor }
    }

    /// A range covering the children of an element with the given tag.
    pub fn from_element(tag: &str, inner_html: impl Into<String>) -> Self {
        Self::new(inner_html, AncestorContainer::Element(tag.to_string()))
    }
}

/// The host's selection primitive.
pub trait SelectionSource {
    /// Number of ranges in the selection; zero means nothing is selected.
    fn range_count(&self) -> usize;

    /// The range at `index`, if any.
    fn range_at(&self, index: usize) -> Option<SelectionRange>;
}

/// A selection held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSelection {
    ranges: Vec<SelectionRange>,
}

impl StaticSelection {
    pub fn new(ranges: Vec<SelectionRange>) -> Self {
        Self { ranges }
    }

    pub fn with_range(mut self, range: SelectionRange) -> Self {
        self.ranges.push(range);
        self
    }
}

impl SelectionSource for StaticSelection {
    fn range_count(&self) -> usize {
        self.ranges.len()
    }

    fn range_at(&self, index: usize) -> Option<SelectionRange> {
        self.ranges.get(index).cloned()
    }
}

/// A cleaned user selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionContent {
    pub html: String,
    pub text: String,
    /// Lowercase tag name of the common ancestor element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Extract the first range of a selection.
///
/// Returns `None` when the selection has no ranges or the range contents are
/// blank. The contents are parsed first, so markup with implied end tags is
/// closed, then cleaned with the same pass as full-page extraction.
///
/// ```rust
/// use copydown_core::{ExtractConfig, SelectionRange, StaticSelection, extract_selection};
///
/// let selection = StaticSelection::default()
///     .with_range(SelectionRange::from_element("P", "Some <b>bold</b> words"));
/// let content = extract_selection(&selection, &ExtractConfig::default()).unwrap();
/// assert_eq!(content.text, "Some bold words");
/// assert_eq!(content.context.as_deref(), Some("p"));
///
/// assert!(extract_selection(&StaticSelection::default(), &ExtractConfig::default()).is_none());
/// ```
pub fn extract_selection<S: SelectionSource + ?Sized>(selection: &S, config: &ExtractConfig) -> Option<SelectionContent> {
    if selection.range_count() == 0 {
        debug!("no selection ranges");
        return None;
    }

    let range = selection.range_at(0)?;
    if range.contents.trim().is_empty() {
        debug!("selection is empty");
        return None;
    }

    // The streaming cleaner needs explicit end tags, which the parser supplies.
    let normalized = Document::parse_fragment(&range.contents).html().root_element().inner_html();
    let html = clean_html(&normalized, &config.clean);
    let text = rendered_text(&Document::parse_fragment(&html).root_node());
    let context = match range.common_ancestor {
        AncestorContainer::Element(tag) => Some(tag.to_lowercase()),
        AncestorContainer::Text | AncestorContainer::Other => None,
    };

    Some(SelectionContent { html, text, context })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoRanges;

    impl SelectionSource for NoRanges {
        fn range_count(&self) -> usize {
            0
        }

        fn range_at(&self, _index: usize) -> Option<SelectionRange> {
            Some(SelectionRange::new("<p>never read</p>", AncestorContainer::Other))
        }
    }

    #[test]
    fn test_zero_ranges_is_none() {
        assert!(extract_selection(&NoRanges, &ExtractConfig::default()).is_none());
    }

    #[test]
    fn test_blank_contents_is_none() {
        let selection = StaticSelection::default().with_range(SelectionRange::new("  \n", AncestorContainer::Text));
        assert!(extract_selection(&selection, &ExtractConfig::default()).is_none());
    }

    #[test]
    fn test_selection_is_cleaned() {
        let selection = StaticSelection::new(vec![SelectionRange::from_element(
            "article",
            r#"<p data-x="1">Kept</p><script>x()</script><span style="display:none">gone</span>"#,
        )]);

        let content = extract_selection(&selection, &ExtractConfig::default()).unwrap();
        assert_eq!(content.html, "<p>Kept</p>");
        assert_eq!(content.text, "Kept");
        assert_eq!(content.context.as_deref(), Some("article"));
    }

    #[test]
    fn test_text_ancestor_has_no_context() {
        let selection = StaticSelection::default().with_range(SelectionRange::new("partial word", AncestorContainer::Text));
        let content = extract_selection(&selection, &ExtractConfig::default()).unwrap();
        assert_eq!(content.text, "partial word");
        assert!(content.context.is_none());
    }

    #[test]
    fn test_only_first_range_is_used() {
        let selection = StaticSelection::default()
            .with_range(SelectionRange::from_element("p", "first"))
            .with_range(SelectionRange::from_element("p", "second"));
        let content = extract_selection(&selection, &ExtractConfig::default()).unwrap();
        assert_eq!(content.text, "first");
    }

    #[test]
    fn test_works_through_trait_object() {
        let selection: Box<dyn SelectionSource> =
            Box::new(StaticSelection::default().with_range(SelectionRange::from_element("li", "item")));
        assert!(extract_selection(selection.as_ref(), &ExtractConfig::default()).is_some());
    }

    #[test]
    fn test_unclosed_noise_does_not_swallow_siblings() {
        let selection = StaticSelection::default().with_range(SelectionRange::from_element(
            "div",
            r#"<p class="ad">Buy now<p>Real content one<p>Real content two"#,
        ));
        let content = extract_selection(&selection, &ExtractConfig::default()).unwrap();

        assert_eq!(content.text, "Real content one\nReal content two");
        assert!(!content.html.contains("Buy now"));
    }

    #[test]
    fn test_unclosed_hidden_item_is_removed_alone() {
        let selection = StaticSelection::default().with_range(SelectionRange::from_element(
            "ul",
            r#"<li style="display:none">hidden<li>Visible item<li>Another"#,
        ));
        let content = extract_selection(&selection, &ExtractConfig::default()).unwrap();

        assert_eq!(content.html, "<li>Visible item</li><li>Another</li>");
        assert_eq!(content.text, "Visible item\nAnother");
    }
}
