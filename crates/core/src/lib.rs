pub mod dom;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod metadata;
pub mod parse;
pub mod preprocess;
pub mod selection;

pub use dom::{HtmlNode, MarkupNode, rendered_text};
pub use error::{CopydownError, Result};
pub use extract::{DEFAULT_SIZE_THRESHOLD, MAIN_CONTENT_SELECTORS};
pub use extract::{ExtractConfig, ExtractConfigBuilder, ExtractedContent};
pub use extract::{check_content_size, exceeds_default_size, extract_from_selector, extract_full_page, find_main_content};
pub use formatters::{CaptureMetadata, ConversionOptions, ConversionResult, MarkdownConverter, Rule};
pub use formatters::{JsonConfig, capture_to_json, metadata_to_json};
pub use formatters::{capture_timestamp, cleanup, convert, convert_with_metadata, convert_with_timestamp};
pub use metadata::{PageMetadata, UNTITLED, extract_page_metadata};
pub use parse::{Document, Element};
pub use preprocess::{CleanConfig, clean_html, sanitize_html};
pub use selection::{AncestorContainer, SelectionContent, SelectionRange, SelectionSource, StaticSelection};
pub use selection::extract_selection;
