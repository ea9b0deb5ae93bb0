pub mod cleanup;
pub mod json;
pub mod markdown;
pub mod prepare;
pub mod rules;

pub use cleanup::cleanup;
pub use json::{JsonCapture, JsonConfig, SizeReport, capture_to_json, metadata_to_json};
pub use markdown::{
    CaptureMetadata, ConversionOptions, ConversionResult, MarkdownConverter, capture_timestamp, convert,
    convert_with_metadata, convert_with_timestamp,
};
pub use rules::{DEFAULT_ALT_TEXT, Rule, custom_rules};
