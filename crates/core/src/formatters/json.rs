use serde::Serialize;

use crate::Result;
use crate::extract::check_content_size;
use crate::metadata::PageMetadata;

/// Complete JSON output structure for one capture
#[derive(Debug, Clone, Serialize)]
pub struct JsonCapture<'a> {
    /// Page metadata
    pub metadata: &'a PageMetadata,
    /// ISO-8601 time of the capture
    pub captured_at: &'a str,
    /// Converted Markdown
    pub markdown: &'a str,
    /// Cleaned HTML, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<&'a str>,
    /// Size facts used for delivery decisions
    pub size: SizeReport,
}

/// Byte sizes of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeReport {
    /// UTF-8 byte length of the Markdown
    pub bytes: usize,
    /// Threshold the Markdown was checked against
    pub threshold: usize,
    /// Whether `bytes` exceeds `threshold`
    pub exceeds_threshold: bool,
}

impl SizeReport {
    pub fn measure(markdown: &str, threshold: usize) -> Self {
        Self { bytes: markdown.len(), threshold, exceeds_threshold: check_content_size(markdown, threshold) }
    }
}

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Include the cleaned HTML in output
    pub include_html: bool,
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Render a capture as JSON.
pub fn capture_to_json(
    metadata: &PageMetadata, markdown: &str, html: &str, captured_at: &str, threshold: usize, config: &JsonConfig,
) -> Result<String> {
    let output = JsonCapture {
        metadata,
        captured_at,
        markdown,
        html: config.include_html.then_some(html),
        size: SizeReport::measure(markdown, threshold),
    };

    if config.pretty { Ok(serde_json::to_string_pretty(&output)?) } else { Ok(serde_json::to_string(&output)?) }
}

/// Render page metadata alone as JSON.
pub fn metadata_to_json(metadata: &PageMetadata, pretty: bool) -> Result<String> {
    if pretty { Ok(serde_json::to_string_pretty(metadata)?) } else { Ok(serde_json::to_string(metadata)?) }
}
