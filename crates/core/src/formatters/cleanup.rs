//! Post-processing cleanup applied to every conversion.

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("trailing space pattern is valid"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(\S.*?)[ \t]*$").expect("heading pattern is valid"));

static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Tidy converted Markdown.
///
/// Strips trailing spaces from every line, normalizes the gap after heading
/// markers to one space and collapses runs of blank lines to one. Leading
/// newlines and trailing whitespace of the whole text are removed. Running it
/// on its own output changes nothing.
pub fn cleanup(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n");
    let stripped = TRAILING_SPACES.replace_all(&normalized, "");
    let headings = HEADING.replace_all(&stripped, "$1 $2");
    let collapsed = BLANK_LINES.replace_all(&headings, "\n\n");
    collapsed.trim_start_matches('\n').trim_end().to_string()
}
