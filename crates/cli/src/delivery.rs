//! Where converted output ends up: stdout or a file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Longest title fragment kept in a generated filename, in characters.
const MAX_TITLE_CHARS: usize = 100;

/// Destination for converted output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

/// How a destination was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub destination: Destination,
    /// Set when stdout was requested but the output was too large for it
    pub oversized_fallback: bool,
}

/// Turn a page title into a filesystem-safe name fragment.
///
/// Runs of characters other than letters, digits, `-` and `_` become a single
/// `_`. An empty result becomes `untitled`.
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::new();
    for ch in title.chars().take(MAX_TITLE_CHARS) {
        if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() { "untitled".to_string() } else { trimmed.to_string() }
}

/// Build `<sanitized-title>_<timestamp>.<extension>`, with `:` and `.` in the
/// timestamp replaced by `-`.
pub fn generate_filename(title: &str, timestamp: &str, extension: &str) -> String {
    format!("{}_{}.{}", sanitize_title(title), timestamp.replace([':', '.'], "-"), extension)
}

/// Pick a destination.
///
/// An explicit output path always wins. `save` writes to a generated file in
/// `dir`. Otherwise output goes to stdout unless it is oversized, in which
/// case it falls back to the generated file.
pub fn choose_destination(output: Option<PathBuf>, save: bool, oversized: bool, dir: &Path, filename: &str) -> Delivery {
    match output {
        Some(path) => Delivery { destination: Destination::File(path), oversized_fallback: false },
        None if save => Delivery { destination: Destination::File(dir.join(filename)), oversized_fallback: false },
        None if oversized => Delivery { destination: Destination::File(dir.join(filename)), oversized_fallback: true },
        None => Delivery { destination: Destination::Stdout, oversized_fallback: false },
    }
}

/// Write `content` to `destination`.
pub fn deliver(destination: &Destination, content: &str) -> anyhow::Result<()> {
    match destination {
        Destination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes()).context("Failed to write to stdout")?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n").context("Failed to write to stdout")?;
            }
            Ok(())
        }
        Destination::File(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))
        }
    }
}
