//! Noise removal for extracted subtrees.
//!
//! Both passes here are streaming `lol_html` rewrites: they read a serialized
//! subtree and write a new string, so the source document is never mutated.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::{CopydownError, Result};

/// Attribute name prefix stripped from every retained element.
pub const NOISE_ATTRIBUTE_PREFIX: &str = "data-";

/// Structural, advertising and tracking patterns removed with their content.
pub const NOISE_SELECTORS: &[&str] = &[
    // advertisements
    ".ad",
    ".ads",
    ".advert",
    ".advertisement",
    ".ad-banner",
    ".ad-container",
    ".ad-wrapper",
    ".adsbygoogle",
    "[class*=\"advertisement\"]",
    "[id^=\"ad-slot\"]",
    "[id^=\"ad-container\"]",
    "[id^=\"ad-banner\"]",
    "[id*=\"advertisement\"]",
    // cookie and consent banners
    ".cookie-banner",
    ".cookie-notice",
    ".cookie-consent",
    ".consent-banner",
    "#cookie-banner",
    "[class*=\"cookie-consent\"]",
    // social share widgets
    ".social-share",
    ".share-buttons",
    ".sharing-buttons",
    ".social-links",
    "[class*=\"social-share\"]",
    // newsletter signups
    ".newsletter",
    ".newsletter-signup",
    ".subscribe-form",
    "[class*=\"newsletter-signup\"]",
];

/// Hosts whose `<iframe>` embeds are treated as noise.
pub const EMBED_HOSTS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
    "dailymotion.com",
    "twitter.com",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
];

static HIDDEN_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)display\s*:\s*none").expect("hidden style pattern is valid"));

/// Configuration for the noise-removal pass
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Whether to remove elements hidden with `display: none` or the `hidden` attribute
    pub remove_hidden: bool,
    /// Whether to strip `data-*` attributes from retained elements
    pub strip_data_attributes: bool,
    /// Additional CSS selectors removed on top of the fixed denylist
    pub extra_selectors: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self { remove_hidden: true, strip_data_attributes: true, extra_selectors: Vec::new() }
    }
}

/// Remove noise from a serialized subtree.
///
/// Drops `<script>`, `<style>` and `<noscript>` elements, hidden elements, everything
/// matching [`NOISE_SELECTORS`], third-party embeds from [`EMBED_HOSTS`] and
/// HTML comments, then strips `data-*` attributes from what remains.
///
/// If the rewriter fails the subtree is dropped (an empty string is returned)
/// rather than handing back uncleaned markup.
pub fn clean_html(html: &str, config: &CleanConfig) -> String {
    match remove_noise(html, config) {
        Ok(cleaned) => {
            debug!(before = html.len(), after = cleaned.len(), "removed noise");
            cleaned
        }
        Err(e) => {
            warn!(error = %e, "noise removal failed, dropping subtree");
            String::new()
        }
    }
}

fn remove_noise(html: &str, config: &CleanConfig) -> Result<String> {
    let embed_selectors: Vec<String> = EMBED_HOSTS
        .iter()
        .map(|host| format!("iframe[src*=\"{}\"]", host))
        .collect();

    let extra_selectors = config.extra_selectors.iter().filter(|selector| {
        match selector.parse::<lol_html::Selector>() {
            Ok(_) => true,
            Err(e) => {
                warn!(selector = %selector, error = %e, "skipping invalid noise selector");
                false
            }
        }
    });

    let selectors: Vec<&str> = ["script", "style", "noscript"]
        .into_iter()
        .chain(NOISE_SELECTORS.iter().copied())
        .chain(embed_selectors.iter().map(String::as_str))
        .chain(extra_selectors.map(String::as_str))
        .collect();

    let mut handlers: Vec<_> = selectors
        .iter()
        .map(|selector| {
            lol_html::element!(*selector, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let remove_hidden = config.remove_hidden;
    let strip_data = config.strip_data_attributes;
    handlers.push(lol_html::element!("*", move |el| {
        if remove_hidden
            && (el.has_attribute("hidden")
                || el.get_attribute("style").is_some_and(|style| HIDDEN_STYLE.is_match(&style)))
        {
            el.remove();
            return Ok(());
        }

        if strip_data {
            let noisy: Vec<String> = el
                .attributes()
                .iter()
                .map(|attr| attr.name())
                .filter(|name| name.to_ascii_lowercase().starts_with(NOISE_ATTRIBUTE_PREFIX))
                .collect();
            for name in noisy {
                el.remove_attribute(&name);
            }
        }

        Ok(())
    }));

    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: handlers,
            document_content_handlers: vec![lol_html::doc_comments!(|comment| {
                comment.remove();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter.write(html.as_bytes())?;
    rewriter.end()?;

    String::from_utf8(output).map_err(|e| CopydownError::RewriteError(e.to_string()))
}

/// Strip `<script>` elements and inline event handlers.
///
/// A narrower sibling of [`clean_html`] for general use: ads, hidden
/// elements and `data-*` attributes are left alone.
pub fn sanitize_html(html: &str) -> String {
    match strip_script_handlers(html) {
        Ok(sanitized) => sanitized,
        Err(e) => {
            warn!(error = %e, "sanitizing failed, dropping markup");
            String::new()
        }
    }
}

fn strip_script_handlers(html: &str) -> Result<String> {
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                lol_html::element!("*", |el| {
                    let handlers: Vec<String> = el
                        .attributes()
                        .iter()
                        .map(|attr| attr.name())
                        .filter(|name| name.to_ascii_lowercase().starts_with("on"))
                        .collect();
                    for name in handlers {
                        el.remove_attribute(&name);
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter.write(html.as_bytes())?;
    rewriter.end()?;

    String::from_utf8(output).map_err(|e| CopydownError::RewriteError(e.to_string()))
}
