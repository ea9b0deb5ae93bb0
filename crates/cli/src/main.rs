mod delivery;
mod echo;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use copydown_core::{
    ConversionOptions, DEFAULT_SIZE_THRESHOLD, Document, ExtractConfig, ExtractedContent, JsonConfig, SelectionRange,
    StaticSelection, capture_timestamp, capture_to_json, check_content_size, convert, convert_with_metadata,
    convert_with_timestamp, extract_from_selector, extract_full_page, extract_selection,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::delivery::{choose_destination, deliver, generate_filename};
use crate::echo::{
    format_size, print_banner, print_detail, print_error, print_extraction_details, print_info, print_step,
    print_success, print_timing_summary, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Markdown,
    Html,
    Text,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: markdown, html, text, json", s)),
        }
    }
}

/// Convert a rendered HTML page, or part of it, into clean Markdown
#[derive(Parser, Debug)]
#[command(name = "copydown")]
#[command(author = "Copydown Contributors")]
#[command(version)]
#[command(about = "Turn rendered web pages into clean Markdown", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (markdown, html, text, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    format: OutputFormat,

    /// Extract the first element matching this CSS selector instead of the main content
    #[arg(long, value_name = "CSS", conflicts_with = "selection")]
    selector: Option<String>,

    /// Treat the contents of the first element matching this CSS selector as a user selection
    #[arg(long, value_name = "CSS")]
    selection: Option<String>,

    /// URL the page was loaded from
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Prepend a Source/Captured header (Markdown only)
    #[arg(long)]
    metadata: bool,

    /// Size in bytes above which stdout output falls back to a file
    #[arg(long, default_value_t = DEFAULT_SIZE_THRESHOLD, value_name = "BYTES")]
    max_bytes: usize,

    /// Write to a generated filename instead of stdout
    #[arg(long)]
    save: bool,

    /// Directory for generated filenames
    #[arg(long, default_value = ".", value_name = "DIR")]
    dir: PathBuf,

    /// Additional CSS selector to remove as noise (repeatable)
    #[arg(long = "remove", value_name = "CSS")]
    remove: Vec<String>,

    /// Keep elements hidden with display:none or the hidden attribute
    #[arg(long)]
    keep_hidden: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "copydown=debug,copydown_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn extract(doc: &Document, args: &Args, config: &ExtractConfig) -> anyhow::Result<ExtractedContent> {
    if let Some(selector) = &args.selector {
        return extract_from_selector(doc, selector, config)
            .with_context(|| format!("Invalid selector: {}", selector))?
            .with_context(|| format!("No element matches selector: {}", selector));
    }

    if let Some(selector) = &args.selection {
        let element = doc
            .select_first(selector)
            .with_context(|| format!("Invalid selector: {}", selector))?
            .with_context(|| format!("No element matches selector: {}", selector))?;
        let selection = StaticSelection::default()
            .with_range(SelectionRange::from_element(&element.tag_name(), element.inner_html()));
        let content = extract_selection(&selection, config).context("Selection is empty")?;

        if let Some(context) = &content.context {
            tracing::debug!(context = %context, "selection ancestor");
        }
        return Ok(ExtractedContent { html: content.html, text: content.text, metadata: doc.extract_metadata() });
    }

    Ok(extract_full_page(doc, config))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut timings: Vec<(&str, Duration)> = Vec::new();

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
        print_step(1, 4, &format!("Reading {}", if args.input == "-" { "stdin" } else { args.input.as_str() }));
    }

    let step = Instant::now();
    let html = read_input(&args.input)?;
    timings.push(("Read", step.elapsed()));

    if args.verbose {
        print_detail("Size", &format_size(html.len()));
        eprintln!();
        print_step(2, 4, "Parsing HTML document");
    }

    let step = Instant::now();
    let doc = match &args.url {
        Some(url) => Document::parse_with_url(&html, url).context("Failed to parse page URL")?,
        None => Document::parse(&html),
    };
    timings.push(("Parse", step.elapsed()));

    if args.verbose {
        print_step(3, 4, "Extracting content");
    }

    let mut config = ExtractConfig::builder()
        .remove_hidden(!args.keep_hidden)
        .size_threshold(args.max_bytes);
    for selector in &args.remove {
        config = config.extra_noise_selector(selector.as_str());
    }
    let config = config.build();

    let step = Instant::now();
    let extracted = extract(&doc, args, &config)?;
    timings.push(("Extract", step.elapsed()));

    if args.verbose {
        print_extraction_details(&extracted);
        print_step(4, 4, "Converting and writing output");
    }

    let step = Instant::now();
    let mut timestamp = capture_timestamp();
    let metadata = &extracted.metadata;
    let output = match args.format {
        OutputFormat::Markdown if args.metadata && !metadata.url.is_empty() => {
            let result = convert_with_metadata(&extracted.html, &metadata.title, &metadata.url);
            timestamp = result.metadata.timestamp;
            result.markdown
        }
        OutputFormat::Markdown => {
            let options = ConversionOptions { include_metadata: args.metadata, base_url: None };
            convert_with_timestamp(&extracted.html, &options, &timestamp)
        }
        OutputFormat::Html => extracted.html.clone(),
        OutputFormat::Text => extracted.text.clone(),
        OutputFormat::Json => {
            let markdown = convert(&extracted.html, &ConversionOptions::default());
            let config = JsonConfig { include_html: true, pretty: true };
            capture_to_json(metadata, &markdown, &extracted.html, &timestamp, args.max_bytes, &config)
                .context("Failed to render JSON")?
        }
    };
    timings.push(("Convert", step.elapsed()));

    let oversized = check_content_size(&output, args.max_bytes);
    let filename = generate_filename(&metadata.title, &timestamp, args.format.extension());
    let delivery = choose_destination(args.output.clone(), args.save, oversized, &args.dir, &filename);

    if delivery.oversized_fallback {
        print_warning(&format!(
            "Output is {} (limit {}), writing to a file instead of stdout",
            format_size(output.len()),
            format_size(args.max_bytes)
        ));
    }

    deliver(&delivery.destination, &output)?;

    if let delivery::Destination::File(path) = &delivery.destination {
        print_success(&format!("Output written to {}", path.display().bright_white()));
    }

    if args.verbose {
        eprintln!();
        print_timing_summary(started.elapsed(), &timings);
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
