//! CLI tool for cutting client narratives into slide-sized text blocs.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use slidefill_core::{
    BlocSegmenter, LayoutLimits, MemoryDeck, OverflowPolicy, RetryPolicy, SlideFiller,
};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Separator printed between blocs in text output.
const BLOC_SEPARATOR: &str = "\n\n---\n\n";

/// Cut narratives into blocs that each fit one slide.
#[derive(Parser, Debug)]
#[command(name = "slidefill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input narrative file(s), or - for stdin
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// JSON file with layout limits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum logical lines per bloc
    #[arg(long)]
    bloc_max_lines: Option<usize>,

    /// Maximum characters per wrapped paragraph line
    #[arg(long)]
    line_max_chars: Option<usize>,

    /// Elements shorter than this are titles
    #[arg(long)]
    title_max_chars: Option<usize>,

    /// Lines of headroom required before a title
    #[arg(long)]
    title_paragraph_min_space: Option<usize>,

    /// Lines of headroom required before a new paragraph
    #[arg(long)]
    paragraphs_min_space: Option<usize>,

    /// Handling of a full bloc's overflowing line without period or comma
    #[arg(long, value_enum, default_value_t = OverflowArg::Carry)]
    overflow: OverflowArg,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Dry-run slide filling under this title and print the resulting deck
    #[arg(long)]
    plan: Option<String>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// How blocs are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Blocs separated by `---` lines
    Text,
    /// A JSON document per input
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

/// Overflow policy as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OverflowArg {
    /// Close the full bloc and carry the line into the next one
    Carry,
    /// Keep the line in the full bloc
    Overflow,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Carry => Self::CarryLine,
            OverflowArg::Overflow => Self::Overflow,
        }
    }
}

/// JSON output for one narrative.
#[derive(Debug, Serialize)]
struct SegmentedNarrative<'a> {
    source: &'a str,
    limits: LayoutLimits,
    bloc_count: usize,
    blocs: &'a [String],
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let limits = resolve_limits(&args)?;
    let segmenter = BlocSegmenter::new(limits)?.with_overflow_policy(args.overflow.into());

    log::debug!("Using layout limits {:?}", limits);

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_input(input_path, &args, &segmenter) {
            Ok(output) => {
                if args.print || is_stdin(input_path) {
                    print!("{}", output);
                } else {
                    let output_path = get_output_path(input_path, args.output.as_ref(), args.format)?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Build layout limits from the config file (or defaults) plus flag overrides.
fn resolve_limits(args: &Args) -> Result<LayoutLimits> {
    let mut limits = match &args.config {
        Some(path) => LayoutLimits::from_file(path)
            .with_context(|| format!("Failed to load limits from {}", path.display()))?,
        None => LayoutLimits::default(),
    };

    if let Some(v) = args.bloc_max_lines {
        limits.bloc_max_lines = v;
    }
    if let Some(v) = args.line_max_chars {
        limits.line_max_chars = v;
    }
    if let Some(v) = args.title_max_chars {
        limits.title_max_chars = v;
    }
    if let Some(v) = args.title_paragraph_min_space {
        limits.title_paragraph_min_space = v;
    }
    if let Some(v) = args.paragraphs_min_space {
        limits.paragraphs_min_space = v;
    }

    limits.validate()?;
    Ok(limits)
}

/// Segment a single narrative and render it in the requested form.
fn process_input(input_path: &Path, args: &Args, segmenter: &BlocSegmenter) -> Result<String> {
    let narrative = read_narrative(input_path)?;
    let blocs = segmenter.segment(&narrative);

    if args.verbose {
        eprintln!("  Cut into {} blocs", blocs.len());
    }

    if let Some(title) = &args.plan {
        return plan_deck(title, &blocs);
    }

    format_blocs(&input_path.display().to_string(), segmenter.limits(), &blocs, args.format)
}

/// Read a narrative from a file, or from stdin for `-`.
fn read_narrative(input_path: &Path) -> Result<String> {
    let mut narrative = String::new();

    if is_stdin(input_path) {
        std::io::stdin()
            .read_to_string(&mut narrative)
            .context("Failed to read stdin")?;
    } else {
        File::open(input_path)
            .with_context(|| format!("Failed to open {}", input_path.display()))?
            .read_to_string(&mut narrative)
            .with_context(|| format!("Failed to read {}", input_path.display()))?;
    }

    Ok(narrative)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Format blocs as text or JSON.
fn format_blocs(
    source: &str,
    limits: &LayoutLimits,
    blocs: &[String],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            if blocs.is_empty() {
                Ok(String::new())
            } else {
                Ok(format!("{}\n", blocs.join(BLOC_SEPARATOR)))
            }
        }
        OutputFormat::Json => {
            let doc = SegmentedNarrative {
                source,
                limits: *limits,
                bloc_count: blocs.len(),
                blocs,
            };
            Ok(format!("{}\n", serde_json::to_string_pretty(&doc)?))
        }
    }
}

/// Fill a single-slide in-memory deck with the blocs and describe it.
fn plan_deck(title: &str, blocs: &[String]) -> Result<String> {
    let mut deck = MemoryDeck::new(["content"]);
    let filler = SlideFiller::new()
        .with_retry_policy(RetryPolicy::none())
        .with_pace(Duration::ZERO);

    filler.fill(&mut deck, "content", 1, title, blocs)?;

    Ok(format!("{}\n", deck.describe()))
}

/// Determine the output path for a processed file.
fn get_output_path(
    input_path: &Path,
    output_dir: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.blocs.{}", stem, format.extension());

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
