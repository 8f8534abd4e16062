//! CLI binary for pdf2qbank.
//!
//! A thin shim over the library crate that reads a day manifest, maps CLI
//! flags to `ExtractionConfig`, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2qbank::{
    extract_to_file, inspect, DaySpec, ExtractionConfig, ExtractionProgressCallback,
    ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one progress bar across the whole run, with
/// per-day log lines. The bar's length grows as each day is segmented (the
/// question count is unknown until then).
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length grows in on_day_segmented

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening documents…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Switch to the full progress-bar style once the first day's question
    /// count is known.
    fn activate_bar(&self) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} questions  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_days: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting extraction of {total_days} document(s)…"))
        ));
    }

    fn on_day_start(&self, day_id: &str, day_index: usize, total_days: usize) {
        self.bar
            .set_message(format!("{day_id} ({}/{total_days})", day_index + 1));
    }

    fn on_day_segmented(&self, day_id: &str, question_count: usize) {
        if self.bar.length().unwrap_or(0) == 0 {
            self.activate_bar();
        }
        self.bar.inc_length(question_count as u64);
        self.bar.println(format!(
            "  {} {}: {} questions segmented",
            cyan("◆"),
            bold(day_id),
            question_count
        ));
    }

    fn on_question_complete(&self, _day_id: &str, _number: u32, _image_count: usize) {
        self.bar.inc(1);
    }

    fn on_day_complete(&self, day_id: &str, questions: usize, images: usize) {
        self.bar.println(format!(
            "  {} {}  {:>3} questions  {}",
            green("✓"),
            bold(day_id),
            questions,
            dim(&format!("{images} images")),
        ));
    }

    fn on_extraction_complete(&self, total_questions: usize, issue_count: usize) {
        self.bar.finish_and_clear();
        if issue_count == 0 {
            eprintln!(
                "{} {} questions extracted, validation clean",
                green("✔"),
                bold(&total_questions.to_string())
            );
        } else {
            eprintln!(
                "{} {} questions extracted  ({} validation issues)",
                cyan("⚠"),
                bold(&total_questions.to_string()),
                red(&issue_count.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract using a day manifest
  pdf2qbank days.json

  # Custom output location
  pdf2qbank days.json -o build/questions.json --output-dir build

  # Smaller images
  pdf2qbank days.json --max-image-width 600 --jpeg-quality 75

  # Inspect the documents without extracting
  pdf2qbank days.json --inspect-only

  # Machine-readable run summary on stdout
  pdf2qbank days.json --json > summary.json

MANIFEST FORMAT (JSON array of days, processed in order):
  [
    {
      "id": "day1",
      "name": "1일차",
      "pdf": "data/day1.pdf",
      "expected_max": 124,
      "subjects": [
        { "id": "surgery", "name": "수술환자관리", "lo": 1, "hi": 8 }
      ],
      "binary_choice_range": [120, 124]
    }
  ]

OUTPUT:
  <output-dir>/questions.json   the question bank ({ meta, questions })
  <output-dir>/images/          extracted figures (JPEG, downscaled)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library

SETUP:
  pdfium is loaded at runtime. Download a build from
  https://github.com/bblanchon/pdfium-binaries and either place libpdfium
  next to the executable or set PDFIUM_LIB_PATH.
"#;

/// Extract a structured question bank from scanned exam PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2qbank",
    version,
    about = "Extract a structured JSON question bank from scanned exam PDFs",
    long_about = "Segment multi-day exam PDFs into per-question records — stem, choices, \
answer, explanation — and spatially attribute embedded figures to their questions. \
Documents and subject tables are described by a JSON manifest.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Day manifest: JSON array of documents with subject tables.
    manifest: PathBuf,

    /// Output JSON file. Default: <output-dir>/questions.json.
    #[arg(short, long, env = "PDF2QBANK_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory receiving the bank and the images/ subdirectory.
    #[arg(long, env = "PDF2QBANK_OUTPUT_DIR", default_value = "public/data")]
    output_dir: PathBuf,

    /// Maximum figure width in pixels (larger figures are downscaled).
    #[arg(long, env = "PDF2QBANK_MAX_IMAGE_WIDTH", default_value_t = 800,
          value_parser = clap::value_parser!(u32).range(100..))]
    max_image_width: u32,

    /// JPEG quality for extracted figures (1–100).
    #[arg(long, env = "PDF2QBANK_JPEG_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Ceiling for synthesized placeholder choices.
    #[arg(long, env = "PDF2QBANK_MAX_CHOICES", default_value_t = 5)]
    max_choices: usize,

    /// Print the run summary (stats + validation report) as JSON on stdout.
    #[arg(long, env = "PDF2QBANK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2QBANK_NO_PROGRESS")]
    no_progress: bool,

    /// Print page/image counts per document, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2QBANK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2QBANK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Load manifest ────────────────────────────────────────────────────
    let manifest_text = tokio::fs::read_to_string(&cli.manifest)
        .await
        .with_context(|| format!("Failed to read manifest {:?}", cli.manifest))?;
    let days: Vec<DaySpec> = serde_json::from_str(&manifest_text)
        .with_context(|| format!("Failed to parse manifest {:?}", cli.manifest))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let mut summaries = Vec::new();
        for day in &days {
            let summary = inspect(&day.pdf)
                .await
                .with_context(|| format!("Failed to inspect {:?}", day.pdf))?;
            summaries.push((day.id.clone(), summary));
        }

        if cli.json {
            let json: Vec<_> = summaries.iter().map(|(_, s)| s).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json).context("Failed to serialise summaries")?
            );
        } else {
            for (id, s) in &summaries {
                println!("Day:     {id}");
                println!("File:    {}", s.path.display());
                println!("Pages:   {}", s.pages);
                println!("Images:  {}", s.embedded_images);
                println!();
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let mut builder = ExtractionConfig::builder()
        .days(days)
        .output_dir(&cli.output_dir)
        .max_image_width(cli.max_image_width)
        .jpeg_quality(cli.jpeg_quality)
        .max_choices(cli.max_choices);
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.output_dir.join("questions.json"));

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract_to_file(config, &output_path)
        .await
        .context("Extraction failed")?;

    if cli.json {
        let summary = serde_json::json!({
            "stats": output.stats,
            "report": output.report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        // Summary lines (the callback already printed the per-day log).
        eprintln!(
            "{}  {} questions  {} images  {}ms  →  {}",
            if output.report.is_clean() {
                green("✔")
            } else {
                cyan("⚠")
            },
            output.stats.total_questions,
            output.stats.images_saved,
            output.stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        for (subject, count) in &output.report.subject_counts {
            eprintln!("   {}  {}", dim(&format!("{count:>4}")), subject);
        }
        if !output.report.is_clean() {
            eprintln!("   {} validation issues:", output.report.issue_count());
            for issue in &output.report.issues {
                eprintln!("   {} {}", red("•"), issue);
            }
        }
    }

    Ok(())
}
