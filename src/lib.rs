//! # pdf2qbank
//!
//! Convert multi-page scanned exam PDFs into a structured JSON question bank.
//!
//! ## Why this crate?
//!
//! Exam PDFs carry two parallel information channels: the text layer (question
//! stems, choices, answers, explanations as one undifferentiated stream) and
//! the geometry layer (embedded figures placed at coordinates, with no textual
//! link to the question they belong to). Generic PDF-to-text tools flatten the
//! first and discard the second. This crate recovers both — it segments the
//! text stream into per-question spans using the monotonic numbering of the
//! source exam, and re-attaches each embedded figure to its question by
//! spatial proximity.
//!
//! ## Pipeline Overview
//!
//! ```text
//! exam PDF (per day)
//!  │
//!  ├─ 1. Segment    page texts + markers → monotonic question spans
//!  ├─ 2. Locate     geometry pass: question anchors + image placements
//!  ├─ 3. Attribute  three-tier spatial figure→question assignment
//!  ├─ 4. Parse      per-span stem / choices / answer / explanation
//!  ├─ 5. Assemble   records with global ids, figures saved as JPEG
//!  └─ 6. Validate   advisory report: id gaps, unknown subjects, …
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2qbank::{extract_to_file, DaySpec, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .day(DaySpec {
//!             id: "day1".into(),
//!             name: "1일차".into(),
//!             pdf: "data/day1.pdf".into(),
//!             expected_max: 124,
//!             subjects: vec![],
//!             binary_choice_range: Some((120, 124)),
//!         })
//!         .output_dir("public/data")
//!         .build()?;
//!
//!     let output = extract_to_file(config, "public/data/questions.json").await?;
//!     eprintln!(
//!         "{} questions, {} images, {} validation issues",
//!         output.stats.total_questions,
//!         output.stats.images_saved,
//!         output.report.issue_count()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2qbank` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when embedding only the library:
//! ```toml
//! pdf2qbank = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Rendering is backed by the pdfium shared library, resolved at runtime:
//! `PDFIUM_LIB_PATH`, then a copy in the working directory, then the system
//! library. See [`backend::pdfium::bind_pdfium`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DaySpec, ExtractionConfig, ExtractionConfigBuilder, SubjectRange};
pub use error::ExtractError;
pub use extract::{extract, extract_sync, extract_to_file, inspect, DocumentSummary};
pub use output::{
    BankMeta, BankOutput, DayMeta, ExtractionStats, QuestionBank, QuestionRecord, SubjectMeta,
};
pub use pipeline::validate::{ValidationIssue, ValidationReport};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
