//! Configuration types for exam-PDF extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, serialise the day/subject
//! tables for logging, and diff two runs to understand why their outputs
//! differ.
//!
//! The per-document tables ([`DaySpec`], [`SubjectRange`]) are plain data
//! records, deliberately not code: which numeric range belongs to which
//! subject, and which range holds O/X (true/false) questions, changes with
//! every exam sitting. They derive `Deserialize` so the CLI can read them
//! straight from a JSON manifest.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A named numeric range of original question numbers used for subject
/// classification.
///
/// Ranges are inclusive on both ends and evaluated in declaration order;
/// the first containing range wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRange {
    /// Stable subject identifier, e.g. `"cardio"`.
    pub id: String,
    /// Display name, e.g. `"심혈관계"`.
    pub name: String,
    /// Lowest original question number in this subject (inclusive).
    pub lo: u32,
    /// Highest original question number in this subject (inclusive).
    pub hi: u32,
}

impl SubjectRange {
    /// Whether `number` falls inside this range.
    pub fn contains(&self, number: u32) -> bool {
        self.lo <= number && number <= self.hi
    }
}

/// Static description of one exam document (one "day" of a multi-day exam).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySpec {
    /// Stable day identifier, e.g. `"day1"`; also used in image file names.
    pub id: String,
    /// Display name, e.g. `"1일차"`.
    pub name: String,
    /// Path to the exam PDF.
    pub pdf: PathBuf,
    /// Highest question number this document is known to contain.
    ///
    /// Known a priori per sitting; the segmenter rejects any candidate
    /// marker above it, and the structural-mismatch check compares the
    /// segmented count against it.
    pub expected_max: u32,
    /// Ordered subject classification table for this day.
    pub subjects: Vec<SubjectRange>,
    /// Inclusive range of original numbers holding O/X (binary) questions,
    /// if this day has any.
    #[serde(default)]
    pub binary_choice_range: Option<(u32, u32)>,
}

impl DaySpec {
    /// Whether `number` is an O/X question on this day.
    pub fn is_binary_choice(&self, number: u32) -> bool {
        self.binary_choice_range
            .is_some_and(|(lo, hi)| lo <= number && number <= hi)
    }
}

/// Configuration for an extraction run.
///
/// Built via [`ExtractionConfig::builder()`].
///
/// # Example
/// ```rust
/// use pdf2qbank::{DaySpec, ExtractionConfig};
///
/// let config = ExtractionConfig::builder()
///     .day(DaySpec {
///         id: "day1".into(),
///         name: "1일차".into(),
///         pdf: "data/day1.pdf".into(),
///         expected_max: 124,
///         subjects: vec![],
///         binary_choice_range: Some((120, 124)),
///     })
///     .output_dir("public/data")
///     .max_image_width(800)
///     .build()
///     .unwrap();
/// assert_eq!(config.days.len(), 1);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Documents to process, in order. Global question ids are assigned
    /// sequentially across days, so order matters.
    pub days: Vec<DaySpec>,

    /// Directory receiving `questions.json` and the image subdirectory.
    /// Default: `public/data`.
    pub output_dir: PathBuf,

    /// Name of the image subdirectory under `output_dir`. Default: `images`.
    ///
    /// Image paths in the emitted JSON are relative to `output_dir`
    /// (`images/day1_q001_1.jpg`), matching what a static web frontend
    /// serves.
    pub image_subdir: String,

    /// Maximum width in pixels for persisted figures. Default: 800.
    ///
    /// Scanned exam figures are often full-page 2000+ px scans; downscaling
    /// to 800 px keeps the bank small enough to ship with a web app while
    /// staying legible on screen. Height scales proportionally.
    pub max_image_width: u32,

    /// JPEG quality (1–100) for persisted figures. Default: 85.
    pub jpeg_quality: u8,

    /// Ceiling for synthesized placeholder choices. Default: 5.
    ///
    /// When a question has image-only choices (no caption text), the parser
    /// synthesizes placeholders up to this count, matching the five-option
    /// convention of the source exams.
    pub max_choices: usize,

    /// Optional progress callback receiving per-day and per-question events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            output_dir: PathBuf::from("public/data"),
            image_subdir: "images".to_string(),
            max_image_width: 800,
            jpeg_quality: 85,
            max_choices: 5,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("days", &self.days)
            .field("output_dir", &self.output_dir)
            .field("image_subdir", &self.image_subdir)
            .field("max_image_width", &self.max_image_width)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_choices", &self.max_choices)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Absolute path of the image output directory.
    pub fn image_dir(&self) -> PathBuf {
        self.output_dir.join(&self.image_subdir)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    /// Replace the full day list.
    pub fn days(mut self, days: Vec<DaySpec>) -> Self {
        self.config.days = days;
        self
    }

    /// Append one day.
    pub fn day(mut self, day: DaySpec) -> Self {
        self.config.days.push(day);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn image_subdir(mut self, name: impl Into<String>) -> Self {
        self.config.image_subdir = name.into();
        self
    }

    pub fn max_image_width(mut self, px: u32) -> Self {
        self.config.max_image_width = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn max_choices(mut self, n: usize) -> Self {
        self.config.max_choices = n.max(2);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.days.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "at least one day must be configured".into(),
            ));
        }
        for (i, day) in c.days.iter().enumerate() {
            if day.id.is_empty() {
                return Err(ExtractError::InvalidConfig(format!(
                    "day {} has an empty id",
                    i + 1
                )));
            }
            if day.expected_max == 0 {
                return Err(ExtractError::InvalidConfig(format!(
                    "day '{}': expected_max must be ≥ 1",
                    day.id
                )));
            }
            if c.days[..i].iter().any(|d| d.id == day.id) {
                return Err(ExtractError::InvalidConfig(format!(
                    "duplicate day id '{}'",
                    day.id
                )));
            }
            for s in &day.subjects {
                if s.lo > s.hi {
                    return Err(ExtractError::InvalidConfig(format!(
                        "day '{}': subject '{}' has inverted range {}–{}",
                        day.id, s.id, s.lo, s.hi
                    )));
                }
            }
            if let Some((lo, hi)) = day.binary_choice_range {
                if lo > hi {
                    return Err(ExtractError::InvalidConfig(format!(
                        "day '{}': binary_choice_range is inverted ({}–{})",
                        day.id, lo, hi
                    )));
                }
            }
        }
        if c.image_subdir.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "image_subdir must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
