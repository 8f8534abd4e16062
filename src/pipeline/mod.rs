//! Pipeline stages for exam-PDF extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different document backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! backend text ──▶ segment ──▶ parse ────────────┐
//!                                                ├──▶ assemble ──▶ validate
//! backend geometry ──▶ locate ──▶ attribute ─────┘
//! ```
//!
//! 1. [`segment`]   — split the page-marked full text into per-question
//!    spans using the monotonic numbering filter
//! 2. [`locate`]    — two read-only geometry passes: question anchors and
//!    image placements
//! 3. [`attribute`] — assign every image to the question it visually
//!    follows (three-tier nearest-above rule)
//! 4. [`parse`]     — per-span extraction of stem, choices, answer, and
//!    explanation, auto-detecting the choice notation
//! 5. [`images`]    — flatten/downscale/JPEG-encode attributed figures
//! 6. [`assemble`]  — merge everything into [`crate::output::QuestionRecord`]s
//! 7. [`validate`]  — advisory consistency checks over the assembled set

pub mod assemble;
pub mod attribute;
pub mod images;
pub mod locate;
pub mod parse;
pub mod segment;
pub mod validate;
