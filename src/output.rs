//! Output types: the assembled question bank and run statistics.
//!
//! Field names serialise in camelCase (`originalNumber`, `questionText`,
//! `isOX`, …) because the emitted `questions.json` is consumed directly by a
//! web frontend whose schema predates this crate. `Deserialize` is derived
//! too so downstream tools can round-trip an existing bank.

use crate::pipeline::validate::ValidationReport;
use serde::{Deserialize, Serialize};

/// One fully-assembled question. Immutable once created by the assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    /// Global sequential identifier, contiguous from 1 across all days.
    pub id: u32,
    /// Day identifier this question came from, e.g. `"day1"`.
    pub day: String,
    /// Question number as printed in the source document.
    pub original_number: u32,
    /// Subject id from the classification table, or `"unknown"`.
    pub subject: String,
    /// Question stem with line breaks collapsed and page markers stripped.
    pub question_text: String,
    /// Relative paths of persisted figure files, in attribution order.
    pub images: Vec<String>,
    /// Choice texts, 1-based by position. May contain placeholder strings
    /// for image-only choices; empty when no choices could be extracted.
    pub choices: Vec<String>,
    /// 1-based correct-answer ordinal. Defaults to 1 when no answer token
    /// was parsed (the condition is counted in [`ExtractionStats`]).
    pub answer: u8,
    /// Explanation text, empty when the span had none.
    pub explanation: String,
    /// Whether this is an O/X (true/false) question.
    #[serde(rename = "isOX")]
    pub is_ox: bool,
}

/// Per-day summary in the bank metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMeta {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

/// Per-subject summary in the bank metadata.
///
/// `question_range` is expressed in *global* question ids: ranges of later
/// days are shifted by the expected maxima of the days before them, so a
/// frontend can map any global id to its subject without knowing day sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMeta {
    pub id: String,
    pub name: String,
    pub day: String,
    pub question_range: (u32, u32),
}

/// Bank-level metadata block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankMeta {
    pub total_questions: usize,
    pub days: Vec<DayMeta>,
    pub subjects: Vec<SubjectMeta>,
}

/// The complete serialisable result of a run: `{ meta, questions }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub meta: BankMeta,
    pub questions: Vec<QuestionRecord>,
}

/// Counters describing what a run did and what it had to tolerate.
///
/// The "tolerated" counters are the non-fatal half of the error design:
/// they never abort a run but must reach the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Documents processed.
    pub documents: usize,
    /// Question records emitted.
    pub total_questions: usize,
    /// Figure files written to disk.
    pub images_saved: usize,
    /// Embedded images dropped because their bytes failed to decode.
    pub images_skipped: usize,
    /// Embedded images with no attributable question (silently dropped).
    pub images_unattributed: usize,
    /// Questions emitted with an empty choice list.
    pub questions_without_choices: usize,
    /// Questions whose span had no recognisable answer token.
    pub questions_without_answer: usize,
    /// Wall-clock duration of the whole run in milliseconds.
    pub total_duration_ms: u64,
}

impl ExtractionStats {
    /// Fold one document's counters into the run totals.
    ///
    /// `documents` and `total_duration_ms` are owned by the orchestrator
    /// and deliberately not folded here.
    pub fn absorb(&mut self, day: &ExtractionStats) {
        self.total_questions += day.total_questions;
        self.images_saved += day.images_saved;
        self.images_skipped += day.images_skipped;
        self.images_unattributed += day.images_unattributed;
        self.questions_without_choices += day.questions_without_choices;
        self.questions_without_answer += day.questions_without_answer;
    }
}

/// Everything [`crate::extract::extract`] returns: the bank, the run
/// statistics, and the advisory validation report.
#[derive(Debug, Clone, Serialize)]
pub struct BankOutput {
    pub bank: QuestionBank,
    pub stats: ExtractionStats,
    pub report: ValidationReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> QuestionRecord {
        QuestionRecord {
            id: 125,
            day: "day2".into(),
            original_number: 1,
            subject: "digestive".into(),
            question_text: "다음 중 옳은 것은?".into(),
            images: vec!["images/day2_q001_1.jpg".into()],
            choices: vec!["A".into(), "B".into()],
            answer: 2,
            explanation: "B가 맞다.".into(),
            is_ox: false,
        }
    }

    #[test]
    fn record_serialises_with_consumer_field_names() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["originalNumber"], 1);
        assert_eq!(json["questionText"], "다음 중 옳은 것은?");
        assert_eq!(json["isOX"], false);
        assert_eq!(json["images"][0], "images/day2_q001_1.jpg");
        // No snake_case leakage
        assert!(json.get("original_number").is_none());
        assert!(json.get("is_ox").is_none());
    }

    #[test]
    fn subject_range_serialises_as_two_element_array() {
        let meta = SubjectMeta {
            id: "digestive".into(),
            name: "소화기계".into(),
            day: "day2".into(),
            question_range: (125, 149),
        };
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["questionRange"], serde_json::json!([125, 149]));
    }

    #[test]
    fn bank_round_trips() {
        let bank = QuestionBank {
            meta: BankMeta {
                total_questions: 1,
                days: vec![DayMeta {
                    id: "day2".into(),
                    name: "2일차".into(),
                    question_count: 1,
                }],
                subjects: vec![],
            },
            questions: vec![sample_record()],
        };
        let json = serde_json::to_string(&bank).unwrap();
        let back: QuestionBank = serde_json::from_str(&json).unwrap();
        assert_eq!(back.meta.total_questions, 1);
        assert_eq!(back.questions[0].id, 125);
    }
}
