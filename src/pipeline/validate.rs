//! Post-assembly bank validation.
//!
//! Every check here is advisory: issues are collected into a report that
//! ships alongside the bank rather than aborting the run. A bank with a
//! hole in its id sequence is still usable for study; a silently missing
//! question is not discoverable at all.

use crate::output::QuestionBank;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// One problem found in an assembled bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationIssue {
    /// A global id expected by the contiguous 1..=N sequence is absent.
    MissingId { id: u32 },
    /// A global id appears more than once.
    DuplicateId { id: u32 },
    /// A global id lies beyond the contiguous 1..=N sequence.
    ExtraId { id: u32 },
    /// The question fell outside every subject range of its day.
    UnknownSubject {
        id: u32,
        day: String,
        original_number: u32,
    },
    /// The question carries no choices at all.
    NoChoices { id: u32 },
    /// The recorded answer does not index into the choice list.
    AnswerOutOfRange {
        id: u32,
        answer: u8,
        choice_count: usize,
    },
    /// A referenced figure file does not exist on disk.
    MissingImageFile { id: u32, path: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId { id } => write!(f, "question id {id} is missing"),
            Self::DuplicateId { id } => write!(f, "question id {id} appears more than once"),
            Self::ExtraId { id } => {
                write!(f, "question id {id} is outside the expected contiguous range")
            }
            Self::UnknownSubject {
                id,
                day,
                original_number,
            } => write!(
                f,
                "question {id} ({day} #{original_number}) matched no subject range"
            ),
            Self::NoChoices { id } => write!(f, "question {id} has no choices"),
            Self::AnswerOutOfRange {
                id,
                answer,
                choice_count,
            } => write!(
                f,
                "question {id}: answer {answer} outside 1..={choice_count}"
            ),
            Self::MissingImageFile { id, path } => {
                write!(f, "question {id}: image file '{path}' not found")
            }
        }
    }
}

/// The result of validating a bank: issues plus per-subject tallies.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// Question count per subject id, including `"unknown"`.
    pub subject_counts: BTreeMap<String, usize>,
}

impl ValidationReport {
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate an assembled bank. `output_dir` anchors the relative image
/// paths recorded in the question records.
pub fn validate_bank(bank: &QuestionBank, output_dir: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    // Id sequence: contiguous from 1 up to the question count. Comparing
    // against the count rather than the highest id keeps one stray outlier
    // (say 99 in a bank of 4) a single ExtraId instead of a wall of
    // MissingId entries.
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for q in &bank.questions {
        *counts.entry(q.id).or_default() += 1;
    }
    let expected_max = bank.questions.len() as u32;
    for id in 1..=expected_max {
        match counts.get(&id) {
            None => report.issues.push(ValidationIssue::MissingId { id }),
            Some(&n) if n > 1 => report.issues.push(ValidationIssue::DuplicateId { id }),
            Some(_) => {}
        }
    }
    for (&id, _) in counts.range(expected_max + 1..) {
        report.issues.push(ValidationIssue::ExtraId { id });
    }

    for q in &bank.questions {
        *report.subject_counts.entry(q.subject.clone()).or_default() += 1;

        if q.subject == "unknown" {
            report.issues.push(ValidationIssue::UnknownSubject {
                id: q.id,
                day: q.day.clone(),
                original_number: q.original_number,
            });
        }

        if q.choices.is_empty() {
            report.issues.push(ValidationIssue::NoChoices { id: q.id });
        } else if q.answer == 0 || q.answer as usize > q.choices.len() {
            report.issues.push(ValidationIssue::AnswerOutOfRange {
                id: q.id,
                answer: q.answer,
                choice_count: q.choices.len(),
            });
        }

        for rel in &q.images {
            if !output_dir.join(rel).is_file() {
                report.issues.push(ValidationIssue::MissingImageFile {
                    id: q.id,
                    path: rel.clone(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{BankMeta, QuestionRecord};

    fn record(id: u32) -> QuestionRecord {
        QuestionRecord {
            id,
            day: "day1".into(),
            original_number: id,
            subject: "surgery".into(),
            question_text: "질문".into(),
            images: vec![],
            choices: vec!["A".into(), "B".into(), "C".into()],
            answer: 1,
            explanation: String::new(),
            is_ox: false,
        }
    }

    fn bank(questions: Vec<QuestionRecord>) -> QuestionBank {
        QuestionBank {
            meta: BankMeta {
                total_questions: questions.len(),
                days: vec![],
                subjects: vec![],
            },
            questions,
        }
    }

    #[test]
    fn clean_bank_produces_no_issues() {
        let b = bank(vec![record(1), record(2), record(3)]);
        let report = validate_bank(&b, Path::new("/nonexistent"));
        assert!(report.is_clean());
        assert_eq!(report.subject_counts["surgery"], 3);
    }

    #[test]
    fn gap_in_id_sequence_is_reported() {
        let b = bank(vec![record(1), record(2), record(4)]);
        let report = validate_bank(&b, Path::new("/nonexistent"));
        assert_eq!(
            report.issues,
            vec![
                ValidationIssue::MissingId { id: 3 },
                ValidationIssue::ExtraId { id: 4 },
            ]
        );
    }

    #[test]
    fn duplicate_id_is_reported() {
        let b = bank(vec![record(1), record(1)]);
        let report = validate_bank(&b, Path::new("/nonexistent"));
        assert_eq!(
            report.issues,
            vec![
                ValidationIssue::DuplicateId { id: 1 },
                ValidationIssue::MissingId { id: 2 },
            ]
        );
    }

    #[test]
    fn outlier_id_is_one_issue_not_a_flood_of_gaps() {
        let b = bank(vec![record(1), record(2), record(3), record(99)]);
        let report = validate_bank(&b, Path::new("/nonexistent"));
        assert_eq!(
            report.issues,
            vec![
                ValidationIssue::MissingId { id: 4 },
                ValidationIssue::ExtraId { id: 99 },
            ]
        );
    }

    #[test]
    fn unknown_subject_is_reported() {
        let mut q = record(1);
        q.subject = "unknown".into();
        let report = validate_bank(&bank(vec![q]), Path::new("/nonexistent"));
        assert_eq!(report.issue_count(), 1);
        assert!(matches!(
            report.issues[0],
            ValidationIssue::UnknownSubject { id: 1, .. }
        ));
        assert_eq!(report.subject_counts["unknown"], 1);
    }

    #[test]
    fn answer_outside_choice_list_is_reported() {
        let mut q = record(1);
        q.answer = 5;
        let report = validate_bank(&bank(vec![q]), Path::new("/nonexistent"));
        assert!(matches!(
            report.issues[0],
            ValidationIssue::AnswerOutOfRange {
                answer: 5,
                choice_count: 3,
                ..
            }
        ));
    }

    #[test]
    fn empty_choice_list_is_reported_once() {
        let mut q = record(1);
        q.choices.clear();
        let report = validate_bank(&bank(vec![q]), Path::new("/nonexistent"));
        // NoChoices, not additionally AnswerOutOfRange.
        assert_eq!(report.issues, vec![ValidationIssue::NoChoices { id: 1 }]);
    }

    #[test]
    fn referenced_image_files_are_checked_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/day1_q001_1.jpg"), b"x").unwrap();

        let mut present = record(1);
        present.images = vec!["images/day1_q001_1.jpg".into()];
        let mut absent = record(2);
        absent.images = vec!["images/day1_q002_1.jpg".into()];

        let report = validate_bank(&bank(vec![present, absent]), dir.path());
        assert_eq!(
            report.issues,
            vec![ValidationIssue::MissingImageFile {
                id: 2,
                path: "images/day1_q002_1.jpg".into()
            }]
        );
    }
}
