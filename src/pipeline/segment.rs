//! Question segmentation: split a document's full text into per-question
//! spans.
//!
//! ## The monotonic filter
//!
//! The only boundary cue available in a flattened exam text is a line
//! starting with `"<number>. "`. That cue is weak: explanation prose is full
//! of enumerations like `"1. 아스피린은 1차 약제로…"` that look identical to
//! a question marker. The defence is monotonicity — real question numbers
//! only ever increase, and never exceed the document's known maximum. Any
//! candidate whose value is ≤ the last accepted number (or > the maximum) is
//! prose, not a boundary.

use crate::backend::DocumentBackend;
use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

/// In-text page boundary marker injected between pages.
///
/// The `<<PAGE:n>>` shape cannot occur in extracted exam text, so stripping
/// it later is unambiguous.
pub fn page_marker(page: usize) -> String {
    format!("\n<<PAGE:{page}>>\n")
}

static RE_PAGE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<<PAGE:\d+>>").unwrap());

/// Remove all page markers from a piece of text.
pub fn strip_page_markers(text: &str) -> String {
    RE_PAGE_MARKER.replace_all(text, "").to_string()
}

/// Concatenate every page's text, preceding each page with its marker.
///
/// This is the segmenter's input: one continuous string in which page
/// boundaries survive as markers so later stages can strip or inspect them.
pub fn full_text_with_markers<B: DocumentBackend>(backend: &B) -> Result<String, ExtractError> {
    let mut parts = Vec::with_capacity(backend.page_count() * 2);
    for page in 0..backend.page_count() {
        parts.push(page_marker(page));
        parts.push(backend.page_text(page)?);
    }
    Ok(parts.concat())
}

/// A contiguous slice of the marked-up full text believed to belong to one
/// question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSpan {
    /// The question number as printed in the document.
    pub number: u32,
    /// Raw span text, from this question's marker to the next accepted
    /// marker (page markers still embedded).
    pub raw: String,
}

/// A 1-to-3-digit integer followed by a period and whitespace, anchored at a
/// line start.
static RE_QUESTION_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\d{1,3})\.\s").unwrap());

/// Split the full text into ordered per-question spans.
///
/// `expected_max` is the highest question number this document is known to
/// contain. Candidate markers are walked in textual order; one is accepted
/// only if its value is strictly greater than the last accepted value and
/// at most `expected_max`. Each accepted span runs from its marker's start
/// to the next accepted marker's start (end of text for the last).
///
/// Zero accepted markers yields an empty list — a data-quality condition for
/// validation to surface, not an error.
pub fn split_questions(full_text: &str, expected_max: u32) -> Vec<QuestionSpan> {
    let mut accepted: Vec<(u32, usize)> = Vec::new();
    let mut last_accepted = 0u32;

    for caps in RE_QUESTION_MARKER.captures_iter(full_text) {
        let (Some(m), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(number) = digits.as_str().parse::<u32>() else {
            continue;
        };
        if number > last_accepted && number <= expected_max {
            accepted.push((number, m.start()));
            last_accepted = number;
        }
    }

    let mut spans = Vec::with_capacity(accepted.len());
    for (i, &(number, start)) in accepted.iter().enumerate() {
        let end = accepted
            .get(i + 1)
            .map(|&(_, next_start)| next_start)
            .unwrap_or(full_text.len());
        spans.push(QuestionSpan {
            number,
            raw: full_text[start..end].trim().to_string(),
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_filter_rejects_enumeration_in_prose() {
        let text = "12. stem twelve\n해설: something\n13. stem thirteen\n\
                    해설: 다음과 같다\n1. 아스피린은 1차 약제\n2. 기타\n14. stem fourteen\n";
        let spans = split_questions(text, 14);
        let numbers: Vec<u32> = spans.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![12, 13, 14]);
        // The rejected "1." stays inside question 13's span.
        assert!(spans[1].raw.contains("아스피린"));
    }

    #[test]
    fn numbers_above_expected_max_are_rejected() {
        let text = "1. first\n2. second\n999. page footer artefact\n3. third\n";
        let spans = split_questions(text, 3);
        let numbers: Vec<u32> = spans.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(split_questions("", 124).is_empty());
    }

    #[test]
    fn input_with_no_line_start_markers_yields_empty_list() {
        let text = "서론 10. 이것은 줄 중간의 숫자이므로 경계가 아니다";
        assert!(split_questions(text, 124).is_empty());
    }

    #[test]
    fn spans_run_marker_to_marker() {
        let text = "preamble\n1. alpha\nbeta\n2. gamma\n";
        let spans = split_questions(text, 10);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].raw, "1. alpha\nbeta");
        assert_eq!(spans[1].raw, "2. gamma");
    }

    #[test]
    fn marker_works_across_page_boundaries() {
        let text = format!("{}1. one\ncontinued{}2. two\n", page_marker(0), page_marker(1));
        let spans = split_questions(&text, 2);
        assert_eq!(spans.len(), 2);
        // The boundary marker stays inside the first span's raw text.
        assert!(spans[0].raw.contains("<<PAGE:1>>"));
    }

    #[test]
    fn strip_page_markers_removes_all() {
        let text = "a<<PAGE:0>>b<<PAGE:12>>c";
        assert_eq!(strip_page_markers(text), "abc");
    }

    #[test]
    fn gaps_in_numbering_are_tolerated() {
        // Question 2 missing from the scan; 3 still accepted (3 > 1).
        let text = "1. one\n3. three\n";
        let numbers: Vec<u32> = split_questions(text, 5).iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }
}
