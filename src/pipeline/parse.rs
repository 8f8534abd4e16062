//! Span parsing: per-question extraction of stem, choices, answer, and
//! explanation.
//!
//! A pure function of the span's raw text; no geometry, no backend. The
//! awkward part is notation polymorphism: the source exams write choices
//! either as `1) 2) 3)` or as circled numerals `① ② ③ ④ ⑤`, and a single
//! document can mix both across questions. Detection is by counting markers
//! in the pre-answer region, with the documented tie-break: numbered wins
//! ties. Choices that carry a marker but no trailing text are figures
//! standing in for text and become placeholder strings.

use super::segment::strip_page_markers;
use once_cell::sync::Lazy;
use regex::Regex;

/// Circled-numeral glyphs in ordinal order, the alternate choice notation.
const CIRCLED: [char; 5] = ['①', '②', '③', '④', '⑤'];

/// Map a circled-numeral glyph to its 1-based ordinal.
fn circled_ordinal(glyph: char) -> Option<u8> {
    CIRCLED
        .iter()
        .position(|&c| c == glyph)
        .map(|i| (i + 1) as u8)
}

// Answer-boundary patterns: a line starting with 답/정답 and a colon or
// semicolon, or an explanation/solution header. The earliest hit ends the
// region eligible for choice extraction.
static RE_ANSWER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*(?:정?답)\s*[:;]").unwrap());
static RE_EXPLANATION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*해설\s*:").unwrap());
static RE_SOLUTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*풀이\s*:").unwrap());

// Choice markers. The numbered pattern deliberately has no trailing `\s*`:
// greedy whitespace would swallow the newline that anchors the next marker.
static RE_NUMBERED_CHOICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\n)\s*(\d)\)\s?").unwrap());
static RE_CIRCLED_CHOICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([①②③④⑤])\s?").unwrap());

static RE_ANSWER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:정답|답)\s*[:;]\s*(\d|[①②③④⑤])").unwrap());
static RE_EXPLANATION_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(?:해설|풀이)\s*:\s*(.*)").unwrap());

static RE_LEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\n)\d{1,3}\.\s").unwrap());
static RE_FIRST_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*1\)\s").unwrap());
static RE_LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());

/// Everything extracted from one question span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestion {
    /// The question stem, whitespace-collapsed.
    pub text: String,
    /// Extracted choices, 1-based by position. Empty when no markers found.
    pub choices: Vec<String>,
    /// 1-based answer ordinal, `None` when no token was recognised.
    pub answer: Option<u8>,
    /// Explanation text, empty when absent.
    pub explanation: String,
}

/// Parse one raw question span.
pub fn parse_span(raw: &str) -> ParsedQuestion {
    ParsedQuestion {
        text: question_text(raw),
        choices: parse_choices(raw),
        answer: parse_answer(raw),
        explanation: parse_explanation(raw),
    }
}

/// Collapse internal line breaks to single spaces and trim.
fn collapse_lines(text: &str) -> String {
    RE_LINE_BREAKS.replace_all(text.trim(), " ").trim().to_string()
}

/// Byte offset of the earliest answer/explanation/solution boundary, or
/// `text.len()` when none exists.
fn answer_boundary(text: &str) -> usize {
    [&RE_ANSWER_LINE, &RE_EXPLANATION_LINE, &RE_SOLUTION_LINE]
        .iter()
        .filter_map(|re| re.find(text).map(|m| m.start()))
        .min()
        .unwrap_or(text.len())
}

/// Placeholder string for a choice that exists only as a figure.
pub fn placeholder_choice(ordinal: impl std::fmt::Display) -> String {
    format!("(보기 {ordinal} - 이미지 참조)")
}

/// Extract the choice list, auto-detecting the notation in use.
pub fn parse_choices(raw: &str) -> Vec<String> {
    let clean = strip_page_markers(raw);
    let pre_answer = &clean[..answer_boundary(&clean)];

    // (marker start, text start, 1-based ordinal printed in the marker)
    let numbered: Vec<(usize, usize, u8)> = RE_NUMBERED_CHOICE
        .captures_iter(pre_answer)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let ordinal = caps.get(1)?.as_str().parse().ok()?;
            Some((whole.start(), whole.end(), ordinal))
        })
        .collect();
    let circled: Vec<(usize, usize, u8)> = RE_CIRCLED_CHOICE
        .captures_iter(pre_answer)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let glyph = caps.get(1)?.as_str().chars().next()?;
            Some((whole.start(), whole.end(), circled_ordinal(glyph)?))
        })
        .collect();

    let markers = if !numbered.is_empty() && numbered.len() >= circled.len() {
        numbered
    } else {
        circled
    };

    let mut choices = Vec::new();
    for (i, &(_, text_start, ordinal)) in markers.iter().enumerate() {
        let end = markers
            .get(i + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(pre_answer.len());
        let text = collapse_lines(&pre_answer[text_start..end]);
        if text.is_empty() {
            choices.push(placeholder_choice(ordinal));
        } else {
            choices.push(text);
        }
    }
    choices
}

/// Extract the 1-based answer ordinal from the span, if any.
pub fn parse_answer(raw: &str) -> Option<u8> {
    let caps = RE_ANSWER_TOKEN.captures(raw)?;
    let token = &caps[1];
    if let Some(glyph) = token.chars().next().filter(|c| CIRCLED.contains(c)) {
        circled_ordinal(glyph)
    } else {
        token.parse().ok()
    }
}

/// Extract the explanation: everything after the first 해설:/풀이: header.
pub fn parse_explanation(raw: &str) -> String {
    match RE_EXPLANATION_BODY.captures(raw) {
        Some(caps) => collapse_lines(&strip_page_markers(&caps[1])),
        None => String::new(),
    }
}

/// Extract the question stem: text after the number marker, truncated at
/// the earliest of the first numbered-choice marker, the first circled
/// glyph, or the answer boundary.
pub fn question_text(raw: &str) -> String {
    let body = match RE_LEADING_MARKER.find(raw) {
        Some(m) => &raw[m.end()..],
        None => raw,
    };

    let mut cut = body.len();
    if let Some(m) = RE_FIRST_NUMBERED.find(body) {
        cut = cut.min(m.start());
    }
    if let Some(idx) = body.find(CIRCLED[0]) {
        cut = cut.min(idx);
    }
    if let Some(m) = RE_ANSWER_LINE.find(body) {
        cut = cut.min(m.start());
    }

    collapse_lines(&strip_page_markers(&body[..cut]))
}

/// Synthesize placeholder choices for a question whose choices are all
/// figures (no markers found in the text, but an answer token exists).
///
/// Binary-choice questions get exactly `["O", "X"]`; everything else gets
/// one placeholder per ordinal up to the answer, padded to `max_choices`.
pub fn synthesize_image_choices(answer: u8, max_choices: usize, is_binary: bool) -> Vec<String> {
    if is_binary {
        return vec!["O".to_string(), "X".to_string()];
    }
    let mut choices: Vec<String> = (1..=answer).map(placeholder_choice).collect();
    while choices.len() < max_choices {
        choices.push(placeholder_choice(choices.len() + 1));
    }
    choices
}
