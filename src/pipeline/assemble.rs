//! Per-document assembly: merge the textual channel (spans, parsed content)
//! with the spatial channel (attributed figures) into final records.
//!
//! This is the only stage that writes to disk, and the stage where the
//! tolerated-degradation counters accumulate: a span without an answer
//! token gets the default answer, an undecodable figure is skipped, and
//! both are counted rather than aborting the day.

use crate::backend::DocumentBackend;
use crate::config::{DaySpec, ExtractionConfig};
use crate::error::ExtractError;
use crate::output::{ExtractionStats, QuestionRecord};
use crate::pipeline::{attribute, images, locate, parse, segment};
use tracing::{debug, warn};

/// Subject id for `number` on this day: first containing range wins,
/// `"unknown"` when none matches.
pub fn classify_subject(day: &DaySpec, number: u32) -> String {
    day.subjects
        .iter()
        .find(|s| s.contains(number))
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Run the full per-document pipeline and emit this day's records.
///
/// `id_offset` is added to every original number to form the global id;
/// the caller accumulates it across days. The image directory must exist
/// before this is called.
pub fn assemble_day<B: DocumentBackend>(
    backend: &B,
    day: &DaySpec,
    id_offset: u32,
    config: &ExtractionConfig,
    stats: &mut ExtractionStats,
) -> Result<Vec<QuestionRecord>, ExtractError> {
    let full_text = segment::full_text_with_markers(backend)?;
    let spans = segment::split_questions(&full_text, day.expected_max);

    if spans.len() as u32 != day.expected_max {
        let found: std::collections::BTreeSet<u32> = spans.iter().map(|s| s.number).collect();
        let missing: Vec<u32> = (1..=day.expected_max)
            .filter(|n| !found.contains(n))
            .collect();
        warn!(
            day = %day.id,
            segmented = spans.len(),
            expected = day.expected_max,
            ?missing,
            "question count differs from the expected maximum"
        );
    }
    if let Some(cb) = &config.progress_callback {
        cb.on_day_segmented(&day.id, spans.len());
    }

    let numbers: Vec<u32> = spans.iter().map(|s| s.number).collect();
    let anchors = locate::locate_questions(backend, &numbers)?;
    let placements = locate::locate_images(backend)?;
    let assigned = attribute::assign_images(&anchors, &placements);

    let attributed: usize = assigned.values().map(Vec::len).sum();
    stats.images_unattributed += placements.len() - attributed;

    let image_dir = config.image_dir();
    let mut records = Vec::with_capacity(spans.len());

    for span in &spans {
        let parsed = parse::parse_span(&span.raw);
        let is_ox = day.is_binary_choice(span.number);

        let answer = match parsed.answer {
            Some(a) => a,
            None => {
                stats.questions_without_answer += 1;
                warn!(day = %day.id, number = span.number, "no answer token, defaulting to 1");
                1
            }
        };

        // Markerless spans: the choices exist only as figures. Synthesis
        // needs an answer token confirming the question is actually
        // multiple-choice; without one the empty list stands so the
        // counters and the validator surface it.
        let mut choices = parsed.choices;
        if choices.is_empty() && parsed.answer.is_some() {
            choices = parse::synthesize_image_choices(answer, config.max_choices, is_ox);
        }
        if choices.is_empty() {
            stats.questions_without_choices += 1;
            warn!(day = %day.id, number = span.number, "no extractable choices");
        }

        let mut image_paths = Vec::new();
        if let Some(question_images) = assigned.get(&span.number) {
            // Sequence numbers count saved figures only, so skipped decodes
            // leave no gaps in the file names.
            let mut seq = 0usize;
            for placement in question_images {
                let img = match backend.load_image(placement.handle) {
                    Ok(img) => img,
                    Err(err) => {
                        stats.images_skipped += 1;
                        warn!(
                            day = %day.id,
                            number = span.number,
                            handle = %placement.handle,
                            %err,
                            "skipping undecodable figure"
                        );
                        continue;
                    }
                };
                seq += 1;
                let file_name = images::image_file_name(&day.id, span.number, seq);
                images::save_question_image(
                    &img,
                    &image_dir.join(&file_name),
                    config.max_image_width,
                    config.jpeg_quality,
                )?;
                stats.images_saved += 1;
                image_paths.push(format!("{}/{}", config.image_subdir, file_name));
            }
        }

        if let Some(cb) = &config.progress_callback {
            cb.on_question_complete(&day.id, span.number, image_paths.len());
        }

        records.push(QuestionRecord {
            id: id_offset + span.number,
            day: day.id.clone(),
            original_number: span.number,
            subject: classify_subject(day, span.number),
            question_text: parsed.text,
            images: image_paths,
            choices,
            answer,
            explanation: parsed.explanation,
            is_ox,
        });
    }

    stats.total_questions += records.len();
    debug!(day = %day.id, questions = records.len(), "assembled day");
    Ok(records)
}
