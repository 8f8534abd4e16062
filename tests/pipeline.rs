//! Integration tests for the extraction pipeline.
//!
//! These run the whole per-document pipeline — segmentation, anchor and
//! image location, attribution, parsing, assembly, figure persistence,
//! validation — against an in-memory mock document, so they need neither a
//! pdfium library nor a real exam PDF.

use image::{DynamicImage, Rgba, RgbaImage};
use pdf2qbank::backend::{DocumentBackend, EmbeddedImage, ImageHandle};
use pdf2qbank::pipeline::{assemble, validate};
use pdf2qbank::{
    DaySpec, ExtractError, ExtractionConfig, ExtractionProgressCallback, ExtractionStats,
    SubjectRange,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Mock document backend ────────────────────────────────────────────────────

struct MockImageSpec {
    width: u32,
    height: u32,
    top: f32,
    broken: bool,
}

struct MockPage {
    text: &'static str,
    /// `(literal, top offset)` pairs reported by text search.
    anchors: Vec<(&'static str, f32)>,
    images: Vec<MockImageSpec>,
}

struct MockBackend {
    pages: Vec<MockPage>,
}

impl DocumentBackend for MockBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String, ExtractError> {
        Ok(self.pages[page].text.to_string())
    }

    fn find_text_on_page(&self, page: usize, literal: &str) -> Result<Vec<f32>, ExtractError> {
        Ok(self.pages[page]
            .anchors
            .iter()
            .filter(|(text, _)| *text == literal)
            .map(|&(_, y)| y)
            .collect())
    }

    fn images_on_page(&self, page: usize) -> Result<Vec<EmbeddedImage>, ExtractError> {
        Ok(self.pages[page]
            .images
            .iter()
            .enumerate()
            .map(|(object, spec)| EmbeddedImage {
                handle: ImageHandle { page, object },
                width_px: spec.width,
                height_px: spec.height,
                placement_tops: vec![spec.top],
            })
            .collect())
    }

    fn load_image(&self, handle: ImageHandle) -> Result<DynamicImage, ExtractError> {
        let spec = &self.pages[handle.page].images[handle.object];
        if spec.broken {
            return Err(ExtractError::Internal(format!(
                "image {handle}: stream truncated"
            )));
        }
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            spec.width,
            spec.height,
            Rgba([40, 80, 120, 255]),
        )))
    }
}

/// Two-page exam with four questions, both choice notations, an O/X range,
/// and three embedded figures exercising the attribution tiers:
/// - page 0, below question 2: tier 1 (same page, nearest above);
/// - page 0, broken stream: attributed but skipped at decode;
/// - page 1, above every anchor on its page: tier 2 (preceding page).
fn sample_backend() -> MockBackend {
    MockBackend {
        pages: vec![
            MockPage {
                text: "1. 수술 전 처치로 옳은 것은?\n① 가\n② 나\n③ 다\n답: ①\n\
                       2. 그림의 기구 명칭은?\n1) 겸자\n2) 지혈기\n정답: 2\n",
                anchors: vec![("1. ", 100.0), ("2. ", 250.0)],
                images: vec![
                    MockImageSpec {
                        width: 1200,
                        height: 300,
                        top: 300.0,
                        broken: false,
                    },
                    MockImageSpec {
                        width: 600,
                        height: 200,
                        top: 320.0,
                        broken: true,
                    },
                ],
            },
            MockPage {
                text: "3. 셋째 질문?\n1) X\n2) Y\n답: 1\n해설: 위\n1. 항목 참조\n\
                       4. 지혈대는 상처 원위부에 적용한다\n답: 2\n",
                anchors: vec![("3. ", 120.0), ("4. ", 400.0)],
                images: vec![MockImageSpec {
                    width: 200,
                    height: 200,
                    top: 50.0,
                    broken: false,
                }],
            },
        ],
    }
}

fn sample_day() -> DaySpec {
    DaySpec {
        id: "day1".into(),
        name: "1일차".into(),
        pdf: "unused.pdf".into(),
        expected_max: 4,
        subjects: vec![
            SubjectRange {
                id: "anatomy".into(),
                name: "해부학".into(),
                lo: 1,
                hi: 2,
            },
            SubjectRange {
                id: "physio".into(),
                name: "생리학".into(),
                lo: 3,
                hi: 4,
            },
        ],
        binary_choice_range: Some((4, 4)),
    }
}

fn config_in(dir: &std::path::Path) -> ExtractionConfig {
    ExtractionConfig::builder()
        .day(sample_day())
        .output_dir(dir)
        .build()
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn full_day_extraction_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    let config = config_in(dir.path());
    let mut stats = ExtractionStats::default();

    let records =
        assemble::assemble_day(&sample_backend(), &sample_day(), 0, &config, &mut stats).unwrap();

    // Four questions, ids contiguous from 1. The decoy "1." line inside
    // question 3's explanation must not start a new span.
    assert_eq!(records.len(), 4);
    assert_eq!(
        records.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );

    // Question 1: circled notation.
    assert_eq!(records[0].question_text, "수술 전 처치로 옳은 것은?");
    assert_eq!(records[0].choices, vec!["가", "나", "다"]);
    assert_eq!(records[0].answer, 1);
    assert_eq!(records[0].subject, "anatomy");

    // Question 2: numbered notation, plus the attributed figures.
    assert_eq!(records[1].choices, vec!["겸자", "지혈기"]);
    assert_eq!(records[1].answer, 2);

    // Question 3: explanation captured, decoy line included in it.
    assert_eq!(records[2].answer, 1);
    assert_eq!(records[2].explanation, "위 1. 항목 참조");
    assert_eq!(records[2].subject, "physio");

    // Question 4: O/X range with no printed choices.
    assert!(records[3].is_ox);
    assert_eq!(records[3].choices, vec!["O", "X"]);
    assert_eq!(records[3].answer, 2);

    assert_eq!(stats.total_questions, 4);
    assert_eq!(stats.questions_without_answer, 0);
    assert_eq!(stats.questions_without_choices, 0);
}

#[test]
fn figures_are_attributed_saved_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    let config = config_in(dir.path());
    let mut stats = ExtractionStats::default();

    let records =
        assemble::assemble_day(&sample_backend(), &sample_day(), 0, &config, &mut stats).unwrap();

    // All three placements resolve to question 2: the page-0 pair by the
    // same-page rule, the page-1 figure by falling back to the bottom-most
    // anchor of the preceding page. The broken one is skipped at decode,
    // and the saved figures stay contiguously numbered from 1 regardless.
    let q2 = &records[1];
    assert_eq!(
        q2.images,
        vec!["images/day1_q002_1.jpg", "images/day1_q002_2.jpg"]
    );
    for other in [&records[0], &records[2], &records[3]] {
        assert!(other.images.is_empty());
    }

    assert_eq!(stats.images_saved, 2);
    assert_eq!(stats.images_skipped, 1);
    assert_eq!(stats.images_unattributed, 0);

    // Files exist on disk and the oversized one was downscaled.
    let wide = image::open(dir.path().join("images/day1_q002_1.jpg")).unwrap();
    assert_eq!(wide.width(), 800);
    assert_eq!(wide.height(), 200);
    let small = image::open(dir.path().join("images/day1_q002_2.jpg")).unwrap();
    assert_eq!((small.width(), small.height()), (200, 200));
}

#[test]
fn assembled_bank_validates_clean_and_serialises_for_the_frontend() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    let config = config_in(dir.path());
    let mut stats = ExtractionStats::default();

    let questions =
        assemble::assemble_day(&sample_backend(), &sample_day(), 0, &config, &mut stats).unwrap();

    let bank = pdf2qbank::QuestionBank {
        meta: pdf2qbank::BankMeta {
            total_questions: questions.len(),
            days: vec![pdf2qbank::DayMeta {
                id: "day1".into(),
                name: "1일차".into(),
                question_count: questions.len(),
            }],
            subjects: vec![],
        },
        questions,
    };

    let report = validate::validate_bank(&bank, dir.path());
    assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    assert_eq!(report.subject_counts["anatomy"], 2);
    assert_eq!(report.subject_counts["physio"], 2);

    let json = serde_json::to_value(&bank).unwrap();
    assert_eq!(json["meta"]["totalQuestions"], 4);
    assert_eq!(json["questions"][1]["originalNumber"], 2);
    assert_eq!(json["questions"][3]["isOX"], true);
    assert_eq!(
        json["questions"][1]["images"][0],
        "images/day1_q002_1.jpg"
    );
}

#[test]
fn validator_reports_a_missing_image_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    let config = config_in(dir.path());
    let mut stats = ExtractionStats::default();

    let questions =
        assemble::assemble_day(&sample_backend(), &sample_day(), 0, &config, &mut stats).unwrap();
    let bank = pdf2qbank::QuestionBank {
        meta: pdf2qbank::BankMeta {
            total_questions: questions.len(),
            days: vec![],
            subjects: vec![],
        },
        questions,
    };

    std::fs::remove_file(dir.path().join("images/day1_q002_1.jpg")).unwrap();
    let report = validate::validate_bank(&bank, dir.path());
    assert_eq!(report.issue_count(), 1);
    assert!(matches!(
        report.issues[0],
        pdf2qbank::ValidationIssue::MissingImageFile { id: 2, .. }
    ));
}

#[test]
fn progress_callback_receives_per_question_events() {
    struct Counting {
        segmented: AtomicUsize,
        questions: AtomicUsize,
    }
    impl ExtractionProgressCallback for Counting {
        fn on_day_segmented(&self, _day_id: &str, question_count: usize) {
            self.segmented.store(question_count, Ordering::SeqCst);
        }
        fn on_question_complete(&self, _day_id: &str, _number: u32, _image_count: usize) {
            self.questions.fetch_add(1, Ordering::SeqCst);
        }
    }

    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    let counting = Arc::new(Counting {
        segmented: AtomicUsize::new(0),
        questions: AtomicUsize::new(0),
    });

    let config = ExtractionConfig::builder()
        .day(sample_day())
        .output_dir(dir.path())
        .progress_callback(counting.clone())
        .build()
        .unwrap();

    let mut stats = ExtractionStats::default();
    assemble::assemble_day(&sample_backend(), &sample_day(), 0, &config, &mut stats).unwrap();

    assert_eq!(counting.segmented.load(Ordering::SeqCst), 4);
    assert_eq!(counting.questions.load(Ordering::SeqCst), 4);
}

#[test]
fn later_day_offsets_ids_and_keeps_original_numbers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    let mut day = sample_day();
    day.id = "day2".into();
    let config = ExtractionConfig::builder()
        .day(day.clone())
        .output_dir(dir.path())
        .build()
        .unwrap();

    let mut stats = ExtractionStats::default();
    let records = assemble::assemble_day(&sample_backend(), &day, 124, &config, &mut stats).unwrap();

    assert_eq!(records[0].id, 125);
    assert_eq!(records[0].original_number, 1);
    assert_eq!(records[3].id, 128);
    assert_eq!(records[0].day, "day2");
    assert!(records[1].images[0].starts_with("images/day2_q002_"));
}
