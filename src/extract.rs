//! Run orchestration: open each configured document, run the per-document
//! pipeline, merge the days into one bank, validate, and persist.
//!
//! Documents are processed strictly in configuration order because global
//! question ids are assigned by accumulating each day's expected maximum.
//! The pdfium work for each day runs inside `tokio::task::spawn_blocking`
//! (pdfium is not safe to call from async contexts, and its document
//! handles are not `Send`); the async layer only sequences the days and
//! merges their results.

use crate::backend::pdfium::{bind_pdfium, PdfiumBackend};
use crate::backend::DocumentBackend;
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{BankMeta, BankOutput, DayMeta, ExtractionStats, QuestionBank, SubjectMeta};
use crate::pipeline::{assemble, validate};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;
use tracing::{debug, info};

/// Check that `path` points at a readable PDF file.
///
/// Reads only the first four bytes; the full structural check happens when
/// pdfium opens the document.
pub fn validate_pdf_path(path: &Path) -> Result<(), ExtractError> {
    let mut file = fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::CorruptPdf {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    })?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .map_err(|_| ExtractError::CorruptPdf {
            path: path.to_path_buf(),
            detail: "file is shorter than 4 bytes".into(),
        })?;

    if &magic != b"%PDF" {
        return Err(ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Run the full extraction described by `config`.
///
/// Returns the assembled bank, the run statistics, and the advisory
/// validation report. Figure files are written under
/// [`ExtractionConfig::image_dir`] as a side effect; the bank JSON is not
/// written (see [`extract_to_file`]).
pub async fn extract(config: ExtractionConfig) -> Result<BankOutput, ExtractError> {
    let start = Instant::now();

    // Fail fast on unreadable inputs before doing any work.
    for day in &config.days {
        validate_pdf_path(&day.pdf)?;
    }
    let image_dir = config.image_dir();
    fs::create_dir_all(&image_dir).map_err(|e| ExtractError::ImageWriteFailed {
        path: image_dir.clone(),
        source: e,
    })?;

    if let Some(cb) = &config.progress_callback {
        cb.on_extraction_start(config.days.len());
    }

    let mut stats = ExtractionStats::default();
    let mut questions = Vec::new();
    let mut day_metas = Vec::new();
    let mut subject_metas = Vec::new();
    let mut id_offset = 0u32;

    for (index, day) in config.days.iter().enumerate() {
        info!(day = %day.id, pdf = %day.pdf.display(), "processing document");
        if let Some(cb) = &config.progress_callback {
            cb.on_day_start(&day.id, index, config.days.len());
        }

        let day_clone = day.clone();
        let config_clone = config.clone();
        let (records, day_stats) = task::spawn_blocking(move || {
            let pdfium = bind_pdfium()?;
            let backend = PdfiumBackend::open(&pdfium, &day_clone.pdf)?;
            let mut day_stats = ExtractionStats::default();
            let records = assemble::assemble_day(
                &backend,
                &day_clone,
                id_offset,
                &config_clone,
                &mut day_stats,
            )?;
            Ok::<_, ExtractError>((records, day_stats))
        })
        .await
        .map_err(|e| ExtractError::Internal(format!("extraction task failed: {e}")))??;

        if let Some(cb) = &config.progress_callback {
            cb.on_day_complete(&day.id, records.len(), day_stats.images_saved);
        }

        stats.absorb(&day_stats);
        stats.documents += 1;
        day_metas.push(DayMeta {
            id: day.id.clone(),
            name: day.name.clone(),
            question_count: records.len(),
        });
        // Subject ranges are published in global ids so the consumer never
        // needs to know per-day sizes.
        for s in &day.subjects {
            subject_metas.push(SubjectMeta {
                id: s.id.clone(),
                name: s.name.clone(),
                day: day.id.clone(),
                question_range: (s.lo + id_offset, s.hi + id_offset),
            });
        }

        questions.extend(records);
        id_offset += day.expected_max;
    }

    let bank = QuestionBank {
        meta: BankMeta {
            total_questions: questions.len(),
            days: day_metas,
            subjects: subject_metas,
        },
        questions,
    };

    let report = validate::validate_bank(&bank, &config.output_dir);
    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    info!(
        questions = bank.questions.len(),
        images = stats.images_saved,
        issues = report.issue_count(),
        duration_ms = stats.total_duration_ms,
        "extraction complete"
    );
    if let Some(cb) = &config.progress_callback {
        cb.on_extraction_complete(bank.questions.len(), report.issue_count());
    }

    Ok(BankOutput {
        bank,
        stats,
        report,
    })
}

/// Run the extraction and write the bank JSON to `path` atomically.
///
/// Only the bank itself is written — the statistics and validation report
/// are returned to the caller, which is what the CLI prints.
pub async fn extract_to_file(
    config: ExtractionConfig,
    path: impl AsRef<Path>,
) -> Result<BankOutput, ExtractError> {
    let output = extract(config).await?;
    write_json_atomic(path.as_ref(), &output.bank)?;
    Ok(output)
}

/// Blocking wrapper around [`extract`] for non-async callers.
pub fn extract_sync(config: ExtractionConfig) -> Result<BankOutput, ExtractError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ExtractError::Internal(format!("failed to build tokio runtime: {e}")))?;
    runtime.block_on(extract(config))
}

/// Lightweight summary of one document, for pre-flight inspection.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub embedded_images: usize,
}

/// Open a document and report its page and embedded-image counts without
/// running the pipeline.
pub async fn inspect(path: impl Into<PathBuf>) -> Result<DocumentSummary, ExtractError> {
    let path = path.into();
    validate_pdf_path(&path)?;

    task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let backend = PdfiumBackend::open(&pdfium, &path)?;
        let pages = backend.page_count();
        let mut embedded_images = 0;
        for page in 0..pages {
            embedded_images += backend.images_on_page(page)?.len();
        }
        Ok(DocumentSummary {
            path,
            pages,
            embedded_images,
        })
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("inspect task failed: {e}")))?
}

/// Serialize `value` as pretty JSON and write it via a temp file + rename,
/// so a crash mid-write never leaves a truncated output file.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ExtractError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ExtractError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json).map_err(|e| ExtractError::OutputWriteFailed {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %path.display(), bytes = json.len(), "wrote output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_file_not_found() {
        let err = validate_pdf_path(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        fs::write(&path, b"PK\x03\x04rest of file").unwrap();
        let err = validate_pdf_path(&path).unwrap_err();
        match err {
            ExtractError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stub.pdf");
        fs::write(&path, b"%P").unwrap();
        let err = validate_pdf_path(&path).unwrap_err();
        assert!(matches!(err, ExtractError::CorruptPdf { .. }));
    }

    #[test]
    fn pdf_magic_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        fs::write(&path, b"%PDF-1.7\n...").unwrap();
        assert!(validate_pdf_path(&path).is_ok());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/questions.json");
        write_json_atomic(&path, &serde_json::json!({ "ok": true })).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"ok\""));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
