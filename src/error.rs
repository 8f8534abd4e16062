//! Error types for the pdf2qbank library.
//!
//! Only *fatal* conditions become an [`ExtractError`]: the document cannot be
//! opened, a page's text cannot be pulled out, the output file cannot be
//! written. Everything else — a question whose position was never found, an
//! image that fails to decode, a span with no answer token — is tolerated,
//! logged via `tracing`, and surfaced through
//! [`crate::output::ExtractionStats`] and the
//! [`crate::pipeline::validate::ValidationReport`] instead. Exam scans are
//! messy by nature; a run that aborts on the first irregular question would
//! never finish a real document.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2qbank library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted; password-protected exams are not supported.
    #[error("PDF '{path}' is password-protected.\nDecrypt it first: qpdf --password=... --decrypt input.pdf output.pdf")]
    PasswordProtected { path: PathBuf },

    /// Text extraction failed for a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the image output directory or write a figure file.
    #[error("Failed to write image file '{path}': {source}")]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or manifest validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium or point PDFIUM_LIB_PATH at an existing copy:\n\
  • Download a build from https://github.com/bblanchon/pdfium-binaries\n\
  • Place libpdfium next to the executable, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = ExtractError::FileNotFound {
            path: PathBuf::from("day1.pdf"),
        };
        assert!(e.to_string().contains("day1.pdf"));
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("notes.txt"),
            magic: *b"PK\x03\x04",
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("First bytes"));
    }

    #[test]
    fn page_text_failed_display() {
        let e = ExtractError::PageTextFailed {
            page: 7,
            detail: "glyph table truncated".into(),
        };
        assert!(e.to_string().contains("page 7"));
        assert!(e.to_string().contains("glyph table truncated"));
    }

    #[test]
    fn output_write_failed_chains_source() {
        use std::error::Error as _;
        let e = ExtractError::OutputWriteFailed {
            path: PathBuf::from("questions.json"),
            source: std::io::Error::other("disk full"),
        };
        assert!(e.to_string().contains("questions.json"));
        assert!(e.source().is_some());
    }

    #[test]
    fn invalid_config_display() {
        let e = ExtractError::InvalidConfig("at least one day must be configured".into());
        assert!(e.to_string().contains("at least one day"));
    }
}
