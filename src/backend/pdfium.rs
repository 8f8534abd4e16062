//! pdfium-render implementation of [`DocumentBackend`].
//!
//! ## Why everything here is blocking
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. The per-document pipeline therefore runs inside
//! `tokio::task::spawn_blocking` (see [`crate::extract`]); this module is
//! plain synchronous code operating on a document handle that never leaves
//! its blocking-pool thread.
//!
//! ## Coordinates
//!
//! pdfium reports geometry in PDF points with a bottom-left origin. The
//! pipeline wants top-edge offsets measured from the top of the page, so
//! every reported offset here is `page_height - bounds.top()`.

use super::{DocumentBackend, EmbeddedImage, ImageHandle};
use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Bind to a pdfium shared library.
///
/// Resolution order: `PDFIUM_LIB_PATH`, a copy next to the current working
/// directory, then the system library. All failures collapse into one
/// actionable [`ExtractError::PdfiumBindingFailed`].
pub fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// A pdfium-backed exam document.
///
/// Borrows the [`Pdfium`] instance so the caller controls library lifetime:
///
/// ```rust,no_run
/// use pdf2qbank::backend::pdfium::{bind_pdfium, PdfiumBackend};
///
/// # fn main() -> Result<(), pdf2qbank::ExtractError> {
/// let pdfium = bind_pdfium()?;
/// let backend = PdfiumBackend::open(&pdfium, "day1.pdf".as_ref())?;
/// # Ok(())
/// # }
/// ```
pub struct PdfiumBackend<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumBackend<'a> {
    /// Open a PDF file, mapping pdfium load failures to the error taxonomy.
    pub fn open(pdfium: &'a Pdfium, path: &Path) -> Result<Self, ExtractError> {
        let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                ExtractError::PasswordProtected {
                    path: path.to_path_buf(),
                }
            } else {
                ExtractError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        debug!(
            "Opened '{}': {} pages",
            path.display(),
            document.pages().len()
        );

        Ok(Self { document })
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>, ExtractError> {
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| ExtractError::PageTextFailed {
                page: index,
                detail: format!("{:?}", e),
            })
    }
}

impl DocumentBackend for PdfiumBackend<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, page: usize) -> Result<String, ExtractError> {
        let page_handle = self.page(page)?;
        let text = page_handle
            .text()
            .map_err(|e| ExtractError::PageTextFailed {
                page,
                detail: format!("{:?}", e),
            })?;
        Ok(text.all())
    }

    fn find_text_on_page(&self, page: usize, literal: &str) -> Result<Vec<f32>, ExtractError> {
        let page_handle = self.page(page)?;
        let page_height = page_handle.height().value;
        let text = page_handle
            .text()
            .map_err(|e| ExtractError::PageTextFailed {
                page,
                detail: format!("{:?}", e),
            })?;

        let mut offsets = Vec::new();
        for segment in text.segments().iter() {
            if segment.text().contains(literal) {
                let bounds = segment.bounds();
                // Bottom-left origin → top-edge offset from the page top.
                offsets.push(page_height - bounds.top().value);
            }
        }
        Ok(offsets)
    }

    fn images_on_page(&self, page: usize) -> Result<Vec<EmbeddedImage>, ExtractError> {
        let page_handle = self.page(page)?;
        let page_height = page_handle.height().value;

        let mut images = Vec::new();
        for (object_index, object) in page_handle.objects().iter().enumerate() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };

            let handle = ImageHandle {
                page,
                object: object_index,
            };

            let bounds = match object.bounds() {
                Ok(b) => b,
                Err(e) => {
                    warn!("No bounds for image {handle}: {e:?} — skipped");
                    continue;
                }
            };

            // Intrinsic pixel dimensions come from the embedded raster, not
            // the placement rectangle (a 2000 px scan may be placed 200 pt
            // wide).
            let (width_px, height_px) = match image_object.get_raw_image() {
                Ok(raster) => (raster.width(), raster.height()),
                Err(e) => {
                    warn!("Undecodable image {handle}: {e:?} — skipped");
                    continue;
                }
            };

            images.push(EmbeddedImage {
                handle,
                width_px,
                height_px,
                placement_tops: vec![page_height - bounds.top().value],
            });
        }
        Ok(images)
    }

    fn load_image(&self, handle: ImageHandle) -> Result<DynamicImage, ExtractError> {
        let page_handle = self.page(handle.page)?;
        let object = page_handle
            .objects()
            .iter()
            .nth(handle.object)
            .ok_or_else(|| {
                ExtractError::Internal(format!("image {handle}: object index out of range"))
            })?;

        let image_object = object
            .as_image_object()
            .ok_or_else(|| ExtractError::Internal(format!("image {handle}: not an image object")))?;

        image_object
            .get_raw_image()
            .map_err(|e| ExtractError::Internal(format!("image {handle}: decode failed: {e:?}")))
    }
}
