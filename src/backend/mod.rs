//! Document backend abstraction.
//!
//! The analytic pipeline never touches pdfium directly; it sees a
//! [`DocumentBackend`] — four read-only queries plus pixel retrieval. This is
//! the seam that keeps the segmentation, attribution, and parsing logic
//! independently testable against an in-memory fake, and lets the rendering
//! backend be swapped without touching any other stage.
//!
//! Coordinate convention: all vertical offsets are top-edge distances from
//! the top of the page, in PDF points. Backends working in PDF's native
//! bottom-left origin must convert (`page_height - top`).

pub mod pdfium;

use crate::error::ExtractError;
use image::DynamicImage;
use std::fmt;

/// Stable identifier of one embedded image within a document.
///
/// `(page, object)` indexes are stable for the lifetime of an open document,
/// which is all the pipeline needs: positions are gathered and pixels
/// retrieved within a single pass over the same document handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle {
    /// 0-based page index.
    pub page: usize,
    /// Index of the image object within the page's object list.
    pub object: usize,
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}/img{}", self.page, self.object)
    }
}

/// Descriptor of one embedded image as reported by the backend.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub handle: ImageHandle,
    /// Intrinsic pixel width of the embedded raster.
    pub width_px: u32,
    /// Intrinsic pixel height of the embedded raster.
    pub height_px: u32,
    /// Top-edge vertical offset of every placement of this image on the
    /// page. Most images appear once; repeated placements (e.g. a logo)
    /// each get their own entry.
    pub placement_tops: Vec<f32>,
}

/// Read-only view of one exam document.
pub trait DocumentBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Extracted text of one page, in reading order as the backend sees it.
    fn page_text(&self, page: usize) -> Result<String, ExtractError>;

    /// Top-edge vertical offsets of every occurrence of `literal` on the
    /// page, in document order. Empty when the literal does not occur.
    fn find_text_on_page(&self, page: usize, literal: &str) -> Result<Vec<f32>, ExtractError>;

    /// Every embedded image on the page with its placements.
    fn images_on_page(&self, page: usize) -> Result<Vec<EmbeddedImage>, ExtractError>;

    /// Decode the pixels of one embedded image.
    ///
    /// A failure here is non-fatal to the run: the caller skips the image
    /// and counts it in [`crate::output::ExtractionStats::images_skipped`].
    fn load_image(&self, handle: ImageHandle) -> Result<DynamicImage, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_display_is_compact() {
        let h = ImageHandle { page: 3, object: 2 };
        assert_eq!(h.to_string(), "p3/img2");
    }

    #[test]
    fn handle_orders_by_page_then_object() {
        let a = ImageHandle { page: 0, object: 5 };
        let b = ImageHandle { page: 1, object: 0 };
        assert!(a < b);
    }
}
