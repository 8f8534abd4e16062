//! Spatial locator: geometry of question anchors and image placements.
//!
//! Two independent read-only passes over the document backend. Neither pass
//! depends on the other; they run back-to-back inside the per-document
//! blocking task (the pdfium document handle is not `Send`, so the
//! permitted concurrency between them is not worth a second document open).

use crate::backend::DocumentBackend;
use crate::backend::ImageHandle;
use crate::error::ExtractError;
use std::collections::BTreeMap;
use tracing::debug;

/// First on-page anchor of a question's literal `"{n}. "` marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionAnchor {
    /// 0-based page index.
    pub page: usize,
    /// Top-edge vertical offset on that page.
    pub y: f32,
}

/// One placement of one embedded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub handle: ImageHandle,
    pub page: usize,
    /// Top-edge vertical offset of this placement.
    pub y: f32,
    pub width_px: u32,
    pub height_px: u32,
}

/// Locate the first geometric occurrence of each question's number marker.
///
/// Pages are searched in order; once a number is found it is never searched
/// again — the first occurrence wins, which guards against the number
/// recurring inside explanation text on a later page. Numbers that are
/// never found are simply absent from the map (tolerated downstream).
pub fn locate_questions<B: DocumentBackend>(
    backend: &B,
    numbers: &[u32],
) -> Result<BTreeMap<u32, QuestionAnchor>, ExtractError> {
    let mut anchors: BTreeMap<u32, QuestionAnchor> = BTreeMap::new();

    for page in 0..backend.page_count() {
        for &number in numbers {
            if anchors.contains_key(&number) {
                continue;
            }
            let offsets = backend.find_text_on_page(page, &format!("{number}. "))?;
            if let Some(&y) = offsets.first() {
                anchors.insert(number, QuestionAnchor { page, y });
            }
        }
        if anchors.len() == numbers.len() {
            break;
        }
    }

    debug!("Located {}/{} question anchors", anchors.len(), numbers.len());
    Ok(anchors)
}

/// Enumerate every placement of every embedded image in the document.
pub fn locate_images<B: DocumentBackend>(
    backend: &B,
) -> Result<Vec<ImagePlacement>, ExtractError> {
    let mut placements = Vec::new();

    for page in 0..backend.page_count() {
        for image in backend.images_on_page(page)? {
            for &y in &image.placement_tops {
                placements.push(ImagePlacement {
                    handle: image.handle,
                    page,
                    y,
                    width_px: image.width_px,
                    height_px: image.height_px,
                });
            }
        }
    }

    debug!("Located {} image placements", placements.len());
    Ok(placements)
}
