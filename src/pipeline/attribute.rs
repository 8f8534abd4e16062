//! Image attribution: assign every image placement to the question it
//! visually follows.
//!
//! Exam layouts put a figure *below* the question stem that introduces it,
//! so the core rule is "nearest question above the image". Real scans break
//! the simple version of that rule constantly — a figure frequently bleeds
//! onto the next page, above every anchor on that page — hence the
//! three-tier fallback:
//!
//! 1. same page, nearest anchor at or above the image;
//! 2. nearest preceding anchor in global `(page, y)` order;
//! 3. first anchor on the image's own page.
//!
//! An image unresolved after tier 3 (it precedes the first located question
//! in the whole document) is dropped. This is a positional heuristic, not a
//! guaranteed-correct algorithm; when an image and two anchors share one
//! vertical offset, the earlier question wins.

use super::locate::{ImagePlacement, QuestionAnchor};
use std::collections::BTreeMap;
use tracing::debug;

/// Map every image placement to exactly one question number.
///
/// Returns attribution in image-document order per question; placements
/// with no resolvable question are omitted.
pub fn assign_images(
    anchors: &BTreeMap<u32, QuestionAnchor>,
    placements: &[ImagePlacement],
) -> BTreeMap<u32, Vec<ImagePlacement>> {
    // Per-page anchor lists, ascending (y, number).
    let mut page_anchors: BTreeMap<usize, Vec<(f32, u32)>> = BTreeMap::new();
    for (&number, anchor) in anchors {
        page_anchors
            .entry(anchor.page)
            .or_default()
            .push((anchor.y, number));
    }
    for list in page_anchors.values_mut() {
        list.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    }

    // All anchors in ascending (page, y, number) order, for tier 2.
    let mut all_anchors: Vec<(usize, f32, u32)> = anchors
        .iter()
        .map(|(&number, a)| (a.page, a.y, number))
        .collect();
    all_anchors.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut assigned: BTreeMap<u32, Vec<ImagePlacement>> = BTreeMap::new();

    for placement in placements {
        let question = same_page_above(&page_anchors, placement)
            .or_else(|| nearest_preceding_page(&all_anchors, placement))
            .or_else(|| first_on_page(&page_anchors, placement));

        match question {
            Some(number) => assigned.entry(number).or_default().push(*placement),
            None => debug!(
                "Image {} at page {} y {:.1} precedes every anchor — dropped",
                placement.handle, placement.page, placement.y
            ),
        }
    }

    assigned
}

/// Tier 1: nearest anchor at or above the image on its own page.
///
/// The replacement comparison is strict (`y > best_y`), so when two anchors
/// share an offset the earlier question is kept.
fn same_page_above(
    page_anchors: &BTreeMap<usize, Vec<(f32, u32)>>,
    placement: &ImagePlacement,
) -> Option<u32> {
    let candidates = page_anchors.get(&placement.page)?;
    let mut best: Option<(f32, u32)> = None;
    for &(y, number) in candidates {
        if y <= placement.y && best.map_or(true, |(best_y, _)| y > best_y) {
            best = Some((y, number));
        }
    }
    best.map(|(_, number)| number)
}

/// Tier 2: nearest anchor on any earlier page, in global `(page, y)` order.
fn nearest_preceding_page(
    all_anchors: &[(usize, f32, u32)],
    placement: &ImagePlacement,
) -> Option<u32> {
    all_anchors
        .iter()
        .rev()
        .find(|&&(page, _, _)| page < placement.page)
        .map(|&(_, _, number)| number)
}

/// Tier 3: first anchor on the image's own page.
fn first_on_page(
    page_anchors: &BTreeMap<usize, Vec<(f32, u32)>>,
    placement: &ImagePlacement,
) -> Option<u32> {
    page_anchors
        .get(&placement.page)
        .and_then(|candidates| candidates.first())
        .map(|&(_, number)| number)
}
