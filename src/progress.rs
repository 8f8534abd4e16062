//! Progress-callback trait for per-day and per-question extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through each document.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log file, or a GUI — without
//! the library knowing anything about how the host application communicates.
//! The trait is `Send + Sync` because the per-document work runs on a
//! blocking-pool thread, not the caller's thread.

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before any document is opened.
    fn on_extraction_start(&self, total_days: usize) {
        let _ = total_days;
    }

    /// Called when a document has been opened, before segmentation.
    fn on_day_start(&self, day_id: &str, day_index: usize, total_days: usize) {
        let _ = (day_id, day_index, total_days);
    }

    /// Called once segmentation is done and the question count is known.
    fn on_day_segmented(&self, day_id: &str, question_count: usize) {
        let _ = (day_id, question_count);
    }

    /// Called after each question record is assembled.
    fn on_question_complete(&self, day_id: &str, number: u32, image_count: usize) {
        let _ = (day_id, number, image_count);
    }

    /// Called when a document is fully processed.
    fn on_day_complete(&self, day_id: &str, questions: usize, images: usize) {
        let _ = (day_id, questions, images);
    }

    /// Called once after validation, with the final tallies.
    fn on_extraction_complete(&self, total_questions: usize, issue_count: usize) {
        let _ = (total_questions, issue_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        days: AtomicUsize,
        questions: AtomicUsize,
        final_issues: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_day_start(&self, _day_id: &str, _day_index: usize, _total_days: usize) {
            self.days.fetch_add(1, Ordering::SeqCst);
        }

        fn on_question_complete(&self, _day_id: &str, _number: u32, _image_count: usize) {
            self.questions.fetch_add(1, Ordering::SeqCst);
        }

        fn on_extraction_complete(&self, _total_questions: usize, issue_count: usize) {
            self.final_issues.store(issue_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start(2);
        cb.on_day_start("day1", 0, 2);
        cb.on_day_segmented("day1", 124);
        cb.on_question_complete("day1", 1, 0);
        cb.on_day_complete("day1", 124, 31);
        cb.on_extraction_complete(213, 0);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            days: AtomicUsize::new(0),
            questions: AtomicUsize::new(0),
            final_issues: AtomicUsize::new(0),
        };

        tracker.on_day_start("day1", 0, 2);
        tracker.on_question_complete("day1", 1, 0);
        tracker.on_question_complete("day1", 2, 1);
        tracker.on_day_start("day2", 1, 2);
        tracker.on_extraction_complete(2, 3);

        assert_eq!(tracker.days.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.questions.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.final_issues.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_extraction_start(1);
    }
}
