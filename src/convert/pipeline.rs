use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::convert::converter::FrameConverter;
use crate::diagnostics::stats::{ConvertSnapshot, ConvertStats};
use crate::error::Result;
use crate::frame::buffer::PixelBuffer;
use crate::frame::format::PreviewSize;
use crate::frame::slot::LatestFrameSlot;
use crate::frame::source::SourceBuffer;

/// Callback type for observing published frames.
/// Receives the same handle the slot now holds.
pub type FrameCallback = Arc<dyn Fn(&Arc<PixelBuffer>) + Send + Sync>;

/// Per-session driver around a [`FrameConverter`].
///
/// Owns the converter and its statistics and applies the drop policy: a
/// frame that fails to convert is logged, counted, and skipped, and the
/// session keeps running. Construction failures are the only fatal errors.
pub struct PreviewPipeline {
    converter: FrameConverter,
    stats: Arc<Mutex<ConvertStats>>,
    on_frame: Option<FrameCallback>,
}

impl PreviewPipeline {
    /// Build a pipeline for the given preview size.
    pub fn new(size: PreviewSize) -> Result<Self> {
        Ok(Self {
            converter: FrameConverter::new(size)?,
            stats: Arc::new(Mutex::new(ConvertStats::new())),
            on_frame: None,
        })
    }

    /// Attach a callback invoked after every successful publish.
    pub fn with_frame_callback(mut self, on_frame: FrameCallback) -> Self {
        self.on_frame = Some(on_frame);
        self
    }

    pub fn size(&self) -> PreviewSize {
        self.converter.size()
    }

    /// Slot consumers read published frames from.
    pub fn slot(&self) -> &Arc<LatestFrameSlot> {
        self.converter.slot()
    }

    /// Convert and publish one source frame.
    ///
    /// Returns the published frame, or `None` when the frame was dropped.
    /// Dropped frames are logged and counted; the previously published frame
    /// stays available to readers either way.
    pub fn process(&mut self, source: &dyn SourceBuffer) -> Option<Arc<PixelBuffer>> {
        let started = Instant::now();
        match self.converter.convert(source) {
            Ok(frame) => {
                self.stats
                    .lock()
                    .record_frame(frame.data().len(), started.elapsed());
                trace!("published frame {}", self.converter.slot().sequence());
                if let Some(on_frame) = &self.on_frame {
                    on_frame(&frame);
                }
                Some(frame)
            }
            Err(e) => {
                warn!("dropping frame: {e}");
                self.stats.lock().record_drop();
                None
            }
        }
    }

    /// Take a snapshot of conversion stats for this session.
    pub fn diagnostics(&self) -> ConvertSnapshot {
        self.stats.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::pattern;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn make_pipeline() -> PreviewPipeline {
        PreviewPipeline::new(PreviewSize::new(4, 2)).unwrap()
    }

    #[test]
    fn processes_and_counts_frames() {
        let mut pipeline = make_pipeline();
        let frame = pipeline
            .process(&pattern::solid_nv12(4, 2, 128, 128, 128))
            .unwrap();
        assert_eq!(frame.data().len(), 4 * 2 * 4);
        let snap = pipeline.diagnostics();
        assert_eq!(snap.frame_count, 1);
        assert_eq!(snap.drop_count, 0);
        assert!(snap.convert_ms >= 0.0);
    }

    #[test]
    fn drops_malformed_frames_and_keeps_running() {
        let mut pipeline = make_pipeline();
        let good = pipeline
            .process(&pattern::solid_nv12(4, 2, 128, 128, 128))
            .unwrap();

        // Wrong dimensions: dropped, counted, previous frame still published
        assert!(pipeline
            .process(&pattern::solid_nv12(2, 2, 128, 128, 128))
            .is_none());
        let snap = pipeline.diagnostics();
        assert_eq!(snap.frame_count, 1);
        assert_eq!(snap.drop_count, 1);
        let latest = pipeline.slot().latest().unwrap();
        assert!(Arc::ptr_eq(&good, &latest));

        let next = pipeline
            .process(&pattern::solid_nv12(4, 2, 235, 128, 128))
            .unwrap();
        assert!(Arc::ptr_eq(&next, &pipeline.slot().latest().unwrap()));
    }

    #[test]
    fn frame_callback_fires_only_on_publish() {
        let fired = Arc::new(AtomicU64::new(0));
        let fired_cb = Arc::clone(&fired);
        let mut pipeline = PreviewPipeline::new(PreviewSize::new(4, 2))
            .unwrap()
            .with_frame_callback(Arc::new(move |_frame| {
                fired_cb.fetch_add(1, Ordering::Relaxed);
            }));

        pipeline
            .process(&pattern::solid_nv12(4, 2, 128, 128, 128))
            .unwrap();
        assert_eq!(fired.load(Ordering::Relaxed), 1);

        assert!(pipeline
            .process(&pattern::solid_nv12(2, 2, 128, 128, 128))
            .is_none());
        assert_eq!(fired.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn frame_callback_receives_the_published_handle() {
        let seen: Arc<Mutex<Option<Arc<PixelBuffer>>>> = Arc::new(Mutex::new(None));
        let seen_cb = Arc::clone(&seen);
        let mut pipeline = PreviewPipeline::new(PreviewSize::new(4, 2))
            .unwrap()
            .with_frame_callback(Arc::new(move |frame| {
                *seen_cb.lock() = Some(Arc::clone(frame));
            }));

        let frame = pipeline
            .process(&pattern::solid_nv12(4, 2, 200, 128, 128))
            .unwrap();
        let stored = seen.lock().clone().unwrap();
        assert!(Arc::ptr_eq(&stored, &frame));
    }

    #[test]
    fn frame_callback_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FrameCallback>();
    }

    #[test]
    fn dropping_the_pipeline_clears_the_slot() {
        let mut pipeline = make_pipeline();
        pipeline
            .process(&pattern::solid_nv12(4, 2, 128, 128, 128))
            .unwrap();
        let slot = Arc::clone(pipeline.slot());
        drop(pipeline);
        assert!(slot.latest().is_none());
    }
}
