use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::frame::buffer::PixelBuffer;

/// Single-slot handoff point for the most recently converted frame.
///
/// One producer publishes; any number of readers poll `latest()` at their
/// own cadence. Both sides are lock-free: a publish is an atomic pointer
/// swap and a read clones a reference-counted handle, so a stalled reader
/// can never stall the producer and a burst of reads can never stall a
/// publish. Readers that poll slower than the producer publishes skip the
/// intermediate frames (latest-wins, not a queue).
pub struct LatestFrameSlot {
    current: ArcSwapOption<PixelBuffer>,
    /// Monotonic counter incremented on each publish — lets consumers poll
    /// for staleness without comparing frame contents.
    sequence: AtomicU64,
}

impl LatestFrameSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::new(None),
            sequence: AtomicU64::new(0),
        }
    }

    /// Atomically replace the visible frame, returning the one it displaces.
    ///
    /// The displaced buffer's memory is freed (or recycled by the caller)
    /// only once the last reader drops its handle. Never blocks on readers.
    pub fn publish(&self, frame: Arc<PixelBuffer>) -> Option<Arc<PixelBuffer>> {
        let previous = self.current.swap(Some(frame));
        self.sequence.fetch_add(1, Ordering::Relaxed);
        previous
    }

    /// Get the most recently published frame, if any.
    ///
    /// Returns an `Arc<PixelBuffer>` — a cheap reference-counted clone that
    /// stays valid no matter how many publishes happen after it. `None`
    /// until the first publish and after `clear`.
    pub fn latest(&self) -> Option<Arc<PixelBuffer>> {
        self.current.load_full()
    }

    /// Monotonic publish counter. Increases by 1 for each published frame.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Drop the held frame, returning the slot to its initial empty state.
    ///
    /// Handles that readers already obtained stay valid until dropped.
    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl Default for LatestFrameSlot {
    fn default() -> Self {
        Self::new()
    }
}
