use std::sync::Arc;

use tracing::debug;

use crate::convert::scratch::{self, ScratchBuffer};
use crate::convert::stages;
use crate::error::{ConvertError, Result};
use crate::frame::buffer::PixelBuffer;
use crate::frame::format::{PixelFormat, PreviewSize};
use crate::frame::slot::LatestFrameSlot;
use crate::frame::source::SourceBuffer;

/// Converts camera frames into BGRA preview frames at a fixed size.
///
/// Both scratch buffers are allocated once, up front, sized from the
/// negotiated dimensions. The per-frame path reuses them and touches the
/// allocator only to snapshot the published copy; even that allocation is
/// recycled once readers release the displaced frame, so the steady state
/// allocates nothing. Frames that fail validation or conversion are dropped
/// and the published slot keeps its previous contents.
pub struct FrameConverter {
    size: PreviewSize,
    /// Stage-one output: packed RGBA straight from the source planes.
    conversion: ScratchBuffer,
    /// Stage-two output: channel-swapped BGRA, snapshotted on publish.
    destination: ScratchBuffer,
    slot: Arc<LatestFrameSlot>,
    /// Allocation reclaimed from a displaced frame, reused by the next
    /// publish instead of asking the allocator again.
    spare: Option<Vec<u8>>,
}

impl FrameConverter {
    /// Reserve scratch memory for the given preview size.
    ///
    /// Fails with [`ConvertError::InvalidInput`] when either dimension is
    /// zero and [`ConvertError::Allocation`] when the scratch buffers cannot
    /// be reserved. Both are fatal to the instance; nothing is partially
    /// constructed.
    pub fn new(size: PreviewSize) -> Result<Self> {
        if size.width == 0 || size.height == 0 {
            return Err(ConvertError::InvalidInput(format!(
                "preview size {size} must be non-zero in both dimensions"
            )));
        }
        let conversion = ScratchBuffer::packed(PixelFormat::Rgba8, size.width, size.height)?;
        let destination = ScratchBuffer::packed(PixelFormat::Bgra8, size.width, size.height)?;
        debug!("frame converter ready for {size}");
        Ok(Self {
            size,
            conversion,
            destination,
            slot: Arc::new(LatestFrameSlot::new()),
            spare: None,
        })
    }

    pub fn size(&self) -> PreviewSize {
        self.size
    }

    /// Slot that receives every successfully converted frame. Clone the
    /// `Arc` to hand read access to consumers on other threads.
    pub fn slot(&self) -> &Arc<LatestFrameSlot> {
        &self.slot
    }

    /// Convert one source frame and publish the result.
    ///
    /// The source mapping is held only while stage one reads the planes and
    /// is released before this returns, on the error paths included. On
    /// success the returned handle is the same frame the slot now holds.
    pub fn convert(&mut self, source: &dyn SourceBuffer) -> Result<Arc<PixelBuffer>> {
        let desc = source.descriptor();
        if desc.width != self.size.width || desc.height != self.size.height {
            return Err(ConvertError::InvalidInput(format!(
                "source is {}x{}, converter expects {}",
                desc.width, desc.height, self.size
            )));
        }

        {
            let mapped = source.map()?;
            let stride = self.conversion.stride();
            match desc.format {
                PixelFormat::Nv12 => stages::nv12_to_rgba(
                    mapped.plane(0)?,
                    mapped.plane(1)?,
                    self.conversion.as_mut_slice(),
                    stride,
                    desc.width,
                    desc.height,
                )?,
                PixelFormat::I420 => stages::i420_to_rgba(
                    mapped.plane(0)?,
                    mapped.plane(1)?,
                    mapped.plane(2)?,
                    self.conversion.as_mut_slice(),
                    stride,
                    desc.width,
                    desc.height,
                )?,
                other => {
                    return Err(ConvertError::Conversion(format!(
                        "unsupported source format {other:?}"
                    )));
                }
            }
        }
        // Mapping released; stage two reads only our own scratch.

        let src_stride = self.conversion.stride();
        let dst_stride = self.destination.stride();
        stages::rgba_to_bgra(
            self.conversion.as_slice(),
            src_stride,
            self.destination.as_mut_slice(),
            dst_stride,
            self.size.width,
            self.size.height,
        )?;

        let frame = Arc::new(self.snapshot_destination()?);
        if let Some(displaced) = self.slot.publish(Arc::clone(&frame)) {
            // Reclaim the displaced allocation unless a reader still holds it.
            if let Ok(buffer) = Arc::try_unwrap(displaced) {
                self.spare = Some(buffer.into_data());
            }
        }
        Ok(frame)
    }

    /// Copy the destination scratch into an immutable frame, reusing the
    /// spare allocation when one is available.
    fn snapshot_destination(&mut self) -> Result<PixelBuffer> {
        let mut data = match self.spare.take() {
            Some(data) if data.len() == self.destination.len() => data,
            _ => scratch::try_alloc_bytes(self.destination.len(), "publish")?,
        };
        data.copy_from_slice(self.destination.as_slice());
        PixelBuffer::from_packed(
            data,
            self.destination.format(),
            self.size.width,
            self.size.height,
            self.destination.stride(),
        )
    }
}

impl Drop for FrameConverter {
    fn drop(&mut self) {
        // Readers that already hold a frame keep it; new reads see nothing.
        self.slot.clear();
        debug!("frame converter for {} torn down", self.size);
    }
}
