//! Real-time pixel-format conversion for camera preview pipelines.
//!
//! A [`FrameConverter`] owns preallocated scratch memory for one negotiated
//! preview size and turns camera frames (NV12 or I420) into packed BGRA.
//! Every successful conversion is published to a [`LatestFrameSlot`], a
//! single-producer slot that readers on other threads poll without ever
//! blocking the producer. [`PreviewPipeline`] wraps the converter with the
//! per-session drop policy and statistics.
//!
//! ```
//! use framepipe::frame::pattern;
//! use framepipe::{PreviewPipeline, PreviewSize};
//!
//! # fn main() -> framepipe::Result<()> {
//! let mut pipeline = PreviewPipeline::new(PreviewSize::new(4, 2))?;
//! let source = pattern::solid_nv12(4, 2, 128, 128, 128);
//! let frame = pipeline.process(&source).expect("frame should convert");
//! assert_eq!(frame.data()[0], 128);
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod frame;

pub use convert::converter::FrameConverter;
pub use convert::pipeline::{FrameCallback, PreviewPipeline};
pub use diagnostics::stats::{ConvertSnapshot, ConvertStats};
pub use error::{ConvertError, Result};
pub use frame::buffer::PixelBuffer;
pub use frame::format::{PixelFormat, PreviewSize};
pub use frame::slot::LatestFrameSlot;
pub use frame::source::{
    FrameDescriptor, MappedFrame, PlaneRef, SourceBuffer, SourceFrame, SourcePlane,
};
