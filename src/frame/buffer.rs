use crate::error::{ConvertError, Result};
use crate::frame::format::PixelFormat;

/// An immutable converted frame.
///
/// Published frames are shared as `Arc<PixelBuffer>`: consumers get a cheap
/// reference-counted pointer instead of a copy of multi-megabyte pixel data,
/// and a later publish can never invalidate a handle a reader already holds.
/// Nothing mutates a `PixelBuffer` after construction.
pub struct PixelBuffer {
    data: Vec<u8>,
    format: PixelFormat,
    width: u32,
    height: u32,
    stride: usize,
}

impl PixelBuffer {
    /// Wrap packed pixel data.
    ///
    /// Fails if `format` is planar, `stride` does not cover the row payload,
    /// or `data` is not exactly `stride * height` bytes.
    pub fn from_packed(
        data: Vec<u8>,
        format: PixelFormat,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self> {
        if format.is_planar() {
            return Err(ConvertError::InvalidInput(format!(
                "{format:?} is not a packed format"
            )));
        }
        let row_bytes = format.row_bytes(0, width);
        if stride < row_bytes {
            return Err(ConvertError::InvalidInput(format!(
                "stride {stride} is less than the {row_bytes}-byte row payload"
            )));
        }
        let Some(expected) = stride.checked_mul(height as usize) else {
            return Err(ConvertError::InvalidInput(format!(
                "{height} rows at stride {stride} exceed the address space"
            )));
        };
        if data.len() != expected {
            return Err(ConvertError::InvalidInput(format!(
                "buffer holds {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            format,
            width,
            height,
            stride,
        })
    }

    /// Raw pixel bytes, `stride * height` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, including any padding.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Payload bytes of one row, without stride padding.
    ///
    /// # Panics
    /// Panics if `row >= height`.
    pub fn row(&self, row: usize) -> &[u8] {
        assert!(row < self.height as usize, "row {row} out of range");
        let start = row * self.stride;
        &self.data[start..start + self.format.row_bytes(0, self.width)]
    }

    /// Take the backing allocation for reuse.
    pub(crate) fn into_data(self) -> Vec<u8> {
        self.data
    }
}
