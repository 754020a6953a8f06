use crate::error::{ConvertError, Result};
use crate::frame::format::PixelFormat;

/// Preallocated conversion workspace.
///
/// Sized once at construction and reused for every frame; the backing
/// allocation never grows or shrinks afterwards. Only the converter that
/// owns it writes into it, on the thread that delivers frames.
pub struct ScratchBuffer {
    data: Vec<u8>,
    format: PixelFormat,
    width: u32,
    height: u32,
    stride: usize,
}

impl ScratchBuffer {
    /// Allocate a tightly-packed scratch buffer for a packed format.
    ///
    /// Reservation failure surfaces as [`ConvertError::Allocation`] instead
    /// of aborting the process, so a caller can fail construction cleanly.
    /// Dimensions whose byte size does not fit in `usize` fail the same way.
    pub fn packed(format: PixelFormat, width: u32, height: u32) -> Result<Self> {
        let Some(bytes_per_pixel) = format.bytes_per_pixel() else {
            return Err(ConvertError::Allocation(format!(
                "{format:?} is not a packed scratch format"
            )));
        };
        let stride = width as usize * bytes_per_pixel;
        let len = stride.checked_mul(height as usize).ok_or_else(|| {
            ConvertError::Allocation(format!(
                "scratch buffer for {width}x{height} {format:?} exceeds the address space"
            ))
        })?;
        let data = try_alloc_bytes(len, "scratch")?;
        Ok(Self {
            data,
            format,
            width,
            height,
            stride,
        })
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

    /// Bytes per row. Scratch buffers are tightly packed, so this equals
    /// the row payload.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Fallibly allocate a zeroed byte buffer.
///
/// `purpose` names the buffer in the error message.
pub(crate) fn try_alloc_bytes(len: usize, purpose: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|e| {
        ConvertError::Allocation(format!("{purpose} buffer of {len} bytes: {e}"))
    })?;
    data.resize(len, 0);
    Ok(data)
}
