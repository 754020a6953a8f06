use crate::error::{ConvertError, Result};
use crate::frame::format::PixelFormat;

/// Most planes any supported format carries.
pub const MAX_PLANES: usize = 3;

/// Declared layout of a source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

/// Borrowed view of one plane: payload bytes plus the row stride they are
/// laid out with. `stride` may exceed the row payload when rows are padded.
#[derive(Debug, Clone, Copy)]
pub struct PlaneRef<'a> {
    pub data: &'a [u8],
    pub stride: usize,
}

/// Scoped read access to a source frame's planes.
///
/// Holds no allocation of its own. The guard borrows the source for the
/// duration of one convert call; whatever mapping the source performed is
/// released when the guard drops, on every exit path.
pub struct MappedFrame<'a> {
    planes: [PlaneRef<'a>; MAX_PLANES],
    count: usize,
}

impl<'a> MappedFrame<'a> {
    /// Build a mapping over the given plane views.
    pub fn new(planes: &[PlaneRef<'a>]) -> Result<Self> {
        if planes.is_empty() || planes.len() > MAX_PLANES {
            return Err(ConvertError::InvalidInput(format!(
                "a mapped frame carries 1..={MAX_PLANES} planes, got {}",
                planes.len()
            )));
        }
        let mut filled = [PlaneRef { data: &[], stride: 0 }; MAX_PLANES];
        filled[..planes.len()].copy_from_slice(planes);
        Ok(Self {
            planes: filled,
            count: planes.len(),
        })
    }

    pub fn plane_count(&self) -> usize {
        self.count
    }

    /// View of plane `index`.
    ///
    /// Fails when the source delivered fewer planes than its declared format
    /// requires, which a transform stage treats as a dropped frame.
    pub fn plane(&self, index: usize) -> Result<PlaneRef<'a>> {
        if index >= self.count {
            return Err(ConvertError::Conversion(format!(
                "source delivered {} planes, plane {index} is missing",
                self.count
            )));
        }
        Ok(self.planes[index])
    }
}

/// A frame delivered by a capture source.
///
/// Implemented per capture integration. `map` is the scoped lock/map step:
/// it must be short and bounded, because it runs on the capture thread for
/// every frame. The converter holds the returned guard only while it reads
/// the planes and releases it before returning, success or failure alike.
pub trait SourceBuffer: Send + Sync {
    /// Declared format and dimensions of this frame.
    fn descriptor(&self) -> FrameDescriptor;

    /// Map the backing memory for read access.
    fn map(&self) -> Result<MappedFrame<'_>>;
}

/// One owned plane of a [`SourceFrame`].
pub struct SourcePlane {
    pub data: Vec<u8>,
    pub stride: usize,
}

/// Heap-backed source frame for tests and in-memory pipelines.
///
/// Real capture integrations implement [`SourceBuffer`] over their own frame
/// handles; this one simply owns its planes, so `map` borrows them with no
/// locking at all.
pub struct SourceFrame {
    descriptor: FrameDescriptor,
    planes: Vec<SourcePlane>,
}

impl SourceFrame {
    /// Wrap planes with explicit strides.
    ///
    /// Validates the plane count against the format and each plane against
    /// its declared geometry: `stride` must cover the row payload and the
    /// data must cover every row at that stride (the final row may omit its
    /// padding).
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        planes: Vec<SourcePlane>,
    ) -> Result<Self> {
        if planes.len() != format.plane_count() {
            return Err(ConvertError::InvalidInput(format!(
                "{format:?} carries {} planes, got {}",
                format.plane_count(),
                planes.len()
            )));
        }
        for (index, plane) in planes.iter().enumerate() {
            let row_bytes = format.row_bytes(index, width);
            let rows = format.plane_rows(index, height);
            if plane.stride < row_bytes {
                return Err(ConvertError::InvalidInput(format!(
                    "plane {index} stride {} is less than its {row_bytes}-byte row payload",
                    plane.stride
                )));
            }
            let needed = if rows == 0 {
                Some(0)
            } else {
                plane
                    .stride
                    .checked_mul(rows - 1)
                    .and_then(|body| body.checked_add(row_bytes))
            };
            let Some(needed) = needed else {
                return Err(ConvertError::InvalidInput(format!(
                    "plane {index}: {rows} rows at stride {} exceed the address space",
                    plane.stride
                )));
            };
            if plane.data.len() < needed {
                return Err(ConvertError::InvalidInput(format!(
                    "plane {index} holds {} bytes, needs {needed}",
                    plane.data.len()
                )));
            }
        }
        Ok(Self {
            descriptor: FrameDescriptor {
                format,
                width,
                height,
            },
            planes,
        })
    }

    /// Wrap tightly-packed NV12 planes: luma, then interleaved CbCr.
    pub fn nv12(width: u32, height: u32, luma: Vec<u8>, chroma: Vec<u8>) -> Result<Self> {
        let format = PixelFormat::Nv12;
        Self::new(
            format,
            width,
            height,
            vec![
                SourcePlane {
                    data: luma,
                    stride: format.row_bytes(0, width),
                },
                SourcePlane {
                    data: chroma,
                    stride: format.row_bytes(1, width),
                },
            ],
        )
    }

    /// Wrap tightly-packed I420 planes: luma, Cb, Cr.
    pub fn i420(width: u32, height: u32, luma: Vec<u8>, cb: Vec<u8>, cr: Vec<u8>) -> Result<Self> {
        let format = PixelFormat::I420;
        Self::new(
            format,
            width,
            height,
            vec![
                SourcePlane {
                    data: luma,
                    stride: format.row_bytes(0, width),
                },
                SourcePlane {
                    data: cb,
                    stride: format.row_bytes(1, width),
                },
                SourcePlane {
                    data: cr,
                    stride: format.row_bytes(2, width),
                },
            ],
        )
    }
}

impl SourceBuffer for SourceFrame {
    fn descriptor(&self) -> FrameDescriptor {
        self.descriptor
    }

    fn map(&self) -> Result<MappedFrame<'_>> {
        let mut refs = [PlaneRef { data: &[], stride: 0 }; MAX_PLANES];
        for (slot, plane) in refs.iter_mut().zip(&self.planes) {
            *slot = PlaneRef {
                data: &plane.data,
                stride: plane.stride,
            };
        }
        MappedFrame::new(&refs[..self.planes.len()])
    }
}
