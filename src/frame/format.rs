use std::fmt;

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4:2:0 bi-planar: a full-resolution luma plane followed by one
    /// interleaved CbCr plane at half resolution in both dimensions.
    Nv12,
    /// 4:2:0 planar: a full-resolution luma plane followed by separate
    /// half-resolution Cb and Cr planes.
    I420,
    /// 4:2:2 packed: two pixels per `[Y0, Cb, Y1, Cr]` macro-pixel.
    Yuy2,
    /// Packed 32-bit RGBA, one byte per channel.
    Rgba8,
    /// Packed 32-bit BGRA, one byte per channel.
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel for packed formats, `None` for planar ones.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => Some(4),
            PixelFormat::Yuy2 => Some(2),
            PixelFormat::Nv12 | PixelFormat::I420 => None,
        }
    }

    /// Number of planes a buffer in this format carries.
    pub fn plane_count(self) -> usize {
        match self {
            PixelFormat::Nv12 => 2,
            PixelFormat::I420 => 3,
            PixelFormat::Yuy2 | PixelFormat::Rgba8 | PixelFormat::Bgra8 => 1,
        }
    }

    /// Whether luma and chroma live in separate planes.
    pub fn is_planar(self) -> bool {
        self.plane_count() > 1
    }

    /// Row payload in bytes (excluding any stride padding) for one plane.
    ///
    /// Chroma planes of 4:2:0 formats use ceiling division, so odd widths
    /// still carry a sample for the last pixel column. Returns 0 for plane
    /// indices the format does not have.
    pub fn row_bytes(self, plane: usize, width: u32) -> usize {
        let width = width as usize;
        match (self, plane) {
            (PixelFormat::Nv12, 0) | (PixelFormat::I420, 0) => width,
            (PixelFormat::Nv12, 1) => width.div_ceil(2) * 2,
            (PixelFormat::I420, 1 | 2) => width.div_ceil(2),
            (PixelFormat::Yuy2, 0) => width.div_ceil(2) * 4,
            (PixelFormat::Rgba8 | PixelFormat::Bgra8, 0) => width * 4,
            _ => 0,
        }
    }

    /// Number of rows in one plane. Returns 0 for plane indices the format
    /// does not have.
    pub fn plane_rows(self, plane: usize, height: u32) -> usize {
        let height = height as usize;
        match (self, plane) {
            (PixelFormat::Nv12, 1) | (PixelFormat::I420, 1 | 2) => height.div_ceil(2),
            (_, 0) => height,
            _ => 0,
        }
    }

    /// Total tightly-packed buffer size across all planes.
    pub fn buffer_size(self, width: u32, height: u32) -> usize {
        (0..self.plane_count())
            .map(|plane| self.row_bytes(plane, width) * self.plane_rows(plane, height))
            .sum()
    }
}

/// Negotiated preview dimensions, fixed for the lifetime of a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSize {
    pub width: u32,
    pub height: u32,
}

impl PreviewSize {
    /// 1920x1080, the preferred capture session size.
    pub const FULL_HD: PreviewSize = PreviewSize {
        width: 1920,
        height: 1080,
    };

    /// 1280x720 fallback.
    pub const HD: PreviewSize = PreviewSize {
        width: 1280,
        height: 720,
    };

    /// 640x480 fallback for constrained devices.
    pub const VGA: PreviewSize = PreviewSize {
        width: 640,
        height: 480,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixels per frame.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for PreviewSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_formats_report_bytes_per_pixel() {
        assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), Some(4));
        assert_eq!(PixelFormat::Bgra8.bytes_per_pixel(), Some(4));
        assert_eq!(PixelFormat::Yuy2.bytes_per_pixel(), Some(2));
        assert_eq!(PixelFormat::Nv12.bytes_per_pixel(), None);
        assert_eq!(PixelFormat::I420.bytes_per_pixel(), None);
    }

    #[test]
    fn only_multi_plane_formats_are_planar() {
        assert!(PixelFormat::Nv12.is_planar());
        assert!(PixelFormat::I420.is_planar());
        // YUY2 interleaves luma and chroma in a single plane
        assert!(!PixelFormat::Yuy2.is_planar());
        assert!(!PixelFormat::Rgba8.is_planar());
        assert!(!PixelFormat::Bgra8.is_planar());
    }

    #[test]
    fn nv12_plane_geometry_even_size() {
        // 4x2: luma is 4x2, chroma is one interleaved row of 2 pairs
        assert_eq!(PixelFormat::Nv12.row_bytes(0, 4), 4);
        assert_eq!(PixelFormat::Nv12.plane_rows(0, 2), 2);
        assert_eq!(PixelFormat::Nv12.row_bytes(1, 4), 4);
        assert_eq!(PixelFormat::Nv12.plane_rows(1, 2), 1);
        assert_eq!(PixelFormat::Nv12.buffer_size(4, 2), 8 + 4);
    }

    #[test]
    fn nv12_plane_geometry_odd_size() {
        // 3x3: chroma rounds up to 2 columns and 2 rows
        assert_eq!(PixelFormat::Nv12.row_bytes(1, 3), 4);
        assert_eq!(PixelFormat::Nv12.plane_rows(1, 3), 2);
        assert_eq!(PixelFormat::Nv12.buffer_size(3, 3), 9 + 8);
    }

    #[test]
    fn i420_splits_chroma_into_two_planes() {
        assert_eq!(PixelFormat::I420.plane_count(), 3);
        assert_eq!(PixelFormat::I420.row_bytes(1, 4), 2);
        assert_eq!(PixelFormat::I420.row_bytes(2, 4), 2);
        assert_eq!(PixelFormat::I420.plane_rows(2, 4), 2);
        // Same total as NV12 for the same dimensions
        assert_eq!(
            PixelFormat::I420.buffer_size(4, 4),
            PixelFormat::Nv12.buffer_size(4, 4)
        );
    }

    #[test]
    fn out_of_range_plane_indices_are_zero_sized() {
        assert_eq!(PixelFormat::Bgra8.row_bytes(1, 4), 0);
        assert_eq!(PixelFormat::Nv12.plane_rows(2, 4), 0);
    }

    #[test]
    fn buffer_size_matches_packed_pixel_math() {
        assert_eq!(PixelFormat::Bgra8.buffer_size(7, 5), 7 * 5 * 4);
        assert_eq!(PixelFormat::Yuy2.buffer_size(4, 2), 4 * 2 * 2);
        assert_eq!(PixelFormat::Nv12.buffer_size(2, 2), 6);
    }

    #[test]
    fn preview_size_displays_as_dimensions() {
        assert_eq!(PreviewSize::new(1920, 1080).to_string(), "1920x1080");
        assert_eq!(PreviewSize::FULL_HD.pixel_count(), 1920 * 1080);
    }
}
