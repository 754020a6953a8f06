//! Synthetic source frames for tests and bring-up without a capture device.
//!
//! Generators return ordinary [`SourceFrame`]s, so anything that consumes a
//! [`crate::frame::source::SourceBuffer`] can run against them unchanged.

use crate::frame::format::PixelFormat;
use crate::frame::source::{SourceFrame, SourcePlane};

/// Byte used to fill stride padding so a stage that reads past the row
/// payload produces visibly wrong pixels.
const PADDING_FILL: u8 = 0xAB;

/// Solid-colour NV12 frame: every pixel carries the given luma/chroma triple.
pub fn solid_nv12(width: u32, height: u32, y: u8, cb: u8, cr: u8) -> SourceFrame {
    let format = PixelFormat::Nv12;
    let luma = vec![y; format.row_bytes(0, width) * format.plane_rows(0, height)];
    let pairs = format.row_bytes(1, width) / 2 * format.plane_rows(1, height);
    let mut chroma = Vec::with_capacity(pairs * 2);
    for _ in 0..pairs {
        chroma.push(cb);
        chroma.push(cr);
    }
    SourceFrame::nv12(width, height, luma, chroma).expect("generated planes are consistent")
}

/// Solid-colour I420 frame with the same sampling as [`solid_nv12`].
pub fn solid_i420(width: u32, height: u32, y: u8, cb: u8, cr: u8) -> SourceFrame {
    let format = PixelFormat::I420;
    let luma = vec![y; format.row_bytes(0, width) * format.plane_rows(0, height)];
    let chroma_len = format.row_bytes(1, width) * format.plane_rows(1, height);
    SourceFrame::i420(
        width,
        height,
        luma,
        vec![cb; chroma_len],
        vec![cr; chroma_len],
    )
    .expect("generated planes are consistent")
}

/// Solid-colour NV12 frame whose rows carry `padding` extra stride bytes.
pub fn solid_nv12_padded(
    width: u32,
    height: u32,
    y: u8,
    cb: u8,
    cr: u8,
    padding: usize,
) -> SourceFrame {
    let format = PixelFormat::Nv12;
    let luma_row = format.row_bytes(0, width);
    let luma_rows = format.plane_rows(0, height);
    let mut luma = Vec::with_capacity((luma_row + padding) * luma_rows);
    for _ in 0..luma_rows {
        luma.resize(luma.len() + luma_row, y);
        luma.resize(luma.len() + padding, PADDING_FILL);
    }

    let chroma_row = format.row_bytes(1, width);
    let chroma_rows = format.plane_rows(1, height);
    let mut chroma = Vec::with_capacity((chroma_row + padding) * chroma_rows);
    for _ in 0..chroma_rows {
        for _ in 0..chroma_row / 2 {
            chroma.push(cb);
            chroma.push(cr);
        }
        chroma.resize(chroma.len() + padding, PADDING_FILL);
    }

    SourceFrame::new(
        format,
        width,
        height,
        vec![
            SourcePlane {
                data: luma,
                stride: luma_row + padding,
            },
            SourcePlane {
                data: chroma,
                stride: chroma_row + padding,
            },
        ],
    )
    .expect("generated planes are consistent")
}

/// NV12 frame with a horizontal luma ramp over neutral chroma.
///
/// Column `c` gets luma `c * 255 / width`, so every pixel column is
/// distinguishable — useful for catching transposed or off-by-one
/// addressing in a transform stage.
pub fn luma_ramp_nv12(width: u32, height: u32) -> SourceFrame {
    let w = width as usize;
    let h = height as usize;
    let mut luma = Vec::with_capacity(w * h);
    for _row in 0..h {
        for col in 0..w {
            luma.push((col * 255 / w.max(1)) as u8);
        }
    }
    let format = PixelFormat::Nv12;
    let pairs = format.row_bytes(1, width) / 2 * format.plane_rows(1, height);
    let chroma = vec![128u8; pairs * 2];
    SourceFrame::nv12(width, height, luma, chroma).expect("generated planes are consistent")
}
