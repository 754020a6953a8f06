// Transform stages: pure functions over preallocated buffers.
//
// Stage one de-interleaves a luma-chroma source and converts colour into
// packed RGBA; stage two permutes the channel order into the BGRA the
// preview consumers expect. Neither stage allocates; both read source rows
// through their strides so padding bytes never reach the output.

use crate::error::{ConvertError, Result};
use crate::frame::source::PlaneRef;

/// BT.601 full-range YCbCr to RGB in Q8 fixed point.
///
/// The coefficients are the matrix scaled by 256 (1.402 -> 359,
/// 0.344 -> 88, 0.714 -> 183, 1.772 -> 454). Rounding is to nearest:
/// half the Q8 scale is added before the shift. Integer-only, so the same
/// input bytes always produce the same output bytes.
#[inline]
fn ycbcr_to_rgb(y: i32, cb: i32, cr: i32) -> (u8, u8, u8) {
    let u = cb - 128;
    let v = cr - 128;
    let r = (y * 256 + 359 * v + 128) >> 8;
    let g = (y * 256 - 88 * u - 183 * v + 128) >> 8;
    let b = (y * 256 + 454 * u + 128) >> 8;
    (
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
    )
}

/// Check that `len` bytes laid out at `stride` cover `rows` rows of
/// `row_bytes` payload. The final row may omit its padding.
fn check_layout(
    name: &str,
    len: usize,
    stride: usize,
    row_bytes: usize,
    rows: usize,
) -> Result<()> {
    if stride < row_bytes {
        return Err(ConvertError::Conversion(format!(
            "{name} stride {stride} is less than the {row_bytes}-byte row payload"
        )));
    }
    let needed = if rows == 0 {
        Some(0)
    } else {
        stride
            .checked_mul(rows - 1)
            .and_then(|body| body.checked_add(row_bytes))
    };
    // A span that does not fit in usize cannot be covered by any slice.
    let Some(needed) = needed else {
        return Err(ConvertError::Conversion(format!(
            "{name}: {rows} rows at stride {stride} exceed the address space"
        )));
    };
    if len < needed {
        return Err(ConvertError::Conversion(format!(
            "{name} holds {len} bytes, needs {needed}"
        )));
    }
    Ok(())
}

/// Stage one for NV12: de-interleave the bi-planar source into packed RGBA.
///
/// `luma` is the full-resolution Y plane; `chroma` is the interleaved CbCr
/// plane at half resolution in both dimensions, rounded up for odd sizes.
/// `dst` must cover `height` rows of `width * 4` bytes at `dst_stride`.
pub fn nv12_to_rgba(
    luma: PlaneRef<'_>,
    chroma: PlaneRef<'_>,
    dst: &mut [u8],
    dst_stride: usize,
    width: u32,
    height: u32,
) -> Result<()> {
    let width = width as usize;
    let height = height as usize;
    let chroma_row = width.div_ceil(2) * 2;
    check_layout("luma plane", luma.data.len(), luma.stride, width, height)?;
    check_layout(
        "chroma plane",
        chroma.data.len(),
        chroma.stride,
        chroma_row,
        height.div_ceil(2),
    )?;
    check_layout("stage-one output", dst.len(), dst_stride, width * 4, height)?;

    for row in 0..height {
        let y_start = row * luma.stride;
        let y_row = &luma.data[y_start..y_start + width];
        let uv_start = (row / 2) * chroma.stride;
        let uv_row = &chroma.data[uv_start..uv_start + chroma_row];
        let dst_start = row * dst_stride;
        let dst_row: &mut [[u8; 4]] =
            bytemuck::cast_slice_mut(&mut dst[dst_start..dst_start + width * 4]);

        for (col, px) in dst_row.iter_mut().enumerate() {
            let uv = (col / 2) * 2;
            let (r, g, b) = ycbcr_to_rgb(
                i32::from(y_row[col]),
                i32::from(uv_row[uv]),
                i32::from(uv_row[uv + 1]),
            );
            *px = [r, g, b, 255];
        }
    }
    Ok(())
}

/// Stage one for I420: merge the three-plane source into packed RGBA.
///
/// Identical colour math to [`nv12_to_rgba`]; only the chroma addressing
/// differs, with Cb and Cr in separate half-resolution planes.
pub fn i420_to_rgba(
    luma: PlaneRef<'_>,
    cb: PlaneRef<'_>,
    cr: PlaneRef<'_>,
    dst: &mut [u8],
    dst_stride: usize,
    width: u32,
    height: u32,
) -> Result<()> {
    let width = width as usize;
    let height = height as usize;
    let chroma_row = width.div_ceil(2);
    let chroma_rows = height.div_ceil(2);
    check_layout("luma plane", luma.data.len(), luma.stride, width, height)?;
    check_layout("cb plane", cb.data.len(), cb.stride, chroma_row, chroma_rows)?;
    check_layout("cr plane", cr.data.len(), cr.stride, chroma_row, chroma_rows)?;
    check_layout("stage-one output", dst.len(), dst_stride, width * 4, height)?;

    for row in 0..height {
        let y_start = row * luma.stride;
        let y_row = &luma.data[y_start..y_start + width];
        let cb_start = (row / 2) * cb.stride;
        let cb_row = &cb.data[cb_start..cb_start + chroma_row];
        let cr_start = (row / 2) * cr.stride;
        let cr_row = &cr.data[cr_start..cr_start + chroma_row];
        let dst_start = row * dst_stride;
        let dst_row: &mut [[u8; 4]] =
            bytemuck::cast_slice_mut(&mut dst[dst_start..dst_start + width * 4]);

        for (col, px) in dst_row.iter_mut().enumerate() {
            let (r, g, b) = ycbcr_to_rgb(
                i32::from(y_row[col]),
                i32::from(cb_row[col / 2]),
                i32::from(cr_row[col / 2]),
            );
            *px = [r, g, b, 255];
        }
    }
    Ok(())
}

/// Stage two: permute packed RGBA into BGRA.
///
/// Alpha passes through; only the red and blue positions swap. Source and
/// destination may carry different strides.
pub fn rgba_to_bgra(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: u32,
    height: u32,
) -> Result<()> {
    let width = width as usize;
    let height = height as usize;
    let row_bytes = width * 4;
    check_layout("stage-two input", src.len(), src_stride, row_bytes, height)?;
    check_layout("stage-two output", dst.len(), dst_stride, row_bytes, height)?;

    for row in 0..height {
        let src_start = row * src_stride;
        let src_row: &[[u8; 4]] = bytemuck::cast_slice(&src[src_start..src_start + row_bytes]);
        let dst_start = row * dst_stride;
        let dst_row: &mut [[u8; 4]] =
            bytemuck::cast_slice_mut(&mut dst[dst_start..dst_start + row_bytes]);

        for (out, px) in dst_row.iter_mut().zip(src_row) {
            *out = [px[2], px[1], px[0], px[3]];
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::pattern;
    use crate::frame::source::SourceBuffer;

    fn convert_nv12(frame: &crate::frame::source::SourceFrame, width: u32, height: u32) -> Vec<u8> {
        let mapped = frame.map().unwrap();
        let mut dst = vec![0u8; width as usize * height as usize * 4];
        nv12_to_rgba(
            mapped.plane(0).unwrap(),
            mapped.plane(1).unwrap(),
            &mut dst,
            width as usize * 4,
            width,
            height,
        )
        .unwrap();
        dst
    }

    #[test]
    fn converts_nv12_grey() {
        // Y=128, Cb=Cr=128 is mid grey
        let frame = pattern::solid_nv12(2, 2, 128, 128, 128);
        let rgba = convert_nv12(&frame, 2, 2);
        for px in rgba.chunks(4) {
            assert_eq!(px, [128, 128, 128, 255]);
        }
    }

    #[test]
    fn converts_nv12_black() {
        let frame = pattern::solid_nv12(2, 2, 0, 128, 128);
        let rgba = convert_nv12(&frame, 2, 2);
        for px in rgba.chunks(4) {
            assert_eq!(px, [0, 0, 0, 255]);
        }
    }

    #[test]
    fn converts_nv12_white() {
        // Y=235 is reference white; neutral chroma must leave it untouched
        let frame = pattern::solid_nv12(4, 2, 235, 128, 128);
        let rgba = convert_nv12(&frame, 4, 2);
        for px in rgba.chunks(4) {
            assert_eq!(px, [235, 235, 235, 255]);
        }
    }

    #[test]
    fn converts_nv12_saturated_red() {
        // Y=76, Cb=85, Cr=255 is (almost) full red
        let frame = pattern::solid_nv12(2, 2, 76, 85, 255);
        let rgba = convert_nv12(&frame, 2, 2);
        for px in rgba.chunks(4) {
            assert_eq!(px, [254, 0, 0, 255]);
        }
    }

    #[test]
    fn odd_dimensions_reuse_edge_chroma() {
        let frame = pattern::solid_nv12(3, 3, 90, 128, 128);
        let rgba = convert_nv12(&frame, 3, 3);
        assert_eq!(rgba.len(), 3 * 3 * 4);
        for px in rgba.chunks(4) {
            assert_eq!(px, [90, 90, 90, 255]);
        }
    }

    #[test]
    fn respects_source_strides() {
        let frame = pattern::solid_nv12_padded(4, 4, 200, 128, 128, 5);
        let rgba = convert_nv12(&frame, 4, 4);
        // Padding bytes never reach the output
        for px in rgba.chunks(4) {
            assert_eq!(px, [200, 200, 200, 255]);
        }
    }

    #[test]
    fn luma_ramp_lands_in_matching_columns() {
        let width = 8u32;
        let frame = pattern::luma_ramp_nv12(width, 2);
        let mapped = frame.map().unwrap();
        let luma = mapped.plane(0).unwrap();
        let rgba = convert_nv12(&frame, width, 2);
        for col in 0..width as usize {
            // Neutral chroma plus round-to-nearest keeps luma intact
            let expected = luma.data[col];
            assert_eq!(rgba[col * 4], expected, "column {col}");
        }
    }

    #[test]
    fn short_luma_plane_is_rejected() {
        let frame = pattern::solid_nv12(4, 4, 128, 128, 128);
        let mapped = frame.map().unwrap();
        let mut dst = vec![0u8; 4 * 4 * 4];
        let short = PlaneRef {
            data: &mapped.plane(0).unwrap().data[..8],
            stride: 4,
        };
        let result = nv12_to_rgba(short, mapped.plane(1).unwrap(), &mut dst, 16, 4, 4);
        assert!(matches!(result, Err(ConvertError::Conversion(_))));
    }

    #[test]
    fn stride_below_row_payload_is_rejected() {
        let frame = pattern::solid_nv12(4, 4, 128, 128, 128);
        let mapped = frame.map().unwrap();
        let mut dst = vec![0u8; 4 * 4 * 4];
        let narrow = PlaneRef {
            data: mapped.plane(0).unwrap().data,
            stride: 3,
        };
        let result = nv12_to_rgba(narrow, mapped.plane(1).unwrap(), &mut dst, 16, 4, 4);
        assert!(matches!(result, Err(ConvertError::Conversion(_))));
    }

    #[test]
    fn stride_whose_row_span_overflows_is_rejected() {
        // A source implementation can report any stride it likes
        let frame = pattern::solid_nv12(4, 4, 128, 128, 128);
        let mapped = frame.map().unwrap();
        let mut dst = vec![0u8; 4 * 4 * 4];
        let absurd = PlaneRef {
            data: mapped.plane(0).unwrap().data,
            stride: usize::MAX,
        };
        let result = nv12_to_rgba(absurd, mapped.plane(1).unwrap(), &mut dst, 16, 4, 4);
        assert!(matches!(result, Err(ConvertError::Conversion(_))));
    }

    #[test]
    fn undersized_output_is_rejected() {
        let frame = pattern::solid_nv12(4, 4, 128, 128, 128);
        let mapped = frame.map().unwrap();
        let mut dst = vec![0u8; 4 * 4 * 4 - 1];
        let result = nv12_to_rgba(
            mapped.plane(0).unwrap(),
            mapped.plane(1).unwrap(),
            &mut dst,
            16,
            4,
            4,
        );
        assert!(matches!(result, Err(ConvertError::Conversion(_))));
    }

    #[test]
    fn i420_matches_nv12_for_identical_content() {
        let width = 6u32;
        let height = 4u32;
        let nv12 = pattern::solid_nv12(width, height, 150, 44, 21);
        let i420 = pattern::solid_i420(width, height, 150, 44, 21);

        let from_nv12 = convert_nv12(&nv12, width, height);

        let mapped = i420.map().unwrap();
        let mut from_i420 = vec![0u8; width as usize * height as usize * 4];
        i420_to_rgba(
            mapped.plane(0).unwrap(),
            mapped.plane(1).unwrap(),
            mapped.plane(2).unwrap(),
            &mut from_i420,
            width as usize * 4,
            width,
            height,
        )
        .unwrap();

        assert_eq!(from_nv12, from_i420);
        // Y=150, Cb=44, Cr=21 is a saturated green
        assert_eq!(&from_i420[..4], [0, 255, 1, 255]);
    }

    #[test]
    fn rgba_to_bgra_swaps_red_and_blue() {
        let src = [10u8, 20, 30, 40, 50, 60, 70, 80];
        let mut dst = [0u8; 8];
        rgba_to_bgra(&src, 8, &mut dst, 8, 2, 1).unwrap();
        assert_eq!(dst, [30, 20, 10, 40, 70, 60, 50, 80]);
    }

    #[test]
    fn rgba_to_bgra_round_trips() {
        let src = [1u8, 2, 3, 4];
        let mut bgra = [0u8; 4];
        rgba_to_bgra(&src, 4, &mut bgra, 4, 1, 1).unwrap();
        let mut back = [0u8; 4];
        rgba_to_bgra(&bgra, 4, &mut back, 4, 1, 1).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn rgba_to_bgra_honours_both_strides() {
        // One 2x2 frame, source rows padded to 12 bytes, dest rows to 10
        let mut src = vec![0u8; 12 * 2];
        for row in 0..2 {
            for col in 0..2 {
                let base = row * 12 + col * 4;
                src[base] = 100; // R
                src[base + 3] = 255; // A
            }
        }
        let mut dst = vec![0u8; 10 * 2];
        rgba_to_bgra(&src, 12, &mut dst, 10, 2, 2).unwrap();
        for row in 0..2 {
            for col in 0..2 {
                let base = row * 10 + col * 4;
                assert_eq!(dst[base + 2], 100); // R moved to third byte
                assert_eq!(dst[base + 3], 255);
            }
        }
        // Destination padding is never written
        assert_eq!(dst[8], 0);
        assert_eq!(dst[9], 0);
    }

    #[test]
    fn rgba_to_bgra_rejects_short_output() {
        let src = [0u8; 16];
        let mut dst = [0u8; 15];
        let result = rgba_to_bgra(&src, 8, &mut dst, 8, 2, 2);
        assert!(matches!(result, Err(ConvertError::Conversion(_))));
    }

    #[test]
    fn scalar_math_rounds_to_nearest() {
        // 100 + 1.402 * 2 = 102.8, which truncation would floor to 102
        assert_eq!(ycbcr_to_rgb(100, 128, 130), (103, 99, 100));
    }

    #[test]
    fn scalar_math_clamps_out_of_gamut_values() {
        assert_eq!(ycbcr_to_rgb(255, 128, 255), (255, 164, 255));
        assert_eq!(ycbcr_to_rgb(0, 0, 128), (0, 44, 0));
    }

    #[test]
    fn scalar_math_is_deterministic() {
        let first = ycbcr_to_rgb(93, 201, 47);
        for _ in 0..10 {
            assert_eq!(ycbcr_to_rgb(93, 201, 47), first);
        }
    }
}
