//! YUV 4:2:0 → ARGB8888 with integer fixed‑point BT.601 coefficients.
//!
//! Coefficients are the usual video‑range constants scaled by 1024:
//!
//! ```text
//! Y' = max(0, Y - 16) * 1192
//! R  = (Y' + 1634 * V')            >> 10
//! G  = (Y' -  833 * V' - 400 * U') >> 10
//! B  = (Y' + 2066 * U')            >> 10      (U' = U - 128, V' = V - 128)
//! ```
//!
//! Every channel saturates to `[0, 255]`; the `i32` intermediates never
//! get close to overflowing.

use crate::ConvertError;

/// Strides describing a 4:2:0 image held in three separate byte planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Yuv420Layout {
    pub width: usize,
    pub height: usize,
    pub y_row_stride: usize,
    pub uv_row_stride: usize,
    pub uv_pixel_stride: usize,
}

impl Yuv420Layout {
    /// Tightly packed planar layout (I420 without padding).
    pub fn packed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            y_row_stride: width,
            uv_row_stride: width.div_ceil(2),
            uv_pixel_stride: 1,
        }
    }

    fn chroma_dims(&self) -> (usize, usize) {
        (self.width.div_ceil(2), self.height.div_ceil(2))
    }

    /// Smallest luma buffer this layout can be read from.
    pub fn min_y_len(&self) -> usize {
        self.height.saturating_sub(1) * self.y_row_stride + self.width
    }

    /// Smallest U (or V) buffer this layout can be read from.
    pub fn min_uv_len(&self) -> usize {
        let (cw, ch) = self.chroma_dims();
        ch.saturating_sub(1) * self.uv_row_stride + cw.saturating_sub(1) * self.uv_pixel_stride + 1
    }

    fn check(&self, y: usize, u: usize, v: usize, out: usize) -> Result<(), ConvertError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConvertError::ZeroDimension { width: self.width, height: self.height });
        }
        if self.y_row_stride < self.width {
            return Err(ConvertError::RowStride { plane: "Y", stride: self.y_row_stride, needed: self.width });
        }
        if self.uv_pixel_stride == 0 {
            return Err(ConvertError::PixelStride);
        }
        let (cw, _) = self.chroma_dims();
        let uv_row = (cw - 1) * self.uv_pixel_stride + 1;
        if self.uv_row_stride < uv_row {
            return Err(ConvertError::RowStride { plane: "UV", stride: self.uv_row_stride, needed: uv_row });
        }
        for (plane, len, needed) in [
            ("Y", y, self.min_y_len()),
            ("U", u, self.min_uv_len()),
            ("V", v, self.min_uv_len()),
        ] {
            if len < needed {
                return Err(ConvertError::PlaneTooShort { plane, len, needed });
            }
        }
        let pixels = self.width * self.height;
        if out != pixels {
            return Err(ConvertError::OutputSize { len: out, needed: pixels });
        }
        Ok(())
    }
}

#[inline]
fn saturate(x: i32) -> u32 {
    (x >> 10).clamp(0, 255) as u32
}

/// Convert one YUV sample to an opaque ARGB word.
#[inline]
pub fn yuv_to_argb(y: u8, u: u8, v: u8) -> u32 {
    let yn = (y as i32 - 16).max(0) * 1192;
    let u = u as i32 - 128;
    let v = v as i32 - 128;

    let r = saturate(yn + 1634 * v);
    let g = saturate(yn - 833 * v - 400 * u);
    let b = saturate(yn + 2066 * u);

    0xff00_0000 | (r << 16) | (g << 8) | b
}

/// Convert a full frame into `out` (`width * height` words, row‑major).
///
/// Chroma is sampled at `(x / 2, y / 2)` with floor division, so odd widths
/// and heights reuse the last chroma column / row. U and V share
/// `uv_row_stride` and `uv_pixel_stride`, which covers planar (pixel stride
/// 1) and interleaved NV12/NV21 views (pixel stride 2) alike.
pub fn convert_yuv420_to_argb8888(
    y: &[u8],
    u: &[u8],
    v: &[u8],
    layout: &Yuv420Layout,
    out: &mut [u32],
) -> Result<(), ConvertError> {
    layout.check(y.len(), u.len(), v.len(), out.len())?;

    let w = layout.width;
    for (row, out_row) in out.chunks_exact_mut(w).enumerate() {
        let y_row = &y[row * layout.y_row_stride..row * layout.y_row_stride + w];
        let uv_base = (row >> 1) * layout.uv_row_stride;
        for (col, (px, &luma)) in out_row.iter_mut().zip(y_row).enumerate() {
            let uv = uv_base + (col >> 1) * layout.uv_pixel_stride;
            *px = yuv_to_argb(luma, u[uv], v[uv]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(p: u32) -> (u32, u32, u32, u32) {
        (p >> 24, (p >> 16) & 0xff, (p >> 8) & 0xff, p & 0xff)
    }

    #[test]
    fn black_point_is_black() {
        assert_eq!(yuv_to_argb(16, 128, 128), 0xff00_0000);
        // below the black point clamps to 0 before scaling
        assert_eq!(yuv_to_argb(0, 128, 128), 0xff00_0000);
    }

    #[test]
    fn neutral_chroma_is_gray() {
        for y in 0..=255u8 {
            let expect = (((y as i32 - 16).max(0) * 1192) >> 10).clamp(0, 255) as u32;
            let (a, r, g, b) = channels(yuv_to_argb(y, 128, 128));
            assert_eq!((a, r, g, b), (0xff, expect, expect, expect), "Y={y}");
        }
    }

    #[test]
    fn white_saturates() {
        assert_eq!(yuv_to_argb(255, 128, 128), 0xffff_ffff);
        assert_eq!(yuv_to_argb(235, 128, 128), 0xfffe_fefe);
    }

    #[test]
    fn extreme_chroma_clamps_instead_of_wrapping() {
        // Y=0, U=V=255: r and b overflow high, g goes far negative
        let (a, r, g, b) = channels(yuv_to_argb(0, 255, 255));
        assert_eq!((a, r, g, b), (0xff, 202, 0, 255));

        // Y=16, U=V=0: r and b go negative
        let (_, r, g, b) = channels(yuv_to_argb(16, 0, 0));
        assert_eq!((r, g, b), (0, 154, 0));

        // Y=U=V=255: r and b overshoot 255
        let (_, r, g, b) = channels(yuv_to_argb(255, 255, 255));
        assert_eq!((r, g, b), (255, 125, 255));
    }

    #[test]
    fn reference_colours() {
        // video‑range primaries (BT.601)
        let (_, r, g, b) = channels(yuv_to_argb(81, 90, 240));
        assert!(r > 250 && g < 5 && b < 5, "red: {r} {g} {b}");
        let (_, r, g, b) = channels(yuv_to_argb(145, 54, 34));
        assert!(r < 5 && g > 250 && b < 5, "green: {r} {g} {b}");
        let (_, r, g, b) = channels(yuv_to_argb(41, 240, 110));
        assert!(r < 5 && g < 5 && b > 250, "blue: {r} {g} {b}");
    }

    #[test]
    fn short_plane_is_an_error_not_a_panic() {
        let layout = Yuv420Layout::packed(4, 4);
        let mut out = vec![0u32; 16];
        let err = convert_yuv420_to_argb8888(&[0; 15], &[0; 4], &[0; 4], &layout, &mut out).unwrap_err();
        assert_eq!(err, ConvertError::PlaneTooShort { plane: "Y", len: 15, needed: 16 });
    }

    #[test]
    fn output_must_match_geometry() {
        let layout = Yuv420Layout::packed(2, 2);
        let mut out = vec![0u32; 3];
        let err = convert_yuv420_to_argb8888(&[0; 4], &[0; 1], &[0; 1], &layout, &mut out).unwrap_err();
        assert!(matches!(err, ConvertError::OutputSize { len: 3, needed: 4 }));
    }

    #[test]
    fn interleaved_chroma_uses_pixel_stride() {
        // 4x2 NV21: one chroma row V0 U0 V1 U1
        let y = [100u8; 8];
        let vu = [200u8, 60, 128, 128];
        let layout = Yuv420Layout { width: 4, height: 2, y_row_stride: 4, uv_row_stride: 4, uv_pixel_stride: 2 };
        let mut out = vec![0u32; 8];
        convert_yuv420_to_argb8888(&y, &vu[1..], &vu, &layout, &mut out).unwrap();
        assert_eq!(out[0], yuv_to_argb(100, 60, 200));
        assert_eq!(out[1], out[0]);
        assert_eq!(out[2], yuv_to_argb(100, 128, 128));
        assert_eq!(out[4..], out[..4]);
    }
}
