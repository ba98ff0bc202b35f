// mobinet-preprocess/src/resample.rs
use crate::argb::{argb, to_rgba};
use crate::{RgbBuffer, Tile, TransformMatrix};
use serde::{Deserialize, Serialize};

/// Colour written where a tile pixel has no pre‑image in the frame.
pub const OUTSIDE: u32 = 0xff00_0000;

/// Source sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Pick the source pixel containing the mapped point (unfiltered draw).
    #[default]
    Nearest,
    /// Weight the four surrounding pixel centres.
    Bilinear,
}

/// Fill `tile` from `src` through `inverse` (tile → frame coordinates).
///
/// Each tile pixel is sampled at its centre `(x + 0.5, y + 0.5)`.
pub fn resample(src: &RgbBuffer, inverse: &TransformMatrix, tile: &mut Tile, sampling: Sampling) {
    let tw = tile.width();
    if src.width() == 0 || src.height() == 0 {
        tile.pixels_mut().fill(OUTSIDE);
        return;
    }

    for (ty, row) in tile.pixels_mut().chunks_exact_mut(tw).enumerate() {
        for (tx, px) in row.iter_mut().enumerate() {
            let (sx, sy) = inverse.map_point(tx as f32 + 0.5, ty as f32 + 0.5);
            *px = match sampling {
                Sampling::Nearest => nearest(src, sx, sy),
                Sampling::Bilinear => bilinear(src, sx, sy),
            };
        }
    }
}

#[inline]
fn inside(src: &RgbBuffer, sx: f32, sy: f32) -> bool {
    sx >= 0.0 && sy >= 0.0 && sx < src.width() as f32 && sy < src.height() as f32
}

fn nearest(src: &RgbBuffer, sx: f32, sy: f32) -> u32 {
    if !inside(src, sx, sy) {
        return OUTSIDE;
    }
    let x = (sx as usize).min(src.width() - 1);
    let y = (sy as usize).min(src.height() - 1);
    src.pixel(x, y)
}

fn bilinear(src: &RgbBuffer, sx: f32, sy: f32) -> u32 {
    if !inside(src, sx, sy) {
        return OUTSIDE;
    }
    // pixel centres sit at +0.5
    let fx = (sx - 0.5).max(0.0);
    let fy = (sy - 0.5).max(0.0);
    let x0 = (fx as usize).min(src.width() - 1);
    let y0 = (fy as usize).min(src.height() - 1);
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let wx = (fx - x0 as f32).clamp(0.0, 1.0);
    let wy = (fy - y0 as f32).clamp(0.0, 1.0);

    let p00 = to_rgba(src.pixel(x0, y0));
    let p10 = to_rgba(src.pixel(x1, y0));
    let p01 = to_rgba(src.pixel(x0, y1));
    let p11 = to_rgba(src.pixel(x1, y1));

    let mut out = [0u8; 4];
    for (c, o) in out.iter_mut().enumerate() {
        let top = p00[c] as f32 * (1.0 - wx) + p10[c] as f32 * wx;
        let bottom = p01[c] as f32 * (1.0 - wx) + p11[c] as f32 * wx;
        *o = (top * (1.0 - wy) + bottom * wy).round().clamp(0.0, 255.0) as u8;
    }
    argb(out[3], out[0], out[1], out[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScaleMode;

    fn numbered(w: usize, h: usize) -> RgbBuffer {
        let px = (0..w * h).map(|i| 0xff00_0000 | i as u32).collect();
        RgbBuffer::from_pixels(w, h, px).unwrap()
    }

    fn inverse(src: &RgbBuffer, tw: usize, th: usize, rot: i32, mode: ScaleMode) -> TransformMatrix {
        TransformMatrix::frame_to_tile(src.width() as u32, src.height() as u32, tw as u32, th as u32, rot, mode)
            .invert()
            .unwrap()
    }

    #[test]
    fn same_size_identity_copies() {
        let src = numbered(6, 4);
        let mut tile = Tile::new(6, 4);
        resample(&src, &inverse(&src, 6, 4, 0, ScaleMode::Stretch), &mut tile, Sampling::Nearest);
        assert_eq!(tile.pixels(), src.pixels());
    }

    #[test]
    fn half_turn_reverses_pixels() {
        let src = numbered(5, 3);
        let mut tile = Tile::new(5, 3);
        resample(&src, &inverse(&src, 5, 3, 180, ScaleMode::Fit), &mut tile, Sampling::Nearest);
        let mut rev = src.pixels().to_vec();
        rev.reverse();
        assert_eq!(tile.pixels(), &rev[..]);
    }

    #[test]
    fn quarter_turn_moves_bottom_left_to_top_left() {
        let src = numbered(4, 2);
        let mut tile = Tile::new(2, 4);
        resample(&src, &inverse(&src, 2, 4, 90, ScaleMode::Fit), &mut tile, Sampling::Nearest);
        // clockwise: first tile row is the first source column read bottom‑up
        assert_eq!(tile.pixel(0, 0), src.pixel(0, 1));
        assert_eq!(tile.pixel(1, 0), src.pixel(0, 0));
        assert_eq!(tile.pixel(0, 3), src.pixel(3, 1));
    }

    #[test]
    fn fit_pads_outside_with_opaque_black() {
        let src = RgbBuffer::from_pixels(4, 2, vec![0xffff_ffff; 8]).unwrap();
        let mut tile = Tile::new(4, 4);
        resample(&src, &inverse(&src, 4, 4, 0, ScaleMode::Fit), &mut tile, Sampling::Nearest);
        assert_eq!(tile.pixel(0, 0), OUTSIDE);
        assert_eq!(tile.pixel(0, 1), 0xffff_ffff);
        assert_eq!(tile.pixel(3, 2), 0xffff_ffff);
        assert_eq!(tile.pixel(3, 3), OUTSIDE);
    }

    #[test]
    fn downscale_by_two_picks_every_other_pixel() {
        let src = numbered(8, 8);
        let mut tile = Tile::new(4, 4);
        resample(&src, &inverse(&src, 4, 4, 0, ScaleMode::Stretch), &mut tile, Sampling::Nearest);
        // tile centre (0.5,0.5) maps to (1.0,1.0)
        assert_eq!(tile.pixel(0, 0), src.pixel(1, 1));
        assert_eq!(tile.pixel(3, 2), src.pixel(7, 5));
    }

    #[test]
    fn bilinear_blends_neighbours() {
        let src = RgbBuffer::from_pixels(2, 1, vec![0xff00_0000, 0xffc8_c8c8]).unwrap();
        let mut tile = Tile::new(1, 1);
        resample(&src, &inverse(&src, 1, 1, 0, ScaleMode::Stretch), &mut tile, Sampling::Bilinear);
        // centre of a 2x1 frame sits halfway between the two pixel centres
        assert_eq!(tile.pixel(0, 0), 0xff64_6464);
    }

    #[test]
    fn bilinear_of_uniform_is_uniform() {
        let src = RgbBuffer::from_pixels(7, 5, vec![0xff12_3456; 35]).unwrap();
        let mut tile = Tile::new(3, 3);
        resample(&src, &inverse(&src, 3, 3, 90, ScaleMode::Stretch), &mut tile, Sampling::Bilinear);
        assert!(tile.pixels().iter().all(|&p| p == 0xff12_3456));
    }
}
