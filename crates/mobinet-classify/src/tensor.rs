// mobinet-classify/src/tensor.rs
use crate::{ClassifyError, Result};
use mobinet_preprocess::Tile;
use ndarray::Array4;

/// Reject tiles that are not `size`×`size`.
pub fn check_input(tile: &Tile, size: usize) -> Result<()> {
    if tile.width() != size || tile.height() != size {
        return Err(ClassifyError::InputSize { expected: size, width: tile.width(), height: tile.height() });
    }
    Ok(())
}

/// ARGB tile → `[1, 3, H, W]` tensor in B, G, R channel order with `mean`
/// subtracted per channel. Values stay in the 0‥255 range (no scaling);
/// alpha is dropped.
pub fn tile_to_bgr_tensor(tile: &Tile, mean: [f32; 3]) -> Array4<f32> {
    let (w, h) = (tile.width(), tile.height());
    let mut arr = Array4::<f32>::zeros((1, 3, h, w));
    for y in 0..h {
        for x in 0..w {
            let p = tile.pixel(x, y);
            let (r, g, b) = ((p >> 16) & 0xff, (p >> 8) & 0xff, p & 0xff);
            arr[(0, 0, y, x)] = b as f32 - mean[0];
            arr[(0, 1, y, x)] = g as f32 - mean[1];
            arr[(0, 2, y, x)] = r as f32 - mean[2];
        }
    }
    arr
}
