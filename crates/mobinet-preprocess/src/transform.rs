// mobinet-preprocess/src/transform.rs
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How the rotated frame is scaled onto the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Independent x / y factors; aspect ratio is not kept.
    Stretch,
    /// Uniform `min` factor: the whole frame fits, tile edges are padded.
    #[default]
    Fit,
    /// Uniform `max` factor: the tile is filled, frame edges are cropped.
    Fill,
}

/// 2D affine transform
///
/// ```text
/// | a  b  tx |   | x |
/// | c  d  ty | * | y |
/// | 0  0  1  |   | 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformMatrix {
    pub fn identity() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 }
    }

    /// `next ∘ self`: apply `self` first, then `next`.
    pub fn then(self, next: Self) -> Self {
        Self {
            a: next.a * self.a + next.b * self.c,
            b: next.a * self.b + next.b * self.d,
            c: next.c * self.a + next.d * self.c,
            d: next.c * self.b + next.d * self.d,
            tx: next.a * self.tx + next.b * self.ty + next.tx,
            ty: next.c * self.tx + next.d * self.ty + next.ty,
        }
    }

    pub fn then_translate(self, tx: f32, ty: f32) -> Self {
        self.then(Self { tx, ty, ..Self::identity() })
    }

    pub fn then_scale(self, sx: f32, sy: f32) -> Self {
        self.then(Self { a: sx, d: sy, ..Self::identity() })
    }

    /// Rotate clockwise on screen (y grows downwards) by `degrees`.
    /// Quarter turns use exact sines so they stay bit‑reproducible.
    pub fn then_rotate(self, degrees: i32) -> Self {
        let (cos, sin) = match degrees.rem_euclid(360) {
            0 => (1.0, 0.0),
            90 => (0.0, 1.0),
            180 => (-1.0, 0.0),
            270 => (0.0, -1.0),
            other => {
                let rad = (other as f32).to_radians();
                (rad.cos(), rad.sin())
            }
        };
        self.then(Self { a: cos, b: -sin, c: sin, d: cos, tx: 0.0, ty: 0.0 })
    }

    #[inline]
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.a * x + self.b * y + self.tx, self.c * x + self.d * y + self.ty)
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        let (a, b, c, d) = (self.d * inv, -self.b * inv, -self.c * inv, self.a * inv);
        Some(Self {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + b * self.ty),
            ty: -(c * self.tx + d * self.ty),
        })
    }

    /// Map a `src_w`×`src_h` frame captured at `rotation` degrees onto a
    /// `dst_w`×`dst_h` tile.
    ///
    /// The frame centre goes to the origin, the frame is rotated, scaled per
    /// `mode` (rotations of 90°/270° swap the input extent) and moved to the
    /// tile centre.
    pub fn frame_to_tile(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, rotation: i32, mode: ScaleMode) -> Self {
        let rotation = rotation.rem_euclid(360);
        if rotation % 90 != 0 {
            warn!("Rotation of {} % 90 != 0", rotation);
        }

        let transpose = rotation % 180 == 90;
        let (in_w, in_h) = if transpose { (src_h, src_w) } else { (src_w, src_h) };

        let sx = dst_w as f32 / in_w as f32;
        let sy = dst_h as f32 / in_h as f32;
        let (sx, sy) = match mode {
            ScaleMode::Stretch => (sx, sy),
            ScaleMode::Fit => (sx.min(sy), sx.min(sy)),
            ScaleMode::Fill => (sx.max(sy), sx.max(sy)),
        };

        Self::identity()
            .then_translate(-(src_w as f32) / 2.0, -(src_h as f32) / 2.0)
            .then_rotate(rotation)
            .then_scale(sx, sy)
            .then_translate(dst_w as f32 / 2.0, dst_h as f32 / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TransformKey {
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
    rotation: i32,
    mode: ScaleMode,
}

/// Forward matrix and the inverse used for resampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedTransform {
    pub forward: TransformMatrix,
    pub inverse: TransformMatrix,
}

/// Remembers the last frame→tile transform; recomputes only when the frame
/// size, rotation, tile size or scale mode change.
#[derive(Debug, Default)]
pub struct TransformCache {
    entry: Option<(TransformKey, CachedTransform)>,
    recomputes: u64,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` only for a degenerate (zero‑sized) geometry.
    pub fn get(
        &mut self,
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        rotation: i32,
        mode: ScaleMode,
    ) -> Option<CachedTransform> {
        if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
            return None;
        }
        let key = TransformKey { src_w, src_h, dst_w, dst_h, rotation: rotation.rem_euclid(360), mode };
        if let Some((cached_key, cached)) = &self.entry {
            if *cached_key == key {
                return Some(*cached);
            }
        }

        let forward = TransformMatrix::frame_to_tile(src_w, src_h, dst_w, dst_h, rotation, mode);
        let inverse = forward.invert()?;
        let cached = CachedTransform { forward, inverse };
        self.recomputes += 1;
        debug!(
            "frame→tile transform {}x{}@{}° → {}x{} ({:?}): {:?}",
            src_w, src_h, key.rotation, dst_w, dst_h, mode, forward
        );
        self.entry = Some((key, cached));
        Some(cached)
    }

    /// Number of times the matrix has been computed.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}
