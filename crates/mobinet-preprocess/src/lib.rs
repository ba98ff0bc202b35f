// mobinet-preprocess/src/lib.rs
// ============================================================
// Frame preprocessing for mobinet
// Converts ingested YUV 4:2:0 planes to ARGB8888 and maps the
// rotated frame onto the fixed classifier tile.
// ------------------------------------------------------------
// Public API:
//   * convert_yuv420_to_argb8888() – fixed‑point BT.601 kernel
//   * TransformMatrix / TransformCache – frame → tile geometry
//   * resample()                 – inverse‑mapped tile fill
//   * Preprocessor               – per‑frame convert + preprocess
// ============================================================

//! mobinet‑preprocess – YUV → ARGB conversion and tile geometry.

use mobinet_camera::PlaneBuffers;
use thiserror::Error;

mod argb;
mod resample;
mod transform;
mod yuv;

pub use argb::{argb, to_rgba, RgbBuffer, Tile};
pub use resample::{resample, Sampling, OUTSIDE};
pub use transform::{CachedTransform, ScaleMode, TransformCache, TransformMatrix};
pub use yuv::{convert_yuv420_to_argb8888, yuv_to_argb, Yuv420Layout};

/// Default classifier tile edge.
pub const TILE_SIZE: u32 = 224;

/// Inconsistent buffers handed to the converter. Never raised for colour
/// overflow: channels saturate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("zero sized image {width}x{height}")]
    ZeroDimension { width: usize, height: usize },
    #[error("{plane} row stride {stride} < {needed}")]
    RowStride { plane: &'static str, stride: usize, needed: usize },
    #[error("chroma pixel stride is 0")]
    PixelStride,
    #[error("{plane} plane holds {len} bytes, {needed} needed")]
    PlaneTooShort { plane: &'static str, len: usize, needed: usize },
    #[error("output holds {len} pixels, {needed} needed")]
    OutputSize { len: usize, needed: usize },
}

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("{len} pixels do not make a {width}x{height} image")]
    Geometry { width: usize, height: usize, len: usize },
    #[error("no frame → tile transform for a {width}x{height} frame")]
    DegenerateTransform { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Convert the planes last ingested into `planes`, resizing `out` to the
/// frame geometry first.
pub fn convert_planes(planes: &PlaneBuffers, out: &mut RgbBuffer) -> std::result::Result<(), ConvertError> {
    let layout = Yuv420Layout {
        width: planes.width() as usize,
        height: planes.height() as usize,
        y_row_stride: planes.y().row_stride(),
        uv_row_stride: planes.u().row_stride(),
        uv_pixel_stride: planes.u().pixel_stride(),
    };
    out.resize(layout.width, layout.height);
    convert_yuv420_to_argb8888(planes.y().bytes(), planes.u().bytes(), planes.v().bytes(), &layout, out.pixels_mut())
}

/// Per‑frame preprocessing state: the full‑size RGB buffer, the output tile
/// and the cached frame → tile transform. All three are reused across frames.
#[derive(Debug)]
pub struct Preprocessor {
    dst_w: u32,
    dst_h: u32,
    mode: ScaleMode,
    sampling: Sampling,
    rgb: RgbBuffer,
    tile: Tile,
    transforms: TransformCache,
}

impl Preprocessor {
    /// Create a pre‑processor that outputs a `dst_w`×`dst_h` ARGB tile.
    pub fn new(dst_w: u32, dst_h: u32) -> Self {
        Self {
            dst_w,
            dst_h,
            mode: ScaleMode::default(),
            sampling: Sampling::default(),
            rgb: RgbBuffer::default(),
            tile: Tile::new(dst_w as usize, dst_h as usize),
            transforms: TransformCache::new(),
        }
    }

    pub fn with_scale_mode(mut self, mode: ScaleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// YUV planes → full resolution ARGB.
    pub fn convert(&mut self, planes: &PlaneBuffers) -> Result<&RgbBuffer> {
        convert_planes(planes, &mut self.rgb)?;
        Ok(&self.rgb)
    }

    /// Map the last converted frame onto the tile.
    pub fn preprocess(&mut self, rotation: i32) -> Result<&Tile> {
        let (w, h) = (self.rgb.width(), self.rgb.height());
        let t = self
            .transforms
            .get(w as u32, h as u32, self.dst_w, self.dst_h, rotation, self.mode)
            .ok_or(PreprocessError::DegenerateTransform { width: w, height: h })?;
        resample(&self.rgb, &t.inverse, &mut self.tile, self.sampling);
        Ok(&self.tile)
    }

    /// `convert` followed by `preprocess`.
    pub fn run(&mut self, planes: &PlaneBuffers, rotation: i32) -> Result<&Tile> {
        self.convert(planes)?;
        self.preprocess(rotation)
    }

    /// Map an already decoded image onto the tile (still‑image path).
    pub fn preprocess_rgb(&mut self, src: &RgbBuffer, rotation: i32) -> Result<&Tile> {
        let (w, h) = (src.width(), src.height());
        let t = self
            .transforms
            .get(w as u32, h as u32, self.dst_w, self.dst_h, rotation, self.mode)
            .ok_or(PreprocessError::DegenerateTransform { width: w, height: h })?;
        resample(src, &t.inverse, &mut self.tile, self.sampling);
        Ok(&self.tile)
    }

    pub fn rgb(&self) -> &RgbBuffer {
        &self.rgb
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    /// How often the frame → tile matrix has been rebuilt.
    pub fn transform_recomputes(&self) -> u64 {
        self.transforms.recomputes()
    }
}
