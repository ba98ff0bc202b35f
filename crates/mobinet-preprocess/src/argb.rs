// mobinet-preprocess/src/argb.rs
use crate::PreprocessError;
use image::RgbaImage;
use std::path::Path;

#[inline]
pub fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Split an ARGB word into `[r, g, b, a]` bytes.
#[inline]
pub fn to_rgba(p: u32) -> [u8; 4] {
    [(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8]
}

fn to_image(width: usize, height: usize, pixels: &[u32]) -> RgbaImage {
    let bytes: Vec<u8> = pixels.iter().flat_map(|&p| to_rgba(p)).collect();
    // length is width*height*4 by construction
    RgbaImage::from_raw(width as u32, height as u32, bytes).unwrap_or_else(|| RgbaImage::new(width as u32, height as u32))
}

/// Full‑resolution ARGB8888 frame, row‑major, reused across frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RgbBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl RgbBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0; width * height] }
    }

    /// Change the geometry, keeping the allocation when it is big enough.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (self.width, self.height) != (width, height) {
            log::debug!("RGB buffer {}x{} -> {}x{}", self.width, self.height, width, height);
            self.width = width;
            self.height = height;
            self.pixels.resize(width * height, 0);
        }
    }

    /// Wrap already converted pixels (e.g. a decoded still image).
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self, PreprocessError> {
        if pixels.len() != width * height {
            return Err(PreprocessError::Geometry { width, height, len: pixels.len() });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let pixels = img.pixels().map(|p| argb(p.0[3], p.0[0], p.0[1], p.0[2])).collect();
        Self { width: img.width() as usize, height: img.height() as usize, pixels }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        to_image(self.width, self.height, &self.pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Caller guarantees `x < width`, `y < height`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

/// Fixed‑size ARGB classifier input, overwritten every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Tile {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0; width * height] }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self, PreprocessError> {
        if pixels.len() != width * height {
            return Err(PreprocessError::Geometry { width, height, len: pixels.len() });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        to_image(self.width, self.height, &self.pixels)
    }

    /// Write the tile as an image; the format follows the file extension.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), PreprocessError> {
        self.to_rgba_image().save(path.as_ref())?;
        Ok(())
    }
}
