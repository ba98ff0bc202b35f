// mobinet-camera/src/frame.rs
use crate::{FrameError, PLANE_COUNT};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One colour plane of a capture.
///
/// The bytes stay owned by whoever produced the frame (a mapped driver
/// buffer, a shared NV12 blob, a test vector); dropping the plane hands them
/// back.
pub struct Plane {
    data: Box<dyn AsRef<[u8]> + Send>,
    row_stride: usize,
    pixel_stride: usize,
}

impl Plane {
    pub fn new(data: impl AsRef<[u8]> + Send + 'static, row_stride: usize, pixel_stride: usize) -> Self {
        Self { data: Box::new(data), row_stride, pixel_stride }
    }

    pub fn bytes(&self) -> &[u8] {
        (*self.data).as_ref()
    }

    /// Reported buffer capacity in bytes (may exceed rows × width).
    pub fn capacity(&self) -> usize {
        self.bytes().len()
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }
}

impl fmt::Debug for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plane")
            .field("capacity", &self.capacity())
            .field("row_stride", &self.row_stride)
            .field("pixel_stride", &self.pixel_stride)
            .finish()
    }
}

/// Order of the interleaved chroma bytes in a semi‑planar buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaOrder {
    /// NV12: U first.
    Uv,
    /// NV21: V first (the usual Android preview layout).
    Vu,
}

/// A window into a buffer shared by several planes.
struct SharedSlice {
    buf: Arc<Vec<u8>>,
    start: usize,
    end: usize,
}

impl AsRef<[u8]> for SharedSlice {
    fn as_ref(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }
}

/// A single capture event: geometry, sensor rotation and its planes.
#[derive(Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    rotation: i32,
    pts: Duration,
    planes: Vec<Plane>,
}

impl Frame {
    pub fn new(width: u32, height: u32, rotation: i32, planes: Vec<Plane>) -> Self {
        Self { width, height, rotation, pts: Duration::ZERO, planes }
    }

    /// Attach a capture timestamp.
    pub fn with_pts(mut self, pts: Duration) -> Self {
        self.pts = pts;
        self
    }

    /// Planar 4:2:0 (I420 / YV12 ordered as Y, U, V) inside one buffer.
    ///
    /// `y_row_stride` is the luma row pitch, `uv_row_stride` the pitch of
    /// each chroma plane. The U plane starts right after `height` luma rows
    /// and V right after ⌈height/2⌉ chroma rows.
    pub fn from_i420(
        data: Vec<u8>,
        width: u32,
        height: u32,
        y_row_stride: usize,
        uv_row_stride: usize,
        rotation: i32,
    ) -> Result<Self, FrameError> {
        let h = height as usize;
        let ch = h.div_ceil(2);
        let u_off = y_row_stride * h;
        let v_off = u_off + uv_row_stride * ch;
        let end = v_off + uv_row_stride * ch;
        if data.len() < end {
            return Err(FrameError::malformed(format!(
                "I420 buffer holds {} bytes, layout needs {}",
                data.len(),
                end
            )));
        }

        let buf = Arc::new(data);
        let view = |start: usize, end: usize| SharedSlice { buf: Arc::clone(&buf), start, end };
        let planes = vec![
            Plane::new(view(0, u_off), y_row_stride, 1),
            Plane::new(view(u_off, v_off), uv_row_stride, 1),
            Plane::new(view(v_off, end), uv_row_stride, 1),
        ];
        Ok(Self::new(width, height, rotation, planes))
    }

    /// Semi‑planar 4:2:0 (NV12 / NV21) inside one buffer.
    ///
    /// Both chroma planes are views over the same interleaved rows with a
    /// pixel stride of 2, exactly how Android exposes `YUV_420_888` on NV21
    /// hardware.
    pub fn from_semi_planar(
        data: Vec<u8>,
        width: u32,
        height: u32,
        row_stride: usize,
        uv_offset: usize,
        order: ChromaOrder,
        rotation: i32,
    ) -> Result<Self, FrameError> {
        let ch = (height as usize).div_ceil(2);
        let end = uv_offset + row_stride * ch;
        if data.len() < end || uv_offset < row_stride * height as usize {
            return Err(FrameError::malformed(format!(
                "semi-planar buffer holds {} bytes with chroma at {}, layout needs {}",
                data.len(),
                uv_offset,
                end
            )));
        }

        let buf = Arc::new(data);
        let view = |start: usize, end: usize| SharedSlice { buf: Arc::clone(&buf), start, end };
        let (u_start, v_start) = match order {
            ChromaOrder::Uv => (uv_offset, uv_offset + 1),
            ChromaOrder::Vu => (uv_offset + 1, uv_offset),
        };
        let planes = vec![
            Plane::new(view(0, uv_offset), row_stride, 1),
            Plane::new(view(u_start, end), row_stride, 2),
            Plane::new(view(v_start, end), row_stride, 2),
        ];
        Ok(Self::new(width, height, rotation, planes))
    }

    pub fn from_nv12(data: Vec<u8>, width: u32, height: u32, row_stride: usize, rotation: i32) -> Result<Self, FrameError> {
        let uv_offset = row_stride * height as usize;
        Self::from_semi_planar(data, width, height, row_stride, uv_offset, ChromaOrder::Uv, rotation)
    }

    pub fn from_nv21(data: Vec<u8>, width: u32, height: u32, row_stride: usize, rotation: i32) -> Result<Self, FrameError> {
        let uv_offset = row_stride * height as usize;
        Self::from_semi_planar(data, width, height, row_stride, uv_offset, ChromaOrder::Vu, rotation)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sensor rotation in degrees.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn pts(&self) -> Duration {
        self.pts
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Check plane count and stride metadata against the frame geometry.
    ///
    /// Chroma planes are addressed at ⌊x/2⌋, ⌊y/2⌋, so they must hold
    /// ⌈width/2⌉ × ⌈height/2⌉ samples at their own strides. U and V share
    /// one stride pair.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.planes.len() != PLANE_COUNT {
            return Err(FrameError::malformed(format!(
                "expected {} planes, got {}",
                PLANE_COUNT,
                self.planes.len()
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::malformed(format!("empty frame {}x{}", self.width, self.height)));
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let y = &self.planes[0];
        if y.pixel_stride != 1 {
            return Err(FrameError::malformed(format!("luma pixel stride {} != 1", y.pixel_stride)));
        }
        if y.row_stride < w {
            return Err(FrameError::malformed(format!("luma row stride {} < width {}", y.row_stride, w)));
        }
        let y_needed = (h - 1) * y.row_stride + w;
        if y.capacity() < y_needed {
            return Err(FrameError::malformed(format!(
                "plane 0 holds {} bytes, needs {}",
                y.capacity(),
                y_needed
            )));
        }

        let (u, v) = (&self.planes[1], &self.planes[2]);
        if u.row_stride != v.row_stride || u.pixel_stride != v.pixel_stride {
            return Err(FrameError::malformed("U and V planes disagree on strides"));
        }
        if u.pixel_stride == 0 {
            return Err(FrameError::malformed("chroma pixel stride is 0"));
        }
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        let row_span = (cw - 1) * u.pixel_stride + 1;
        if u.row_stride < row_span {
            return Err(FrameError::malformed(format!(
                "chroma row stride {} < {} bytes per row",
                u.row_stride, row_span
            )));
        }
        let uv_needed = (ch - 1) * u.row_stride + row_span;
        for (i, plane) in [(1, u), (2, v)] {
            if plane.capacity() < uv_needed {
                return Err(FrameError::malformed(format!(
                    "plane {} holds {} bytes, needs {}",
                    i,
                    plane.capacity(),
                    uv_needed
                )));
            }
        }
        Ok(())
    }

    /// Hand the plane storage back to its producer.
    pub fn release(self) {
        log::trace!("releasing frame {}x{} @ {:?}", self.width, self.height, self.pts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i420_views_cover_each_plane() {
        // 4x2 frame, luma padded to 6, chroma to 3
        let data: Vec<u8> = (0..(6 * 2 + 3 + 3) as u8).collect();
        let frame = Frame::from_i420(data, 4, 2, 6, 3, 90).unwrap();
        let p = frame.planes();
        assert_eq!(p[0].bytes().len(), 12);
        assert_eq!(p[1].bytes(), &[12, 13, 14]);
        assert_eq!(p[2].bytes(), &[15, 16, 17]);
        assert_eq!(frame.rotation(), 90);
        frame.validate().unwrap();
    }

    #[test]
    fn nv21_puts_v_first() {
        let mut data = vec![0u8; 4 * 2 + 4];
        data[8..].copy_from_slice(&[200, 100, 201, 101]); // V U V U
        let frame = Frame::from_nv21(data, 4, 2, 4, 0).unwrap();
        assert_eq!(frame.planes()[1].bytes()[0], 100);
        assert_eq!(frame.planes()[2].bytes()[0], 200);
        assert_eq!(frame.planes()[1].pixel_stride(), 2);
        frame.validate().unwrap();
    }

    #[test]
    fn short_buffer_is_malformed() {
        let err = Frame::from_nv12(vec![0; 10], 4, 4, 4, 0).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFrame(_)));
    }

    #[test]
    fn two_planes_rejected() {
        let planes = vec![Plane::new(vec![0u8; 4], 2, 1), Plane::new(vec![0u8; 1], 1, 1)];
        let frame = Frame::new(2, 2, 0, planes);
        assert!(matches!(frame.validate(), Err(FrameError::MalformedFrame(_))));
    }

    #[test]
    fn stride_below_width_rejected() {
        let planes = vec![
            Plane::new(vec![0u8; 16], 3, 1),
            Plane::new(vec![0u8; 4], 2, 1),
            Plane::new(vec![0u8; 4], 2, 1),
        ];
        let frame = Frame::new(4, 4, 0, planes);
        let err = frame.validate().unwrap_err();
        assert!(err.to_string().contains("row stride 3 < width 4"));
    }

    #[test]
    fn odd_dimensions_need_ceil_chroma() {
        // 5x3 → chroma 3x2
        let planes = vec![
            Plane::new(vec![0u8; 15], 5, 1),
            Plane::new(vec![0u8; 5], 3, 1),
            Plane::new(vec![0u8; 6], 3, 1),
        ];
        let frame = Frame::new(5, 3, 0, planes);
        let err = frame.validate().unwrap_err();
        assert!(err.to_string().contains("plane 1"));
    }
}
