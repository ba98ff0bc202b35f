// mobinet-camera/src/source.rs
use crate::{CameraError, ChromaOrder, Frame, Result};
use std::time::Duration;

/// Anything that can block until the next frame is ready.
///
/// Implemented by the GStreamer `Camera` (feature `gst`) and by
/// [`SyntheticSource`] for tests and headless runs.
pub trait FrameSource: Send + 'static {
    fn next_frame_blocking(&mut self) -> Result<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame_blocking(&mut self) -> Result<Frame> {
        (**self).next_frame_blocking()
    }
}

/// Deterministic test‑pattern producer.
///
/// Emits a diagonal luma gradient that shifts by one step per frame over a
/// horizontal chroma ramp, optionally with padded rows, in either planar
/// (I420) or semi‑planar (NV21) layout.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    rotation: i32,
    row_padding: usize,
    semi_planar: bool,
    frame_interval: Duration,
    limit: Option<u64>,
    produced: u64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rotation: 0,
            row_padding: 0,
            semi_planar: false,
            frame_interval: Duration::from_millis(33),
            limit: None,
            produced: 0,
        }
    }

    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Extra bytes appended to every row of every plane.
    pub fn with_row_padding(mut self, padding: usize) -> Self {
        self.row_padding = padding;
        self
    }

    /// Produce NV21 frames instead of I420.
    pub fn semi_planar(mut self, enabled: bool) -> Self {
        self.semi_planar = enabled;
        self
    }

    /// Timestamp step between frames. Production itself never sleeps.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Stop with [`CameraError::EndOfStream`] after `frames` frames.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    fn luma(&self, x: usize, y: usize) -> u8 {
        ((x + y + self.produced as usize) & 0xff) as u8
    }

    fn chroma(&self, cx: usize, cw: usize) -> (u8, u8) {
        let ramp = (cx * 255 / cw.max(1)) as u8;
        (ramp, 255 - ramp)
    }

    fn render(&self) -> std::result::Result<Frame, crate::FrameError> {
        let (w, h) = (self.width as usize, self.height as usize);
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));

        if self.semi_planar {
            let stride = 2 * cw + self.row_padding;
            let mut data = vec![0u8; stride * h + stride * ch];
            for y in 0..h {
                for x in 0..w {
                    data[y * stride + x] = self.luma(x, y);
                }
            }
            let uv = stride * h;
            for cy in 0..ch {
                for cx in 0..cw {
                    let (u, v) = self.chroma(cx, cw);
                    data[uv + cy * stride + 2 * cx] = v;
                    data[uv + cy * stride + 2 * cx + 1] = u;
                }
            }
            return Frame::from_semi_planar(data, self.width, self.height, stride, uv, ChromaOrder::Vu, self.rotation);
        }

        let ys = w + self.row_padding;
        let cs = cw + self.row_padding;
        let mut data = vec![0u8; ys * h + 2 * cs * ch];
        for y in 0..h {
            for x in 0..w {
                data[y * ys + x] = self.luma(x, y);
            }
        }
        let (u_off, v_off) = (ys * h, ys * h + cs * ch);
        for cy in 0..ch {
            for cx in 0..cw {
                let (u, v) = self.chroma(cx, cw);
                data[u_off + cy * cs + cx] = u;
                data[v_off + cy * cs + cx] = v;
            }
        }
        Frame::from_i420(data, self.width, self.height, ys, cs, self.rotation)
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame_blocking(&mut self) -> Result<Frame> {
        if self.limit.is_some_and(|limit| self.produced >= limit) {
            return Err(CameraError::EndOfStream);
        }
        let pts = self.frame_interval * self.produced as u32;
        let frame = self.render()?.with_pts(pts);
        self.produced += 1;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaneBuffers;

    #[test]
    fn padded_and_packed_frames_carry_same_pixels() {
        let mut packed = SyntheticSource::new(7, 5);
        let mut padded = SyntheticSource::new(7, 5).with_row_padding(9);

        let a = packed.next_frame_blocking().unwrap();
        let b = padded.next_frame_blocking().unwrap();
        assert_eq!(b.planes()[0].row_stride(), 16);

        let (mut ba, mut bb) = (PlaneBuffers::new(), PlaneBuffers::new());
        ba.ingest(&a).unwrap();
        bb.ingest(&b).unwrap();
        for y in 0..5 {
            let ra = &ba.y().bytes()[y * 7..y * 7 + 7];
            let rb = &bb.y().bytes()[y * 16..y * 16 + 7];
            assert_eq!(ra, rb);
        }
    }

    #[test]
    fn limit_ends_stream() {
        let mut src = SyntheticSource::new(4, 4).with_limit(2);
        assert!(src.next_frame_blocking().is_ok());
        let second = src.next_frame_blocking().unwrap();
        assert_eq!(second.pts(), Duration::from_millis(33));
        assert!(matches!(src.next_frame_blocking(), Err(CameraError::EndOfStream)));
    }

    #[test]
    fn nv21_frames_validate() {
        let mut src = SyntheticSource::new(9, 3).semi_planar(true).with_row_padding(2);
        let frame = src.next_frame_blocking().unwrap();
        frame.validate().unwrap();
        assert_eq!(frame.planes()[2].pixel_stride(), 2);
    }
}
