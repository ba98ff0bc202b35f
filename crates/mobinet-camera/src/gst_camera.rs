// mobinet-camera/src/gst_camera.rs
// ------------------------------------------------------------
// Live capture: libcamerasrc (Pi) or v4l2src (PC webcam) →
// NV12 appsink. Each sample is copied once into a Vec and
// exposed as a 3‑plane Frame (Y + interleaved UV views).
// ------------------------------------------------------------
use crate::{CameraError, Frame, FrameSource, Result};
use gst::prelude::*;
use std::time::Duration;

/// Camera handle – owns the pipeline and *appsink*.
pub struct Camera {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    rotation: i32,
}

impl Camera {
    /// Build and *Playing* a capture pipeline that delivers NV12 frames.
    ///
    /// ```no_run
    /// use mobinet_camera::{Camera, FrameSource};
    /// let mut cam = Camera::new(1280, 720, 30).unwrap();
    /// let frame = cam.next_frame_blocking().unwrap();
    /// println!("{}×{} rot {}", frame.width(), frame.height(), frame.rotation());
    /// ```
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self> {
        gst::init().map_err(CameraError::GstInit)?;

        let src = if gst::ElementFactory::find("libcamerasrc").is_some() {
            // Pi (libcamera) stack
            "libcamerasrc"
        } else {
            // PC webcam
            "v4l2src device=/dev/video0"
        };

        // a single‑slot leaky queue: stale frames are superseded, never buffered
        let pipe_str = format!(
            "{src} ! videoconvert ! video/x-raw,format=NV12,width={w},height={h},framerate={f}/1 \
            ! queue leaky=2 max-size-buffers=1 ! appsink name=sink sync=false",
            src = src, w = width, h = height, f = fps
        );
        log::info!("starting capture: {}", pipe_str);

        let pipeline = gst::parse::launch(&pipe_str)
            .map_err(CameraError::ParsePipeline)?
            .downcast::<gst::Pipeline>()
            .map_err(|_| CameraError::NotPipeline)?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or(CameraError::AppSinkNotFound)?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| CameraError::AppSinkDowncastFailed)?;

        pipeline
            .set_state(gst::State::Playing)
            .map_err(CameraError::StateChange)?;

        Ok(Self { pipeline, appsink, rotation: 0 })
    }

    /// Sensor mounting rotation reported with every frame.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Convert a `gst::Sample` into a [`Frame`].
    fn sample_to_frame(&self, sample: gst::Sample) -> Result<Frame> {
        let buffer = sample.buffer().ok_or(CameraError::MissingBuffer)?;
        let caps   = sample.caps().ok_or(CameraError::MissingCaps)?;
        let s      = caps.structure(0).ok_or(CameraError::MissingStructure)?;
        let width  = s.get::<i32>("width").map_err(|e| CameraError::FieldError(e.to_string()))? as u32;
        let height = s.get::<i32>("height").map_err(|e| CameraError::FieldError(e.to_string()))? as u32;

        // default GstVideoInfo layout for NV12: 4‑byte aligned rows,
        // chroma after an even number of luma rows
        let stride    = (width as usize + 3) & !3;
        let uv_offset = stride * ((height as usize + 1) & !1);

        let pts = buffer
            .pts()
            .map(|t| Duration::from_nanos(t.nseconds()))
            .unwrap_or(Duration::ZERO);

        let map = buffer.map_readable().map_err(|e| CameraError::BufferMap(e.to_string()))?;
        let bytes = map.as_slice().to_vec();   // one memcpy
        drop(map);                             // unmap

        let frame = Frame::from_semi_planar(
            bytes,
            width,
            height,
            stride,
            uv_offset,
            crate::ChromaOrder::Uv,
            self.rotation,
        )?;
        Ok(frame.with_pts(pts))
    }
}

impl FrameSource for Camera {
    /// Blocking retrieval from the appsink.
    fn next_frame_blocking(&mut self) -> Result<Frame> {
        let sample = self
            .appsink
            .pull_sample()
            .map_err(CameraError::PullSample)?;

        self.sample_to_frame(sample)
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
