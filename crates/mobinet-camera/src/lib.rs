// mobinet-camera/src/lib.rs
// ============================================================
// Camera frame layer for mobinet
// Models a YUV 4:2:0 capture as three row‑strided planes and
// copies them out of driver‑owned storage before release.
// ------------------------------------------------------------
// Public API:
//   * Frame / Plane           – one capture event, 3 planes
//   * PlaneBuffers::ingest()  – copy planes into owned buffers
//   * FrameSource             – blocking producer of frames
//   * frame_stream()          – async stream of Frame
// ------------------------------------------------------------
// Build notes
//   * `--features gst` adds a GStreamer NV12 capture source.
// ============================================================

//! mobinet – camera frame layer
//!
//! A [`Frame`] is whatever the camera driver hands us: width, height,
//! sensor rotation and three planes (Y, U, V) whose row stride and pixel
//! stride are device dependent. Plane storage belongs to the driver and is
//! returned to it when the frame is dropped, so everything downstream works
//! on a [`PlaneBuffers`] copy filled by [`PlaneBuffers::ingest`].

use thiserror::Error;

mod frame;
mod ingest;
mod source;
mod stream;

#[cfg(feature = "gst")]
mod gst_camera;

pub use frame::{ChromaOrder, Frame, Plane};
pub use ingest::{OwnedPlane, PlaneBuffers};
pub use source::{FrameSource, SyntheticSource};
pub use stream::frame_stream;

#[cfg(feature = "gst")]
pub use gst_camera::Camera;

/// Number of planes in a YUV 4:2:0 frame.
pub const PLANE_COUNT: usize = 3;

/// Problems with the shape of a frame handed to us by a driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl FrameError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        FrameError::MalformedFrame(reason.into())
    }
}

/// Errors raised by frame sources.
#[derive(Error, Debug)]
pub enum CameraError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("Frame source exhausted")]
    EndOfStream,
    #[cfg(feature = "gst")]
    #[error("GStreamer init failed: {0}")]
    GstInit(#[source] gst::glib::Error),
    #[cfg(feature = "gst")]
    #[error("Failed to parse pipeline: {0}")]
    ParsePipeline(#[source] gst::glib::Error),
    #[cfg(feature = "gst")]
    #[error("Pipeline is not a gst::Pipeline")]
    NotPipeline,
    #[cfg(feature = "gst")]
    #[error("AppSink element not found")]
    AppSinkNotFound,
    #[cfg(feature = "gst")]
    #[error("AppSink element downcast failed")]
    AppSinkDowncastFailed,
    #[cfg(feature = "gst")]
    #[error("Failed to set pipeline to Playing: {0}")]
    StateChange(#[source] gst::StateChangeError),
    #[cfg(feature = "gst")]
    #[error("Failed to pull sample: {0}")]
    PullSample(#[source] gst::glib::BoolError),
    #[cfg(feature = "gst")]
    #[error("Sample has no buffer")]
    MissingBuffer,
    #[cfg(feature = "gst")]
    #[error("Sample has no caps")]
    MissingCaps,
    #[cfg(feature = "gst")]
    #[error("Caps missing struct")]
    MissingStructure,
    #[cfg(feature = "gst")]
    #[error("Failed to get field value: {0}")]
    FieldError(String),
    #[cfg(feature = "gst")]
    #[error("Buffer map failed: {0}")]
    BufferMap(String),
}

pub type Result<T> = std::result::Result<T, CameraError>;
