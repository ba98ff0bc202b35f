// mobinet-camera/src/ingest.rs
use crate::{Frame, FrameError, PLANE_COUNT};
use log::debug;

/// Owned copy of one plane plus the stride metadata it was captured with.
#[derive(Debug, Clone, Default)]
pub struct OwnedPlane {
    data: Vec<u8>,
    row_stride: usize,
    pixel_stride: usize,
}

impl OwnedPlane {
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }
}

/// Stable storage for the Y, U and V planes of the most recent frame.
///
/// Because of the variable row stride the required size of each plane is
/// only known once a frame has been seen, so buffers are sized to the
/// plane capacity on first use and reused for as long as it stays the same.
#[derive(Debug, Default)]
pub struct PlaneBuffers {
    planes: [OwnedPlane; PLANE_COUNT],
    width: u32,
    height: u32,
    allocations: usize,
}

impl PlaneBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy a frame's planes into the owned buffers.
    ///
    /// Nothing is touched if the frame is malformed. No reference into the
    /// frame survives this call, so the caller may release it right after.
    pub fn ingest(&mut self, frame: &Frame) -> Result<(), FrameError> {
        frame.validate()?;

        for (i, (owned, plane)) in self.planes.iter_mut().zip(frame.planes()).enumerate() {
            let src = plane.bytes();
            if owned.data.len() != src.len() {
                debug!("Initializing buffer {} at size {}", i, src.len());
                owned.data = vec![0; src.len()];
                self.allocations += 1;
            }
            owned.data.copy_from_slice(src);
            owned.row_stride = plane.row_stride();
            owned.pixel_stride = plane.pixel_stride();
        }
        self.width = frame.width();
        self.height = frame.height();
        Ok(())
    }

    pub fn y(&self) -> &OwnedPlane {
        &self.planes[0]
    }

    pub fn u(&self) -> &OwnedPlane {
        &self.planes[1]
    }

    pub fn v(&self) -> &OwnedPlane {
        &self.planes[2]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// How many plane buffers have been (re)allocated so far.
    pub fn allocations(&self) -> usize {
        self.allocations
    }
}
