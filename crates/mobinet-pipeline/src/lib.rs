// mobinet-pipeline/src/lib.rs
// ============================================================
// mobinet-pipeline  –  frame admission + inference worker
// Accepts camera frames on the driver thread, drops them while
// an inference is in flight and classifies the rest on a single
// background thread.
// ------------------------------------------------------------
// Flow: Frame → PlaneBuffers → RgbBuffer → Tile → Classification
// ------------------------------------------------------------
// Public API
//   * Pipeline::spawn(config, classifier) – start the worker
//   * PipelineHandle::submit(frame)       – busy-drop admission
//   * OutcomeStream                       – results as a Stream
// ============================================================

//! mobinet – pipeline layer
//!
//! At most one frame is in flight. A frame arriving while the worker is busy
//! is released straight back to the driver without touching any buffer.
//! Otherwise its planes are copied into the circulating [`PlaneBuffers`] on
//! the driver thread, the frame is released, and the copy moves to the
//! worker. The worker hands the buffers back as soon as conversion is done,
//! then preprocesses, classifies and publishes an [`Outcome`].

use log::{debug, info, trace, warn};
use mobinet_camera::{Frame, FrameError, PlaneBuffers};
use mobinet_classify::{Classification, Classifier};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tokio_stream::wrappers::ReceiverStream;

mod config;
mod worker;

pub use config::PipelineConfig;

use worker::{Job, Worker};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Failed to spawn inference thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Inference thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// What happened to a submitted frame. The frame itself has always been
/// released by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Queued for inference with this sequence number.
    Accepted(u64),
    /// An inference was already running; the frame was dropped.
    Busy,
    /// The frame's planes were inconsistent.
    Rejected(FrameError),
    /// The worker is gone.
    Closed,
}

/// Result of one accepted frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub index: u64,
    pub pts: Duration,
    /// `None` when conversion or the classifier failed (already logged).
    pub classification: Option<Classification>,
    /// Convert + preprocess + infer wall time.
    pub elapsed: Duration,
}

pub type OutcomeStream = ReceiverStream<Outcome>;

/// Clears the busy flag when dropped, including during unwinding.
pub(crate) struct BusyGuard<'a>(pub(crate) &'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Start the `"inference"` worker thread.
    pub fn spawn<C>(config: PipelineConfig, classifier: C) -> Result<(PipelineHandle, OutcomeStream)>
    where
        C: Classifier + 'static,
    {
        config.validate()?;
        info!("Starting inference worker: {}", classifier.describe());

        let busy = Arc::new(AtomicBool::new(false));
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (recycle_tx, recycle_rx) = mpsc::channel::<PlaneBuffers>();
        let (outcome_tx, outcome_rx) = tokio::sync::mpsc::channel(config.outcome_depth);

        let worker = Worker::new(config.clone(), classifier, Arc::clone(&busy), job_rx, recycle_tx, outcome_tx);
        let thread = thread::Builder::new()
            .name("inference".into())
            .spawn(move || worker.run())
            .map_err(PipelineError::Spawn)?;

        let handle = PipelineHandle {
            config,
            busy,
            buffers: Some(PlaneBuffers::new()),
            recycle: recycle_rx,
            jobs: Some(job_tx),
            thread: Some(thread),
            next_index: 0,
            dropped: 0,
        };
        Ok((handle, ReceiverStream::new(outcome_rx)))
    }
}

/// Driver-side end of the pipeline. Lives on the camera callback thread.
pub struct PipelineHandle {
    config: PipelineConfig,
    busy: Arc<AtomicBool>,
    /// Present while idle; otherwise on its way back through `recycle`.
    buffers: Option<PlaneBuffers>,
    recycle: mpsc::Receiver<PlaneBuffers>,
    jobs: Option<mpsc::Sender<Job>>,
    thread: Option<JoinHandle<()>>,
    next_index: u64,
    dropped: u64,
}

impl PipelineHandle {
    /// Admit or drop `frame`. Never blocks on the worker.
    pub fn submit(&mut self, frame: Frame) -> Admission {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.dropped += 1;
            trace!("busy, dropping frame ({} dropped)", self.dropped);
            frame.release();
            return Admission::Busy;
        }
        let flag = Arc::clone(&self.busy);
        let guard = BusyGuard(&flag);

        let Some(mut buffers) = self.take_buffers() else {
            frame.release();
            return Admission::Closed;
        };

        if let Err(e) = buffers.ingest(&frame) {
            warn!("Rejected frame: {}", e);
            frame.release();
            self.buffers = Some(buffers);
            return Admission::Rejected(e);
        }

        let job = Job {
            index: self.next_index,
            pts: frame.pts(),
            rotation: self.config.tile_rotation(frame.rotation()),
            buffers,
        };
        frame.release();

        let Some(jobs) = &self.jobs else {
            self.buffers = Some(job.buffers);
            return Admission::Closed;
        };
        match jobs.send(job) {
            Ok(()) => {
                // the worker owns the flag from here on
                std::mem::forget(guard);
                let index = self.next_index;
                self.next_index += 1;
                Admission::Accepted(index)
            }
            Err(mpsc::SendError(job)) => {
                warn!("Inference worker has stopped");
                self.buffers = Some(job.buffers);
                self.jobs = None;
                Admission::Closed
            }
        }
    }

    fn take_buffers(&mut self) -> Option<PlaneBuffers> {
        if let Some(b) = self.buffers.take() {
            return Some(b);
        }
        match self.recycle.try_recv() {
            Ok(b) => Some(b),
            Err(mpsc::TryRecvError::Empty) => {
                warn!("Plane buffers not returned by worker, allocating new ones");
                Some(PlaneBuffers::new())
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                debug!("Recycle channel closed");
                None
            }
        }
    }

    /// `true` while an inference is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Frames released unprocessed because the worker was busy.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Frames accepted so far.
    pub fn accepted_frames(&self) -> u64 {
        self.next_index
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stop accepting frames and wait for the worker to finish its last job.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        self.jobs = None;
        match self.thread.take() {
            Some(t) => t.join().map_err(|_| PipelineError::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("{}", e);
        }
    }
}
