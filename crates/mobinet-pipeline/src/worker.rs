// mobinet-pipeline/src/worker.rs
use crate::{BusyGuard, Outcome, PipelineConfig};
use log::{debug, info, warn};
use mobinet_camera::PlaneBuffers;
use mobinet_classify::{Classification, Classifier};
use mobinet_preprocess::{Preprocessor, Tile};
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;

pub(crate) struct Job {
    pub index: u64,
    pub pts: Duration,
    /// Tile rotation, orientation offset already applied
    pub rotation: i32,
    pub buffers: PlaneBuffers,
}

// Field order matters: `jobs` must drop before `outcomes` so a consumer that
// sees the outcome stream end can rely on submissions failing.
pub(crate) struct Worker<C> {
    config: PipelineConfig,
    pre: Preprocessor,
    classifier: C,
    busy: Arc<AtomicBool>,
    jobs: mpsc::Receiver<Job>,
    recycle: mpsc::Sender<PlaneBuffers>,
    outcomes: tokio::sync::mpsc::Sender<Outcome>,
}

impl<C: Classifier> Worker<C> {
    pub fn new(
        config: PipelineConfig,
        classifier: C,
        busy: Arc<AtomicBool>,
        jobs: mpsc::Receiver<Job>,
        recycle: mpsc::Sender<PlaneBuffers>,
        outcomes: tokio::sync::mpsc::Sender<Outcome>,
    ) -> Self {
        let pre = Preprocessor::new(config.crop_size, config.crop_size)
            .with_scale_mode(config.scale_mode)
            .with_sampling(config.sampling);
        Self { config, pre, classifier, busy, jobs, recycle, outcomes }
    }

    pub fn run(mut self) {
        let busy = Arc::clone(&self.busy);
        while let Ok(job) = self.jobs.recv() {
            let index = job.index;
            let pts = job.pts;
            let start = Instant::now();
            let classification = {
                let _busy = BusyGuard(&busy);
                self.process(job)
            };
            let outcome = Outcome { index, pts, classification, elapsed: start.elapsed() };

            match self.outcomes.try_send(outcome) {
                Ok(()) => {}
                Err(TrySendError::Full(o)) => debug!("Outcome queue full, dropping outcome {}", o.index),
                Err(TrySendError::Closed(_)) => debug!("Outcome consumer gone"),
            }
        }
        info!("Inference worker stopped");
    }

    fn process(&mut self, job: Job) -> Option<Classification> {
        let converted = self.pre.convert(&job.buffers).map(|_| ());
        // the driver may already be gone; the buffers are simply dropped then
        let _ = self.recycle.send(job.buffers);

        let tile = match converted.and_then(|()| self.pre.preprocess(job.rotation)) {
            Ok(tile) => tile,
            Err(e) => {
                warn!("Frame {} preprocessing failed: {}", job.index, e);
                return None;
            }
        };

        if self.config.save_preview {
            save_preview(tile, &self.config);
        }

        match self.classifier.infer(tile) {
            Ok(c) => {
                debug!("Frame {}: {}", job.index, c);
                Some(c)
            }
            Err(e) => {
                warn!("Frame {} classification failed: {}", job.index, e);
                None
            }
        }
    }
}

fn save_preview(tile: &Tile, config: &PipelineConfig) {
    if let Err(e) = std::fs::create_dir_all(&config.preview_dir) {
        warn!("Failed to create {:?}: {}", config.preview_dir, e);
        return;
    }
    if let Err(e) = tile.save_png(config.preview_path()) {
        warn!("Failed to save preview tile: {}", e);
    }
}
