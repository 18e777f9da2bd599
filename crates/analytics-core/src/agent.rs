//! Per-camera facade between the host's frame callback and its metadata
//! sink.

use crate::config::AgentConfig;
use crate::convert::convert_frame_to_bgr;
use crate::frame::FrameJob;
use crate::queue::DropOldestQueue;
use crate::sampler::FrameSampler;
use crate::worker::Worker;
use anyhow::{Context, Result};
use common::{DiagnosticLevel, DiagnosticSink, MetadataPacket, VideoFrame};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use telemetry::LogThrottle;
use tracing::{debug, error, info};

/// One instance per camera. Owns the frame queue and the dedicated worker
/// thread from construction to drop; the host's ingress thread only ever
/// samples, converts and enqueues, so it never blocks on inference.
pub struct DeviceAgent {
    camera_id: String,
    queue: Arc<DropOldestQueue<FrameJob>>,
    outbox: Arc<Mutex<VecDeque<MetadataPacket>>>,
    diagnostics: Arc<dyn DiagnosticSink>,
    sampler: Mutex<FrameSampler>,
    ingress_throttle: Mutex<LogThrottle>,
    worker: Option<JoinHandle<()>>,
}

impl DeviceAgent {
    pub fn new(
        camera_id: impl Into<String>,
        config: AgentConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let camera_id = camera_id.into();
        let queue = Arc::new(DropOldestQueue::new(config.max_queue_size));
        let outbox = Arc::new(Mutex::new(VecDeque::new()));
        let mut worker = Worker::new(camera_id.as_str(), &config)?;

        let handle = {
            let queue = Arc::clone(&queue);
            let outbox = Arc::clone(&outbox);
            let camera = camera_id.clone();
            std::thread::Builder::new()
                .name(format!("analytics-{}", camera))
                .spawn(move || {
                    while let Some(job) = queue.pop() {
                        let packets = worker.process_job(job);
                        if !packets.is_empty() {
                            outbox.lock().unwrap().extend(packets);
                        }
                    }
                    debug!(camera = %camera, "worker stopped");
                })
                .context("failed to spawn the analytics worker thread")?
        };

        info!(camera = %camera_id, sample_fps = config.sample_fps, "device agent started");

        Ok(Self {
            sampler: Mutex::new(FrameSampler::new(config.sample_fps)),
            ingress_throttle: Mutex::new(LogThrottle::from_millis(config.log_throttle_ms)),
            camera_id,
            queue,
            outbox,
            diagnostics,
            worker: Some(handle),
        })
    }

    /// Host frame callback. Bounded wall-clock: sampling, pixel conversion
    /// and a non-blocking enqueue; no I/O. Malformed frames are dropped
    /// with a throttled warning diagnostic.
    pub fn push_frame(&self, frame: &dyn VideoFrame) {
        let timestamp_us = frame.timestamp_us();
        if !self.sampler.lock().unwrap().accept(timestamp_us) {
            return;
        }
        telemetry::metrics::FRAMES_SAMPLED
            .with_label_values(&[&self.camera_id])
            .inc();

        let bgr = match convert_frame_to_bgr(frame) {
            Ok(bgr) => bgr,
            Err(reason) => {
                self.warn_throttled("frame dropped", &format!("{:#}", reason));
                return;
            }
        };

        let job = FrameJob {
            timestamp_us,
            frame: bgr,
        };
        if self.queue.push(job) {
            telemetry::metrics::FRAMES_DROPPED
                .with_label_values(&[&self.camera_id])
                .inc();
            self.warn_throttled(
                "frame queue overflow",
                "dropped the oldest queued frame to keep up with ingress",
            );
        }
    }

    /// Drain every packet the worker has produced so far. The host polls
    /// this from its metadata pump.
    pub fn pull_metadata(&self) -> Vec<MetadataPacket> {
        self.outbox.lock().unwrap().drain(..).collect()
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    fn warn_throttled(&self, caption: &str, description: &str) {
        if self.ingress_throttle.lock().unwrap().allow() {
            self.diagnostics
                .emit(DiagnosticLevel::Warning, caption, description);
        }
    }
}

impl Drop for DeviceAgent {
    fn drop(&mut self) {
        self.queue.stop();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!(camera = %self.camera_id, "worker thread panicked");
            }
        }
    }
}
