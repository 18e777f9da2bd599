//! Per-frame processing pipeline, driven by the worker thread.

use crate::config::AgentConfig;
use crate::detector::DetectorClient;
use crate::falls::{FallStateMachine, FallTransition, FallTransitionKind};
use crate::frame::FrameJob;
use crate::tracker::TrackRegistry;
use anyhow::Result;
use common::{
    Attribute, Detection, EventMetadata, EventMetadataPacket, MetadataPacket, ObjectMetadata,
    ObjectMetadataPacket, Rect,
};
use tracing::debug;

/// Object type id for detections classified as a person.
pub const PERSON_OBJECT_TYPE: &str = "vigil.analytics.person";
/// Object type id for any other detection class.
pub const GENERIC_OBJECT_TYPE: &str = "vigil.analytics.object";
/// Event type id for state-dependent fall episodes.
pub const FALL_EVENT_TYPE: &str = "vigil.analytics.fallDetected";

/// Drives one frame at a time through detection, track resolution and
/// fall-event evaluation.
///
/// Owned exclusively by the worker thread, so none of the contained state
/// needs locking. Emission uses the ingestion frame's timestamp, keeping
/// packets aligned with the host timeline.
pub struct Worker {
    camera_id: String,
    detector: DetectorClient,
    tracks: TrackRegistry,
    falls: FallStateMachine,
}

impl Worker {
    pub fn new(camera_id: impl Into<String>, config: &AgentConfig) -> Result<Self> {
        Ok(Self {
            camera_id: camera_id.into(),
            detector: DetectorClient::new(config.detector.clone())?,
            tracks: TrackRegistry::new(config.synthetic_track_ttl_us, config.track_map_ttl_us),
            falls: FallStateMachine::new(config.fall_finish_grace_us),
        })
    }

    /// Process one dequeued job and return the packets to hand to the
    /// host, in emission order (objects before events).
    pub fn process_job(&mut self, job: FrameJob) -> Vec<MetadataPacket> {
        let mut detections = self.detector.run(&self.camera_id, &job.frame);
        self.tracks.resolve(&mut detections, job.timestamp_us);

        let mut packets = Vec::new();

        if let Some(packet) = make_object_packet(&detections, job.timestamp_us) {
            telemetry::metrics::DETECTIONS_EMITTED
                .with_label_values(&[&self.camera_id])
                .inc_by(packet.items.len() as u64);
            packets.push(MetadataPacket::Object(packet));
        }

        for transition in self.falls.observe(&detections, job.timestamp_us) {
            telemetry::metrics::FALL_EVENTS
                .with_label_values(&[&self.camera_id, transition_label(transition.kind)])
                .inc();
            packets.push(MetadataPacket::Event(make_fall_event_packet(
                &transition,
                job.timestamp_us,
            )));
        }

        self.tracks.cleanup(job.timestamp_us);

        telemetry::metrics::FRAMES_PROCESSED
            .with_label_values(&[&self.camera_id])
            .inc();
        debug!(
            camera = %self.camera_id,
            timestamp_us = job.timestamp_us,
            detections = detections.len(),
            packets = packets.len(),
            "processed frame"
        );

        packets
    }
}

fn transition_label(kind: FallTransitionKind) -> &'static str {
    match kind {
        FallTransitionKind::Started => "started",
        FallTransitionKind::Finished => "finished",
    }
}

/// Build the object packet for a frame, or `None` when no detection
/// survives clamping.
fn make_object_packet(detections: &[Detection], timestamp_us: i64) -> Option<ObjectMetadataPacket> {
    let mut items = Vec::new();
    for detection in detections {
        let bbox = detection.bbox;
        let x = clamp01(bbox.x);
        let y = clamp01(bbox.y);
        let mut w = clamp01(bbox.width);
        let mut h = clamp01(bbox.height);
        if x + w > 1.0 {
            w = (1.0 - x).max(0.0);
        }
        if y + h > 1.0 {
            h = (1.0 - y).max(0.0);
        }
        if w <= 0.0 || h <= 0.0 {
            continue;
        }

        let type_id = if detection.class_label == "person" {
            PERSON_OBJECT_TYPE
        } else {
            GENERIC_OBJECT_TYPE
        };

        items.push(ObjectMetadata {
            type_id: type_id.to_string(),
            track_id: detection.track_id,
            bbox: Rect::new(x, y, w, h),
            confidence: detection.confidence,
            attributes: vec![
                Attribute::string("classLabel", detection.class_label.as_str()),
                Attribute::number("confidence", detection.confidence.to_string()),
                Attribute::number("fallDetected", if detection.fall_detected { "1" } else { "0" }),
            ],
        });
    }

    if items.is_empty() {
        return None;
    }
    Some(ObjectMetadataPacket {
        timestamp_us,
        items,
    })
}

fn make_fall_event_packet(transition: &FallTransition, timestamp_us: i64) -> EventMetadataPacket {
    let (caption, phrase, is_active) = match transition.kind {
        FallTransitionKind::Started => ("Fall detected STARTED", "entered", true),
        FallTransitionKind::Finished => ("Fall detected FINISHED", "exited", false),
    };

    EventMetadataPacket {
        timestamp_us,
        items: vec![EventMetadata {
            type_id: FALL_EVENT_TYPE.to_string(),
            caption: caption.to_string(),
            description: format!("Track {} {} fall state", transition.track_id, phrase),
            is_active,
        }],
    }
}

fn clamp01(value: f32) -> f32 {
    value.max(0.0).min(1.0)
}
