use crate::rect::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One detected object, after wire normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in normalized coordinates, clamped to the unit square.
    pub bbox: Rect,

    /// Object class (e.g. "person").
    pub class_label: String,

    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,

    /// Whether the service flagged this object as fallen in this frame.
    pub fall_detected: bool,

    /// Track id supplied by the AI service when it runs its own tracker.
    /// Absent when the service does not track; identity is then inferred
    /// locally by IoU association.
    pub ai_track_id: Option<i64>,

    /// Stable per-object identity, assigned by the track registry before
    /// emission. Nil until resolved.
    pub track_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_serialization_round_trip() {
        let detection = Detection {
            bbox: Rect::new(0.1, 0.2, 0.3, 0.4),
            class_label: "person".to_string(),
            confidence: 0.95,
            fall_detected: true,
            ai_track_id: Some(7),
            track_id: Uuid::new_v4(),
        };

        let json = serde_json::to_string(&detection).unwrap();
        let deserialized: Detection = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.class_label, detection.class_label);
        assert_eq!(deserialized.ai_track_id, detection.ai_track_id);
        assert_eq!(deserialized.track_id, detection.track_id);
    }
}
