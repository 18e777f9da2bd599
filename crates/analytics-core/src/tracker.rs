//! Stable per-object identities across frames.

use common::{Detection, Rect};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Minimum overlap for a detection to be associated with an existing
/// synthetic track.
const IOU_MATCH_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, Copy)]
struct SyntheticTrack {
    bbox: Rect,
    last_seen_us: i64,
}

/// Assigns a stable UUID to every detection in a frame.
///
/// Detections carrying a service-supplied track id keep it as their key
/// (the service only hands out non-negative ids); the rest are associated
/// with locally synthesized tracks by IoU, keyed negatively so the two id
/// spaces never collide. All state is private to the worker thread.
pub struct TrackRegistry {
    synthetic_track_ttl_us: i64,
    track_map_ttl_us: i64,
    next_synthetic_track_id: i64,
    synthetic_tracks: BTreeMap<i64, SyntheticTrack>,
    uuid_by_key: BTreeMap<i64, Uuid>,
    last_seen_us: BTreeMap<i64, i64>,
}

impl TrackRegistry {
    pub fn new(synthetic_track_ttl_us: i64, track_map_ttl_us: i64) -> Self {
        Self {
            synthetic_track_ttl_us,
            track_map_ttl_us,
            next_synthetic_track_id: -1,
            synthetic_tracks: BTreeMap::new(),
            uuid_by_key: BTreeMap::new(),
            last_seen_us: BTreeMap::new(),
        }
    }

    /// Resolve a stable UUID for every detection in the frame and refresh
    /// the last-seen bookkeeping.
    pub fn resolve(&mut self, detections: &mut [Detection], timestamp_us: i64) {
        for detection in detections.iter_mut() {
            let key = match detection.ai_track_id {
                Some(id) => id,
                None => self.resolve_synthetic(detection.bbox, timestamp_us),
            };
            detection.track_id = self.uuid_for_key(key);
            self.last_seen_us.insert(key, timestamp_us);
        }
    }

    fn resolve_synthetic(&mut self, bbox: Rect, timestamp_us: i64) -> i64 {
        let mut best: Option<(i64, f32)> = None;
        for (&key, track) in &self.synthetic_tracks {
            if timestamp_us - track.last_seen_us > self.synthetic_track_ttl_us {
                continue;
            }
            let overlap = track.bbox.iou(&bbox);
            if overlap > IOU_MATCH_THRESHOLD && best.map_or(true, |(_, b)| overlap > b) {
                best = Some((key, overlap));
            }
        }

        let key = match best {
            Some((key, _)) => key,
            None => {
                let id = self.next_synthetic_track_id;
                self.next_synthetic_track_id -= 1;
                id
            }
        };
        self.synthetic_tracks.insert(
            key,
            SyntheticTrack {
                bbox,
                last_seen_us: timestamp_us,
            },
        );
        key
    }

    fn uuid_for_key(&mut self, key: i64) -> Uuid {
        *self.uuid_by_key.entry(key).or_insert_with(Uuid::new_v4)
    }

    /// Drop synthetic tracks and key mappings past their TTLs, measured
    /// against the current frame's timestamp.
    pub fn cleanup(&mut self, timestamp_us: i64) {
        let synthetic_ttl = self.synthetic_track_ttl_us;
        self.synthetic_tracks
            .retain(|_, track| timestamp_us - track.last_seen_us <= synthetic_ttl);

        let map_ttl = self.track_map_ttl_us;
        let uuid_by_key = &mut self.uuid_by_key;
        self.last_seen_us.retain(|key, last_seen| {
            if timestamp_us - *last_seen > map_ttl {
                uuid_by_key.remove(key);
                false
            } else {
                true
            }
        });
    }

    /// True when no track state remains (all TTLs elapsed).
    pub fn is_empty(&self) -> bool {
        self.synthetic_tracks.is_empty()
            && self.uuid_by_key.is_empty()
            && self.last_seen_us.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(bbox: Rect, ai_track_id: Option<i64>) -> Detection {
        Detection {
            bbox,
            class_label: "person".to_string(),
            confidence: 0.9,
            fall_detected: false,
            ai_track_id,
            track_id: Uuid::nil(),
        }
    }

    #[test]
    fn service_track_id_maps_to_a_stable_uuid() {
        let mut registry = TrackRegistry::new(2_000_000, 60_000_000);
        let bbox = Rect::new(0.1, 0.1, 0.2, 0.4);

        let mut first = vec![detection(bbox, Some(7))];
        registry.resolve(&mut first, 1_000_000);

        let mut second = vec![detection(bbox, Some(7))];
        registry.resolve(&mut second, 1_200_000);

        assert_ne!(first[0].track_id, Uuid::nil());
        assert_eq!(first[0].track_id, second[0].track_id);
    }

    #[test]
    fn service_track_id_zero_is_a_valid_key() {
        let mut registry = TrackRegistry::new(2_000_000, 60_000_000);
        let bbox = Rect::new(0.1, 0.1, 0.2, 0.4);

        let mut with_zero = vec![detection(bbox, Some(0))];
        registry.resolve(&mut with_zero, 1_000_000);

        // A synthetic detection at the same spot must not collide with
        // the service-supplied key 0.
        let mut synthetic = vec![detection(bbox, None)];
        registry.resolve(&mut synthetic, 1_100_000);

        assert_ne!(with_zero[0].track_id, synthetic[0].track_id);
    }

    #[test]
    fn overlapping_detections_share_a_synthetic_track() {
        let mut registry = TrackRegistry::new(2_000_000, 60_000_000);

        let mut first = vec![detection(Rect::new(0.10, 0.10, 0.10, 0.20), None)];
        registry.resolve(&mut first, 1_000_000);

        let mut second = vec![detection(Rect::new(0.11, 0.105, 0.10, 0.20), None)];
        registry.resolve(&mut second, 1_100_000);

        assert_eq!(first[0].track_id, second[0].track_id);
    }

    #[test]
    fn disjoint_detection_gets_a_new_track() {
        let mut registry = TrackRegistry::new(2_000_000, 60_000_000);

        let mut first = vec![detection(Rect::new(0.1, 0.1, 0.1, 0.2), None)];
        registry.resolve(&mut first, 1_000_000);

        let mut second = vec![detection(Rect::new(0.7, 0.7, 0.1, 0.2), None)];
        registry.resolve(&mut second, 1_100_000);

        assert_ne!(first[0].track_id, second[0].track_id);
    }

    #[test]
    fn expired_synthetic_track_is_not_matched() {
        let mut registry = TrackRegistry::new(2_000_000, 60_000_000);
        let bbox = Rect::new(0.1, 0.1, 0.1, 0.2);

        let mut first = vec![detection(bbox, None)];
        registry.resolve(&mut first, 1_000_000);

        // Same place, but five seconds later: the synthetic TTL (2s) has
        // long expired.
        let mut second = vec![detection(bbox, None)];
        registry.resolve(&mut second, 6_000_000);

        assert_ne!(first[0].track_id, second[0].track_id);
    }

    #[test]
    fn highest_iou_wins_the_association() {
        let mut registry = TrackRegistry::new(2_000_000, 60_000_000);

        let mut seed = vec![
            detection(Rect::new(0.10, 0.10, 0.20, 0.20), None),
            detection(Rect::new(0.50, 0.50, 0.20, 0.20), None),
        ];
        registry.resolve(&mut seed, 1_000_000);

        // Nearly identical to the second seed box.
        let mut probe = vec![detection(Rect::new(0.51, 0.50, 0.20, 0.20), None)];
        registry.resolve(&mut probe, 1_100_000);

        assert_eq!(probe[0].track_id, seed[1].track_id);
        assert_ne!(probe[0].track_id, seed[0].track_id);
    }

    #[test]
    fn cleanup_empties_all_state_after_the_map_ttl() {
        let mut registry = TrackRegistry::new(2_000_000, 60_000_000);

        let mut detections = vec![
            detection(Rect::new(0.1, 0.1, 0.1, 0.2), None),
            detection(Rect::new(0.5, 0.5, 0.1, 0.2), Some(9)),
        ];
        registry.resolve(&mut detections, 1_000_000);
        assert!(!registry.is_empty());

        registry.cleanup(1_500_000);
        assert!(!registry.is_empty());

        // Past the track-map TTL everything is gone.
        registry.cleanup(1_000_000 + 60_000_001);
        assert!(registry.is_empty());
    }
}
