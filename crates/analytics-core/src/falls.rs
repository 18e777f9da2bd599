//! State-dependent fall episodes per track.

use common::Detection;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Direction of a fall-episode boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallTransitionKind {
    Started,
    Finished,
}

/// One fall-episode boundary for a track, ready to be rendered into an
/// event packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallTransition {
    pub track_id: Uuid,
    pub kind: FallTransitionKind,
}

#[derive(Debug, Clone, Copy)]
struct FallTrackState {
    last_seen_us: i64,
}

/// Converts per-frame fall flags into deduplicated start/finish
/// transitions per track.
///
/// An active entry means a start has been emitted with no finish yet. A
/// track seen without the flag finishes immediately; a track that vanished
/// keeps its episode alive for the grace period (occlusion, dropped
/// frames) before being force-finished. For any track the emitted
/// sequence is `(start finish)*`.
pub struct FallStateMachine {
    fall_finish_grace_us: i64,
    active: BTreeMap<Uuid, FallTrackState>,
}

impl FallStateMachine {
    pub fn new(fall_finish_grace_us: i64) -> Self {
        Self {
            fall_finish_grace_us,
            active: BTreeMap::new(),
        }
    }

    /// Feed one frame's resolved detections; returns the transitions to
    /// emit, starts before finishes.
    pub fn observe(&mut self, detections: &[Detection], timestamp_us: i64) -> Vec<FallTransition> {
        let mut seen = BTreeSet::new();
        let mut falling = BTreeSet::new();
        for detection in detections {
            seen.insert(detection.track_id);
            if detection.fall_detected {
                falling.insert(detection.track_id);
            }
        }

        let mut transitions = Vec::new();

        for &track_id in &falling {
            match self.active.get_mut(&track_id) {
                Some(state) => state.last_seen_us = timestamp_us,
                None => {
                    self.active.insert(
                        track_id,
                        FallTrackState {
                            last_seen_us: timestamp_us,
                        },
                    );
                    transitions.push(FallTransition {
                        track_id,
                        kind: FallTransitionKind::Started,
                    });
                }
            }
        }

        let finished: Vec<Uuid> = self
            .active
            .iter()
            .filter(|&(track_id, state)| {
                if falling.contains(track_id) {
                    return false;
                }
                seen.contains(track_id)
                    || timestamp_us - state.last_seen_us >= self.fall_finish_grace_us
            })
            .map(|(track_id, _)| *track_id)
            .collect();

        for track_id in finished {
            self.active.remove(&track_id);
            transitions.push(FallTransition {
                track_id,
                kind: FallTransitionKind::Finished,
            });
        }

        transitions
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
