//! How user actions turn into updates of the timer state.

use serde::{Deserialize, Serialize};

use super::duration::format_duration;
use super::state::{Marker, TimerPatch, TimerPhase, TimerState, Timestamp};

/// What a marker tap does outside of a recording.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPolicy {
    /// Markers only count while recording; other taps are ignored.
    #[default]
    Append,
    /// A tap while idle or stopped starts a fresh recording and is kept as
    /// its first marker.
    Rearm,
}

/// Start/stop toggle. Idle and stopped both restart the recording at `now`.
pub fn toggle(state: &TimerState, now: Timestamp) -> TimerPatch {
    match state.phase() {
        TimerPhase::Recording => TimerPatch::stop(now),
        TimerPhase::Idle | TimerPhase::Stopped => TimerPatch::start(now),
    }
}

/// Update for tagging `note` at `now`, or `None` when the tap is ignored.
pub fn add_marker(
    state: &TimerState,
    note: &str,
    now: Timestamp,
    policy: MarkerPolicy,
) -> Option<TimerPatch> {
    match (state.phase(), policy) {
        (TimerPhase::Recording, _) => {
            let mut markers = state.markers.clone();
            markers.push(Marker::new(note, format_duration(state, now)));
            Some(TimerPatch::new().with_markers(markers))
        }
        (TimerPhase::Idle | TimerPhase::Stopped, MarkerPolicy::Rearm) => {
            let restarted = TimerState {
                start_time: Some(now),
                end_time: None,
                markers: Vec::new(),
            };
            let marker = Marker::new(note, format_duration(&restarted, now));
            Some(TimerPatch::start(now).with_markers(vec![marker]))
        }
        (TimerPhase::Idle | TimerPhase::Stopped, MarkerPolicy::Append) => None,
    }
}
