use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::{parse_strict, ModelError, Shape, WatchSet};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    #[default]
    Idle,
    Recording,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub note: String,
    /// Elapsed time when the marker was tagged, as `H:MM:SS`.
    pub readable_time: String,
}

impl Marker {
    pub fn new(note: impl Into<String>, readable_time: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            readable_time: readable_time.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub markers: Vec<Marker>,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TimerPhase {
        match (self.start_time, self.end_time) {
            (None, _) => TimerPhase::Idle,
            (Some(_), None) => TimerPhase::Recording,
            (Some(_), Some(_)) => TimerPhase::Stopped,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.phase() == TimerPhase::Recording
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerField {
    StartTime,
    EndTime,
    Markers,
}

impl TimerField {
    pub const ALL: [TimerField; 3] = [TimerField::StartTime, TimerField::EndTime, TimerField::Markers];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerField::StartTime => "startTime",
            TimerField::EndTime => "endTime",
            TimerField::Markers => "markers",
        }
    }
}

/// Partial update of a [`TimerState`].
///
/// The outer `Option` says whether a field is part of the update; for the
/// timestamps the inner `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimerPatch {
    #[serde(default, deserialize_with = "present")]
    pub start_time: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "present")]
    pub end_time: Option<Option<Timestamp>>,
    #[serde(default)]
    pub markers: Option<Vec<Marker>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TimerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a recording at `now`: sets the start and clears the end.
    pub fn start(now: Timestamp) -> Self {
        Self::new().with_start_time(Some(now)).with_end_time(None)
    }

    pub fn stop(now: Timestamp) -> Self {
        Self::new().with_end_time(Some(now))
    }

    pub fn clear_markers() -> Self {
        Self::new().with_markers(Vec::new())
    }

    pub fn with_start_time(mut self, start_time: Option<Timestamp>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_end_time(mut self, end_time: Option<Timestamp>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_markers(mut self, markers: Vec<Marker>) -> Self {
        self.markers = Some(markers);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none() && self.markers.is_none()
    }
}

impl Shape for TimerState {
    type Field = TimerField;
    type Patch = TimerPatch;

    fn changed_fields(patch: &TimerPatch) -> WatchSet<TimerField> {
        let mut fields = WatchSet::new();
        if patch.start_time.is_some() {
            fields.insert(TimerField::StartTime);
        }
        if patch.end_time.is_some() {
            fields.insert(TimerField::EndTime);
        }
        if patch.markers.is_some() {
            fields.insert(TimerField::Markers);
        }
        fields
    }

    fn apply(&mut self, patch: TimerPatch) {
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(markers) = patch.markers {
            self.markers = markers;
        }
    }

    fn parse_patch(value: Value) -> Result<TimerPatch, ModelError> {
        let known = TimerField::ALL.map(|field| field.as_str());
        parse_strict(value, &known)
    }
}
