use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::DEFAULT_MAX_CASCADE;
use crate::timer::MarkerPolicy;
use crate::log_warn;

const ENABLE_LOGS: bool = true;

pub const DEFAULT_MARKER_NOTES: [&str; 5] = ["✨", "✂", "❌", "✔", "❓"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub export_dir: PathBuf,
    pub refresh_interval_ms: u64,
    pub blink_period_ms: u64,
    pub marker_notes: Vec<String>,
    pub marker_policy: MarkerPolicy,
    pub max_cascade: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("exports"),
            refresh_interval_ms: 16,
            blink_period_ms: 500,
            marker_notes: DEFAULT_MARKER_NOTES.iter().map(|note| note.to_string()).collect(),
            marker_policy: MarkerPolicy::Append,
            max_cascade: DEFAULT_MAX_CASCADE,
        }
    }
}

/// Settings loaded once from a JSON file.
pub struct SettingsStore {
    path: PathBuf,
    data: Settings,
}

impl SettingsStore {
    /// A missing file yields defaults; an unparsable one yields defaults with a warning.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("Ignoring invalid settings in {}: {}", path.display(), err);
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> Settings {
        self.data.clone()
    }
}
