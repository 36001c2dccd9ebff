use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::{log_error, log_info};

use super::duration::{duration_ms, format_compact, rounded_seconds};
use super::state::{TimerPatch, TimerPhase, TimerState};

const ENABLE_LOGS: bool = true;

/// Destination for a finished session's JSON document.
pub trait ExportSink: Send + Sync {
    fn export(&self, document: &str) -> Result<()>;
}

/// Writes each export to its own file in a directory.
///
/// Inside a tokio runtime the write runs on the blocking pool and `export`
/// returns at once; failures are logged. Outside a runtime it writes inline.
/// Clones share the same set of in-flight writes.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    pending: TaskTracker,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pending: TaskTracker::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Wait for every write handed off so far.
    pub async fn flush(&self) {
        self.pending.close();
        self.pending.wait().await;
        self.pending.reopen();
    }
}

fn write_export(dir: &Path, document: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export dir {}", dir.display()))?;

    let path = dir.join(format!("video-timer-{}.json", Uuid::new_v4()));
    fs::write(&path, document)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    log_info!("Exported session to {}", path.display());
    Ok(path)
}

impl ExportSink for DirectorySink {
    fn export(&self, document: &str) -> Result<()> {
        if Handle::try_current().is_err() {
            return write_export(&self.dir, document).map(|_| ());
        }

        let dir = self.dir.clone();
        let document = document.to_owned();
        self.pending.spawn_blocking(move || {
            if let Err(err) = write_export(&dir, &document) {
                log_error!("Export failed: {:#}", err);
            }
        });
        Ok(())
    }
}

/// Keeps exports in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    documents: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl ExportSink for MemorySink {
    fn export(&self, document: &str) -> Result<()> {
        self.documents
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink poisoned"))?
            .push(document.to_owned());
        Ok(())
    }
}

pub fn export_document(state: &TimerState) -> Result<String> {
    serde_json::to_string_pretty(state).context("Failed to serialize timer state")
}

/// Responder body run when the end time changes.
///
/// Once the timer is stopped the full state goes to `sink` and the markers
/// are cleared for the next session. Export failures are logged and never
/// block the clear.
pub fn export_on_stop(sink: Arc<dyn ExportSink>) -> impl FnMut(&TimerState) -> Option<TimerPatch> + Send {
    move |state: &TimerState| {
        if state.phase() != TimerPhase::Stopped {
            return None;
        }

        // end_time is set in the stopped phase, so "now" is never consulted
        let seconds = rounded_seconds(duration_ms(state, 0));
        log_info!(
            "Session stopped. Duration: {}, markers: {}",
            format_compact(seconds),
            state.markers.len()
        );

        match export_document(state) {
            Ok(document) => {
                if let Err(err) = sink.export(&document) {
                    log_error!("Export failed: {:#}", err);
                }
            }
            Err(err) => log_error!("Export failed: {:#}", err),
        }

        Some(TimerPatch::clear_markers())
    }
}
