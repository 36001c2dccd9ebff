use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    log_debug, log_error, log_info,
    model::{Model, SubscriptionId, WatchSet},
    settings::Settings,
};

use super::{
    clock::Clock,
    display::{render_frame, toggle_glyph, SharedDisplay},
    duration::format_duration,
    export::{export_on_stop, ExportSink},
    policy::{self, MarkerPolicy},
    state::{TimerField, TimerPatch, TimerPhase, TimerState},
};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub phase: TimerPhase,
    pub readable_time: String,
}

/// The one live timer session. Clones are handles onto the same state.
#[derive(Clone)]
pub struct TimerController {
    model: Arc<Mutex<Model<TimerState>>>,
    clock: Arc<dyn Clock>,
    marker_policy: MarkerPolicy,
    refresh_interval: Duration,
    blink_period_ms: i64,
}

impl TimerController {
    /// Build an idle session with the export-and-clear responder registered.
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>, sink: Arc<dyn ExportSink>) -> Self {
        let mut model = Model::new(TimerState::new()).with_max_cascade(settings.max_cascade);
        model.respond([TimerField::EndTime], export_on_stop(sink));

        Self {
            model: Arc::new(Mutex::new(model)),
            clock,
            marker_policy: settings.marker_policy,
            refresh_interval: Duration::from_millis(settings.refresh_interval_ms.max(1)),
            blink_period_ms: settings.blink_period_ms.max(1) as i64,
        }
    }

    pub async fn get_state(&self) -> TimerState {
        self.model.lock().await.snapshot()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        let state = self.get_state().await;
        TimerSnapshot {
            phase: state.phase(),
            readable_time: format_duration(&state, self.clock.now_ms()),
            state,
        }
    }

    /// Start, stop or restart the recording depending on the current phase.
    pub async fn toggle(&self) -> Result<TimerState> {
        let mut model = self.model.lock().await;
        let now = self.clock.now_ms();
        let patch = policy::toggle(model.read(), now);
        log_debug!("Toggle at {}: {:?}", now, patch);

        model.merge(patch).context("toggle update failed")?;
        let state = model.snapshot();
        log_info!("Timer is now {:?}", state.phase());
        Ok(state)
    }

    /// Tag `note` at the current elapsed time. Taps the marker policy
    /// ignores leave the state untouched.
    pub async fn add_marker(&self, note: &str) -> Result<TimerState> {
        let mut model = self.model.lock().await;
        let now = self.clock.now_ms();

        match policy::add_marker(model.read(), note, now, self.marker_policy) {
            Some(patch) => {
                model.merge(patch).context("marker update failed")?;
                log_info!("Marker {} added", note);
            }
            None => log_debug!("Marker {} ignored while {:?}", note, model.read().phase()),
        }

        Ok(model.snapshot())
    }

    pub async fn merge(&self, patch: TimerPatch) -> Result<TimerState> {
        let mut model = self.model.lock().await;
        model.merge(patch).context("state update failed")?;
        Ok(model.snapshot())
    }

    pub async fn listen<F>(&self, watch: impl Into<WatchSet<TimerField>>, callback: F) -> SubscriptionId
    where
        F: FnMut(&TimerState) + Send + 'static,
    {
        self.model.lock().await.listen(watch, callback)
    }

    pub async fn respond<F>(&self, watch: impl Into<WatchSet<TimerField>>, callback: F) -> SubscriptionId
    where
        F: FnMut(&TimerState) -> Option<TimerPatch> + Send + 'static,
    {
        self.model.lock().await.respond(watch, callback)
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.model.lock().await.unsubscribe(id)
    }

    /// Keep the display's toggle glyph in step with the recording phase.
    pub async fn attach_display(&self, display: SharedDisplay) -> SubscriptionId {
        let mut model = self.model.lock().await;
        set_glyph(&display, model.read());

        model.listen([TimerField::StartTime, TimerField::EndTime], move |state: &TimerState| {
            set_glyph(&display, state);
        })
    }

    /// Redraw `display` every refresh interval until `cancel` fires.
    pub fn spawn_refresh(&self, display: SharedDisplay, cancel: CancellationToken) -> JoinHandle<()> {
        let model = self.model.clone();
        let clock = self.clock.clone();
        let refresh_interval = self.refresh_interval;
        let blink_period_ms = self.blink_period_ms;

        tokio::spawn(async move {
            let mut interval = time::interval(refresh_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            log_debug!("Refresh loop running every {:?}", refresh_interval);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let state = model.lock().await.snapshot();
                let frame = render_frame(&state, clock.now_ms(), blink_period_ms);
                match display.lock() {
                    Ok(mut display) => display.render(&frame),
                    Err(_) => {
                        log_error!("Display lock poisoned; stopping refresh loop");
                        break;
                    }
                }
            }
        })
    }
}

fn set_glyph(display: &SharedDisplay, state: &TimerState) {
    if let Ok(mut display) = display.lock() {
        display.set_toggle_glyph(toggle_glyph(state));
    }
}
