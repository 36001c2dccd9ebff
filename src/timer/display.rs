use std::fmt;
use std::sync::{Arc, Mutex};

use super::duration::format_duration;
use super::state::{TimerPhase, TimerState, Timestamp};

pub const RECORD_GLYPH: &str = "⏯";
pub const STOP_GLYPH: &str = "🛑";
pub const PLACEHOLDER_GLYPH: &str = "⏺";

/// One refresh of the timer readout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Idle,
    Recording {
        elapsed: String,
    },
    /// Final duration stays on screen while the placeholder blinks.
    Stopped {
        duration: String,
        placeholder_visible: bool,
    },
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Idle => f.write_str("0:00:00"),
            Frame::Recording { elapsed } => f.write_str(elapsed),
            Frame::Stopped {
                duration,
                placeholder_visible,
            } => {
                let glyph = if *placeholder_visible { PLACEHOLDER_GLYPH } else { " " };
                write!(f, "{duration} {glyph}")
            }
        }
    }
}

/// Presentation surface driven by the refresh loop and the toggle listener.
pub trait Display: Send {
    fn render(&mut self, frame: &Frame);
    fn set_toggle_glyph(&mut self, glyph: &str);
}

pub type SharedDisplay = Arc<Mutex<dyn Display>>;

/// Placeholder is shown on even half-periods: `floor(now / period)` parity.
pub fn placeholder_visible(now: Timestamp, blink_period_ms: i64) -> bool {
    now.div_euclid(blink_period_ms.max(1)) % 2 == 0
}

pub fn render_frame(state: &TimerState, now: Timestamp, blink_period_ms: i64) -> Frame {
    match state.phase() {
        TimerPhase::Idle => Frame::Idle,
        TimerPhase::Recording => Frame::Recording {
            elapsed: format_duration(state, now),
        },
        TimerPhase::Stopped => Frame::Stopped {
            duration: format_duration(state, now),
            placeholder_visible: placeholder_visible(now, blink_period_ms),
        },
    }
}

pub fn toggle_glyph(state: &TimerState) -> &'static str {
    if state.is_recording() {
        STOP_GLYPH
    } else {
        RECORD_GLYPH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_shows_elapsed() {
        let state = TimerState {
            start_time: Some(1_000),
            end_time: None,
            markers: Vec::new(),
        };
        assert_eq!(
            render_frame(&state, 63_000, 500),
            Frame::Recording {
                elapsed: "0:01:02".into()
            }
        );
        assert_eq!(toggle_glyph(&state), STOP_GLYPH);
    }

    #[test]
    fn stopped_blinks_on_half_second_parity() {
        let state = TimerState {
            start_time: Some(0),
            end_time: Some(4_000),
            markers: Vec::new(),
        };

        let shown = render_frame(&state, 10_000, 500);
        let hidden = render_frame(&state, 10_500, 500);
        assert_eq!(
            shown,
            Frame::Stopped {
                duration: "0:00:04".into(),
                placeholder_visible: true
            }
        );
        assert_eq!(
            hidden,
            Frame::Stopped {
                duration: "0:00:04".into(),
                placeholder_visible: false
            }
        );
        assert_eq!(shown.to_string(), format!("0:00:04 {PLACEHOLDER_GLYPH}"));
        assert_eq!(toggle_glyph(&state), RECORD_GLYPH);
    }

    #[test]
    fn idle_renders_zero() {
        assert_eq!(render_frame(&TimerState::new(), 42, 500).to_string(), "0:00:00");
    }
}
