use super::state::{TimerState, Timestamp};

/// Signed span between the state's start and end, in milliseconds.
///
/// A missing end means "still running" and a missing start means "not
/// started"; both fall back to `now`. Spans beyond `i64` saturate.
pub fn duration_ms(state: &TimerState, now: Timestamp) -> i64 {
    let end = state.end_time.unwrap_or(now);
    let start = state.start_time.unwrap_or(now);
    end.saturating_sub(start)
}

/// Whole seconds in `duration_ms`, rounded half up. Negative spans clamp to zero.
pub fn rounded_seconds(duration_ms: i64) -> u64 {
    if duration_ms <= 0 {
        return 0;
    }
    ((duration_ms as u64) + 500) / 1000
}

/// Format the state's duration as `H:MM:SS`.
pub fn format_duration(state: &TimerState, now: Timestamp) -> String {
    format_seconds(rounded_seconds(duration_ms(state, now)))
}

pub fn format_seconds(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Short summary such as `1h 2m 5s`, omitting zero components.
pub fn format_compact(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: Option<Timestamp>, end: Option<Timestamp>) -> TimerState {
        TimerState {
            start_time: start,
            end_time: end,
            markers: Vec::new(),
        }
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_duration(&span(Some(0), Some(3_725_000)), 0), "1:02:05");
    }

    #[test]
    fn hours_are_not_padded() {
        assert_eq!(format_seconds(36_000 + 59), "10:00:59");
        assert_eq!(format_seconds(0), "0:00:00");
    }

    #[test]
    fn missing_end_uses_now() {
        let now = 1_700_000_000_000;
        assert_eq!(format_duration(&span(Some(now - 5_000), None), now), "0:00:05");
    }

    #[test]
    fn missing_start_is_zero() {
        let now = 1_700_000_000_000;
        assert_eq!(format_duration(&span(None, None), now), "0:00:00");
    }

    #[test]
    fn rounds_to_nearest_second() {
        assert_eq!(rounded_seconds(1_499), 1);
        assert_eq!(rounded_seconds(1_500), 2);
        assert_eq!(format_duration(&span(Some(0), Some(59_600)), 0), "0:01:00");
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        let state = span(Some(10_000), Some(4_000));
        assert_eq!(duration_ms(&state, 0), -6_000);
        assert_eq!(format_duration(&state, 0), "0:00:00");
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let widest = span(Some(i64::MIN), Some(i64::MAX));
        assert_eq!(duration_ms(&widest, 0), i64::MAX);
        assert_eq!(format_duration(&widest, 0), "2562047788015:12:56");

        let inverted = span(Some(i64::MAX), Some(i64::MIN));
        assert_eq!(duration_ms(&inverted, 0), i64::MIN);
        assert_eq!(format_duration(&inverted, 0), "0:00:00");

        assert_eq!(format_duration(&span(Some(i64::MAX), None), -1), "0:00:00");
    }

    #[test]
    fn compact_summary() {
        assert_eq!(format_compact(3_725), "1h 2m 5s");
        assert_eq!(format_compact(120), "2m");
        assert_eq!(format_compact(0), "0s");
    }
}
