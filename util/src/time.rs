//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a time in seconds into the number of whole frames at the given rate
pub fn seconds_to_frames(seconds: f64, rate_hz: f64) -> u32 {
    (seconds * rate_hz).floor().max(0.0) as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }

    #[test]
    fn test_frame_conversion() {
        assert_eq!(seconds_to_frames(1.0, 20.0), 20);
        assert_eq!(seconds_to_frames(0.5, 20.0), 10);
        assert_eq!(seconds_to_frames(-1.0, 20.0), 0);
    }
}
