//! Run time reporting

use std::time::Duration;

/// Format a duration as whole hours, minutes and seconds
///
/// Leading zero units are left out, seconds are always shown.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if hours != 0 {
        out.push_str(&format!("{} hours, {} minutes, ", hours, minutes));
    } else if minutes != 0 {
        out.push_str(&format!("{} minutes, ", minutes));
    }
    out.push_str(&format!("{} seconds", seconds));
    out
}

/// The `Time spent: ...` line appended after a timed run
pub fn time_spent_line(elapsed: Duration) -> String {
    format!("Time spent: {}", format_elapsed(elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_only() {
        assert_eq!(format_elapsed(Duration::from_millis(999)), "0 seconds");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "59 seconds");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(format_elapsed(Duration::from_secs(61)), "1 minutes, 1 seconds");
    }

    #[test]
    fn test_hours_keep_zero_minutes() {
        assert_eq!(
            format_elapsed(Duration::from_secs(3600 + 5)),
            "1 hours, 0 minutes, 5 seconds"
        );
        assert_eq!(
            format_elapsed(Duration::from_secs(2 * 3600 + 30 * 60 + 7)),
            "2 hours, 30 minutes, 7 seconds"
        );
    }

    #[test]
    fn test_time_spent_line() {
        assert_eq!(time_spent_line(Duration::from_secs(3)), "Time spent: 3 seconds");
    }
}
