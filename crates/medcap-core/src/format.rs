//! Byte-count and duration humanization.

use crate::error::AppError;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count as `"<value> <unit>"`, scaling by powers of 1024 and
/// printing two decimal places.
///
/// Zero renders as the bare `"0B"` with no space. Negative counts are
/// rejected: a size is never semantically negative, so one here means the
/// caller is broken.
pub fn format_size(bytes: i64) -> Result<String, AppError> {
    if bytes < 0 {
        return Err(AppError::InvalidInput(format!(
            "negative byte count: {}",
            bytes
        )));
    }
    if bytes == 0 {
        return Ok("0B".to_string());
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    Ok(format!("{:.2} {}", scaled, UNITS[unit]))
}

/// Whole-second `H:MM:SS` rendering used for caption durations, e.g.
/// `0:03:20`. Fractional seconds truncate; non-finite or negative input
/// clamps to `0:00:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}
