//! Time-of-day greeting for the `wish` caption field.

use chrono::{Local, Timelike};

/// Greeting for a given local hour (0-23).
pub fn wish_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good Morning",
        12..=16 => "Good Afternoon",
        17..=20 => "Good Evening",
        _ => "Good Night",
    }
}

/// Greeting for the current local time.
pub fn current_wish() -> &'static str {
    wish_for_hour(Local::now().hour())
}
