//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use serde::Deserialize;

/// Window length used when `?days=` is absent.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;
/// Longest accepted window.
pub const MAX_WINDOW_DAYS: i64 = 365;

/// Trailing-window parameters (`?days=`).
#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    pub days: Option<i64>,
}

impl WindowParams {
    /// Requested window length, clamped to `1..=365`.
    pub fn days(&self) -> i64 {
        self.days
            .unwrap_or(DEFAULT_WINDOW_DAYS)
            .clamp(1, MAX_WINDOW_DAYS)
    }

    /// First calendar day of the window ending at `today`: `today - days`.
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        today - chrono::Duration::days(self.days())
    }
}
