//! Per-day compliance counters and window totals.
//!
//! A [`DailyTally`] is the in-memory mirror of one `analytics_summary` row.
//! Tallies combine with [`DailyTally::merge`], which keeps
//! `total == compliant + violation + partial` and maintains the average
//! confidence as a count-weighted mean. Recording one detection is a merge
//! with a single-detection tally, which reduces to the running-mean update
//! `new_avg = (old_avg * old_total + confidence) / (old_total + 1)`.

use serde::Serialize;

use crate::ppe::PpeStatus;

/// Counters for one (user, day), or for a whole window once merged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DailyTally {
    pub total_detections: i64,
    pub compliant_count: i64,
    pub violation_count: i64,
    pub partial_count: i64,
    pub avg_confidence: f64,
}

impl DailyTally {
    /// Tally contributed by a single detection.
    pub fn single(status: PpeStatus, confidence: f64) -> Self {
        Self {
            total_detections: 1,
            compliant_count: i64::from(status == PpeStatus::Compliant),
            violation_count: i64::from(status == PpeStatus::Violation),
            partial_count: i64::from(status == PpeStatus::Partial),
            avg_confidence: confidence,
        }
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: &DailyTally) {
        let combined = self.total_detections + other.total_detections;
        self.avg_confidence = if combined > 0 {
            (self.avg_confidence * self.total_detections as f64
                + other.avg_confidence * other.total_detections as f64)
                / combined as f64
        } else {
            0.0
        };
        self.total_detections = combined;
        self.compliant_count += other.compliant_count;
        self.violation_count += other.violation_count;
        self.partial_count += other.partial_count;
    }

    /// Record one detection.
    pub fn record(&mut self, status: PpeStatus, confidence: f64) {
        self.merge(&Self::single(status, confidence));
    }

    /// Compliance rate of this tally, see [`compliance_rate`].
    pub fn compliance_rate(&self) -> f64 {
        compliance_rate(self.compliant_count, self.total_detections)
    }
}

/// Totals across a trailing window, as returned in the analytics `summary`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSummary {
    pub total_detections: i64,
    pub compliant_count: i64,
    pub violation_count: i64,
    pub partial_count: i64,
    pub avg_confidence: f64,
    pub compliance_rate: f64,
}

impl WindowSummary {
    /// Sum the per-day tallies of a window.
    pub fn from_days<'a>(days: impl IntoIterator<Item = &'a DailyTally>) -> Self {
        let mut totals = DailyTally::default();
        for day in days {
            totals.merge(day);
        }
        Self {
            total_detections: totals.total_detections,
            compliant_count: totals.compliant_count,
            violation_count: totals.violation_count,
            partial_count: totals.partial_count,
            avg_confidence: round_one_decimal(totals.avg_confidence),
            compliance_rate: totals.compliance_rate(),
        }
    }
}

/// Percentage of compliant detections, rounded to one decimal.
///
/// Exactly `0.0` when `total` is zero.
pub fn compliance_rate(compliant: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = compliant.clamp(0, total) as f64 / total as f64 * 100.0;
    round_one_decimal(rate)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
