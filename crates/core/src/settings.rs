//! Per-user detection settings: defaults and validation.

use serde::Serialize;

use crate::error::CoreError;
use crate::ppe::PpeType;

/// Confidence threshold applied when a user has never saved settings.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 70.0;

pub const DEFAULT_AUTO_ALERT: bool = true;
pub const DEFAULT_SAVE_SNAPSHOTS: bool = true;
pub const DEFAULT_SHOW_BBOXES: bool = true;

/// All PPE categories, enabled by default.
pub fn default_enabled_ppe_types() -> Vec<String> {
    PpeType::ALL.iter().map(|t| t.as_str().to_string()).collect()
}

/// Validate that a confidence threshold is a percentage in `[0, 100]`.
pub fn validate_confidence_threshold(value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "confidence_threshold must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate that every entry names a known PPE category, without duplicates.
pub fn validate_enabled_ppe_types(types: &[String]) -> Result<(), CoreError> {
    let mut seen = Vec::with_capacity(types.len());
    for name in types {
        let t = PpeType::from_name(name)?;
        if seen.contains(&t) {
            return Err(CoreError::Validation(format!(
                "enabled_ppe_types lists '{name}' more than once"
            )));
        }
        seen.push(t);
    }
    Ok(())
}

/// Settings as the detector applies them: every field resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveSettings {
    pub confidence_threshold: f64,
    pub enabled_ppe_types: Vec<String>,
    pub auto_alert: bool,
    pub save_snapshots: bool,
    pub show_bboxes: bool,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            enabled_ppe_types: default_enabled_ppe_types(),
            auto_alert: DEFAULT_AUTO_ALERT,
            save_snapshots: DEFAULT_SAVE_SNAPSHOTS,
            show_bboxes: DEFAULT_SHOW_BBOXES,
        }
    }
}

impl EffectiveSettings {
    /// Fill unset stored fields with their defaults.
    pub fn resolve(
        confidence_threshold: Option<f64>,
        enabled_ppe_types: Option<Vec<String>>,
        auto_alert: Option<bool>,
        save_snapshots: Option<bool>,
        show_bboxes: Option<bool>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            confidence_threshold: confidence_threshold.unwrap_or(defaults.confidence_threshold),
            enabled_ppe_types: enabled_ppe_types.unwrap_or(defaults.enabled_ppe_types),
            auto_alert: auto_alert.unwrap_or(defaults.auto_alert),
            save_snapshots: save_snapshots.unwrap_or(defaults.save_snapshots),
            show_bboxes: show_bboxes.unwrap_or(defaults.show_bboxes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_accepts_boundaries() {
        assert!(validate_confidence_threshold(0.0).is_ok());
        assert!(validate_confidence_threshold(DEFAULT_CONFIDENCE_THRESHOLD).is_ok());
        assert!(validate_confidence_threshold(100.0).is_ok());
    }

    #[test]
    fn threshold_rejects_out_of_range() {
        assert!(validate_confidence_threshold(-0.5).is_err());
        assert!(validate_confidence_threshold(100.1).is_err());
        assert!(validate_confidence_threshold(f64::NAN).is_err());
    }

    #[test]
    fn defaults_enable_every_category() {
        let defaults = default_enabled_ppe_types();
        assert_eq!(defaults.len(), 6);
        assert!(validate_enabled_ppe_types(&defaults).is_ok());
    }

    #[test]
    fn rejects_unknown_and_duplicate_types() {
        assert!(validate_enabled_ppe_types(&["helmet".into(), "cape".into()]).is_err());
        assert!(validate_enabled_ppe_types(&["mask".into(), "mask".into()]).is_err());
        assert!(validate_enabled_ppe_types(&[]).is_ok());
    }

    #[test]
    fn resolve_keeps_stored_values_and_fills_gaps() {
        let settings = EffectiveSettings::resolve(
            Some(55.0),
            Some(vec!["helmet".into()]),
            None,
            Some(false),
            None,
        );
        assert_eq!(settings.confidence_threshold, 55.0);
        assert_eq!(settings.enabled_ppe_types, vec!["helmet".to_string()]);
        assert!(settings.auto_alert);
        assert!(!settings.save_snapshots);
        assert!(settings.show_bboxes);
    }
}
