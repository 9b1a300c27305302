//! PPE categories and compliance statuses.
//!
//! Both sets are closed and mirror the CHECK constraints on the `detections`,
//! `violations` and `user_settings` tables.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// PPE categories
// ---------------------------------------------------------------------------

/// A category of personal protective equipment the detector looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PpeType {
    Helmet,
    Vest,
    Gloves,
    Mask,
    Goggles,
    Boots,
}

impl PpeType {
    /// Every category, in display order.
    pub const ALL: [PpeType; 6] = [
        PpeType::Helmet,
        PpeType::Vest,
        PpeType::Gloves,
        PpeType::Mask,
        PpeType::Goggles,
        PpeType::Boots,
    ];

    /// Canonical name as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            PpeType::Helmet => "helmet",
            PpeType::Vest => "vest",
            PpeType::Gloves => "gloves",
            PpeType::Mask => "mask",
            PpeType::Goggles => "goggles",
            PpeType::Boots => "boots",
        }
    }

    /// Parse a canonical name. Use [`PpeType::from_label`] for model output.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown PPE type '{name}'. Must be one of: helmet, vest, gloves, mask, goggles, boots"
                ))
            })
    }

    /// Map a free-form label produced by the vision model onto a category.
    ///
    /// Case and surrounding whitespace are ignored, and the common synonyms the
    /// detection prompt itself uses ("hard hat", "respirator", ...) are accepted.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let t = match normalized.as_str() {
            "helmet" | "helmets" | "hard hat" | "hardhat" | "safety helmet" => PpeType::Helmet,
            "vest" | "vests" | "safety vest" | "high-visibility vest" | "hi-vis vest" => {
                PpeType::Vest
            }
            "gloves" | "glove" | "safety gloves" => PpeType::Gloves,
            "mask" | "masks" | "face mask" | "respirator" => PpeType::Mask,
            "goggles" | "safety goggles" | "glasses" | "safety glasses" => PpeType::Goggles,
            "boots" | "boot" | "safety boots" | "safety shoes" | "shoes" => PpeType::Boots,
            _ => return None,
        };
        Some(t)
    }
}

impl std::fmt::Display for PpeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Compliance status
// ---------------------------------------------------------------------------

/// Overall (or per-item) compliance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PpeStatus {
    Compliant,
    Violation,
    Partial,
}

impl PpeStatus {
    /// Status assumed when the model omits `overallStatus`.
    pub const DEFAULT: PpeStatus = PpeStatus::Partial;

    pub fn as_str(self) -> &'static str {
        match self {
            PpeStatus::Compliant => "compliant",
            PpeStatus::Violation => "violation",
            PpeStatus::Partial => "partial",
        }
    }
}

impl std::fmt::Display for PpeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for t in PpeType::ALL {
            assert_eq!(PpeType::from_name(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn unknown_name_is_a_validation_error() {
        assert!(matches!(
            PpeType::from_name("cape"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn labels_accept_synonyms_and_case() {
        assert_eq!(PpeType::from_label("  Hard Hat "), Some(PpeType::Helmet));
        assert_eq!(PpeType::from_label("Respirator"), Some(PpeType::Mask));
        assert_eq!(PpeType::from_label("GLOVES"), Some(PpeType::Gloves));
        assert_eq!(PpeType::from_label("ear muffs"), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&PpeStatus::Violation).unwrap();
        assert_eq!(json, "\"violation\"");
        let parsed: PpeStatus = serde_json::from_str("\"compliant\"").unwrap();
        assert_eq!(parsed, PpeStatus::Compliant);
    }
}
