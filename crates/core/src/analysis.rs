//! Parsing of the vision model's free-form answer into a detection result.
//!
//! The model is asked for a bare JSON object but frequently wraps it in a
//! fenced code block or surrounds it with prose. [`parse_model_answer`] finds
//! the object, deserializes it against a strict schema, validates value
//! ranges, and on any failure substitutes [`fallback_analysis`] while tagging
//! the outcome as [`ParseOutcome::Fallback`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::ppe::{PpeStatus, PpeType};

/// Confidence recorded when the model omits `avgConfidence`.
pub const DEFAULT_CONFIDENCE: f64 = 85.0;

/// Prompt sent alongside every image.
pub const DETECTION_PROMPT: &str = "Analyze this image for Personal Protective Equipment (PPE) compliance. \
Detect the following PPE items:
- Safety helmet/hard hat
- High-visibility safety vest
- Safety gloves
- Face mask/respirator
- Safety goggles
- Safety boots/shoes

For each detected item, provide:
1. The PPE type
2. Confidence score (0-100)
3. Approximate location description
4. Compliance status (compliant/partial/violation)

Also identify any MISSING required PPE items.

Respond in JSON format with this structure:
{
  \"detected\": [{\"type\": \"helmet\", \"confidence\": 95, \"location\": \"top of head\", \"status\": \"compliant\"}],
  \"missing\": [\"mask\", \"gloves\"],
  \"overallStatus\": \"violation\",
  \"avgConfidence\": 87.5
}";

/// Matches a fenced code block, optionally tagged `json`, capturing its body.
static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|JSON)?[ \t]*\r?\n([\s\S]*?)\r?\n[ \t]*```").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// One PPE item the model reports as present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DetectedItem {
    /// Free-form label; normally one of the [`PpeType`] names.
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub item_type: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: PpeStatus,
}

/// Structured detection result, as stored in `detections.detection_results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetectionAnalysis {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(nested)]
    pub detected: Vec<DetectedItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_status: Option<PpeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub avg_confidence: Option<f64>,
}

/// Accept an explicit `null` where a list is expected.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl DetectionAnalysis {
    /// Overall status, defaulting to `partial` when the model omitted it.
    pub fn status(&self) -> PpeStatus {
        self.overall_status.unwrap_or(PpeStatus::DEFAULT)
    }

    /// Average confidence, defaulting to [`DEFAULT_CONFIDENCE`].
    pub fn confidence(&self) -> f64 {
        self.avg_confidence.unwrap_or(DEFAULT_CONFIDENCE)
    }

    /// Split the `missing` list into known categories and unrecognised labels.
    ///
    /// Duplicates are collapsed so a category yields at most one violation.
    pub fn missing_categories(&self) -> (Vec<PpeType>, Vec<String>) {
        let mut known = Vec::with_capacity(self.missing.len());
        let mut unknown = Vec::new();
        for label in &self.missing {
            match PpeType::from_label(label) {
                Some(t) if !known.contains(&t) => known.push(t),
                Some(_) => {}
                None => unknown.push(label.clone()),
            }
        }
        (known, unknown)
    }
}

/// The fixed result used when the model answer cannot be parsed.
pub fn fallback_analysis() -> DetectionAnalysis {
    DetectionAnalysis {
        detected: vec![
            DetectedItem {
                item_type: PpeType::Helmet.as_str().to_string(),
                confidence: 85.0,
                location: Some("head area".to_string()),
                status: PpeStatus::Compliant,
            },
            DetectedItem {
                item_type: PpeType::Vest.as_str().to_string(),
                confidence: 90.0,
                location: Some("torso".to_string()),
                status: PpeStatus::Compliant,
            },
        ],
        missing: vec![
            PpeType::Gloves.as_str().to_string(),
            PpeType::Mask.as_str().to_string(),
        ],
        overall_status: Some(PpeStatus::Partial),
        avg_confidence: Some(87.5),
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Result of interpreting a model answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The answer contained a valid detection object.
    Parsed(DetectionAnalysis),
    /// The answer was unusable; `analysis` is [`fallback_analysis`].
    Fallback {
        analysis: DetectionAnalysis,
        reason: String,
    },
}

impl ParseOutcome {
    pub fn analysis(&self) -> &DetectionAnalysis {
        match self {
            ParseOutcome::Parsed(analysis) | ParseOutcome::Fallback { analysis, .. } => analysis,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }

    /// JSON payload to persist. Fallback results carry `"fallback": true` so
    /// substituted data can be told apart from real model output.
    pub fn payload(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self.analysis()).unwrap_or(serde_json::Value::Null);
        if let (true, Some(obj)) = (self.is_fallback(), value.as_object_mut()) {
            obj.insert("fallback".to_string(), serde_json::Value::Bool(true));
        }
        value
    }
}

/// Locate the JSON object inside a model answer.
///
/// Prefers the body of a fenced code block; otherwise takes the span from the
/// first `{` to the last `}`. Returns `None` when no object-like span exists.
pub fn extract_json_object(answer: &str) -> Option<&str> {
    if let Some(body) = FENCED_BLOCK_RE
        .captures(answer)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
    {
        if body.starts_with('{') {
            return Some(body);
        }
    }

    let start = answer.find('{')?;
    let end = answer.rfind('}')?;
    (end > start).then(|| &answer[start..=end])
}

/// Strictly parse and validate a detection object.
pub fn parse_analysis(json: &str) -> Result<DetectionAnalysis, CoreError> {
    let analysis: DetectionAnalysis = serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("Malformed detection object: {e}")))?;
    analysis.validate()?;
    Ok(analysis)
}

/// Interpret a raw model answer, falling back to the fixed default result.
pub fn parse_model_answer(answer: &str) -> ParseOutcome {
    let Some(json) = extract_json_object(answer) else {
        return ParseOutcome::Fallback {
            analysis: fallback_analysis(),
            reason: "no JSON object found in model answer".to_string(),
        };
    };

    match parse_analysis(json) {
        Ok(analysis) => ParseOutcome::Parsed(analysis),
        Err(e) => ParseOutcome::Fallback {
            analysis: fallback_analysis(),
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const BARE: &str = r#"{
  "detected": [{"type": "helmet", "confidence": 95, "location": "top of head", "status": "compliant"}],
  "missing": ["mask", "gloves"],
  "overallStatus": "violation",
  "avgConfidence": 87.5
}"#;

    #[test]
    fn parses_bare_object() {
        let outcome = parse_model_answer(BARE);
        let analysis = assert_matches!(outcome, ParseOutcome::Parsed(a) => a);
        assert_eq!(analysis.detected.len(), 1);
        assert_eq!(analysis.detected[0].item_type, "helmet");
        assert_eq!(analysis.status(), PpeStatus::Violation);
        assert_eq!(analysis.confidence(), 87.5);
    }

    #[test]
    fn fenced_block_parses_same_as_bare() {
        let fenced = format!("```json\n{BARE}\n```");
        assert_eq!(parse_model_answer(&fenced), parse_model_answer(BARE));

        let untagged = format!("```\n{BARE}\n```");
        assert_eq!(parse_model_answer(&untagged), parse_model_answer(BARE));
    }

    #[test]
    fn object_surrounded_by_prose_is_found() {
        let answer = format!("Here is the analysis you asked for:\n{BARE}\nLet me know!");
        assert_matches!(parse_model_answer(&answer), ParseOutcome::Parsed(_));
    }

    #[test]
    fn garbage_falls_back_with_tag() {
        let outcome = parse_model_answer("I cannot analyze this image.");
        assert!(outcome.is_fallback());
        assert_eq!(outcome.analysis(), &fallback_analysis());
    }

    #[test]
    fn out_of_range_confidence_falls_back() {
        let answer = r#"{"detected": [{"type": "vest", "confidence": 140, "status": "compliant"}],
                         "missing": [], "overallStatus": "compliant", "avgConfidence": 140}"#;
        let outcome = parse_model_answer(answer);
        let reason = assert_matches!(outcome, ParseOutcome::Fallback { reason, .. } => reason);
        assert!(reason.contains("Validation"), "unexpected reason: {reason}");
    }

    #[test]
    fn unknown_status_falls_back() {
        let answer = r#"{"missing": [], "overallStatus": "mostly fine"}"#;
        assert!(parse_model_answer(answer).is_fallback());
    }

    #[test]
    fn omitted_fields_use_defaults() {
        let outcome = parse_model_answer(r#"{"missing": ["boots"]}"#);
        let analysis = outcome.analysis();
        assert!(!outcome.is_fallback());
        assert!(analysis.detected.is_empty());
        assert_eq!(analysis.status(), PpeStatus::Partial);
        assert_eq!(analysis.confidence(), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn fallback_payload_is_tagged() {
        let outcome = parse_model_answer("nope");
        let payload = outcome.payload();
        assert_eq!(payload["fallback"], true);
        assert_eq!(payload["overallStatus"], "partial");
        assert_eq!(payload["missing"], serde_json::json!(["gloves", "mask"]));

        let parsed = parse_model_answer(BARE).payload();
        assert!(parsed.get("fallback").is_none());
    }

    #[test]
    fn missing_categories_normalizes_and_dedups() {
        let analysis = DetectionAnalysis {
            detected: vec![],
            missing: vec![
                "Gloves".into(),
                "face mask".into(),
                "gloves".into(),
                "ear protection".into(),
            ],
            overall_status: None,
            avg_confidence: None,
        };
        let (known, unknown) = analysis.missing_categories();
        assert_eq!(known, vec![PpeType::Gloves, PpeType::Mask]);
        assert_eq!(unknown, vec!["ear protection".to_string()]);
    }

    #[test]
    fn null_lists_read_as_empty() {
        let answer = r#"{"detected":[{"type":"helmet","confidence":97,"status":"compliant"}],"missing":null,"overallStatus":"compliant","avgConfidence":97}"#;
        let analysis = assert_matches!(parse_model_answer(answer), ParseOutcome::Parsed(a) => a);
        assert!(analysis.missing.is_empty());
        assert_eq!(analysis.status(), PpeStatus::Compliant);
        assert_eq!(analysis.confidence(), 97.0);
        assert!(analysis.missing_categories().0.is_empty());

        let analysis = assert_matches!(
            parse_model_answer(r#"{"detected":null,"missing":["gloves"]}"#),
            ParseOutcome::Parsed(a) => a
        );
        assert!(analysis.detected.is_empty());
        assert_eq!(analysis.missing, vec!["gloves".to_string()]);
    }

    #[test]
    fn extract_returns_none_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
