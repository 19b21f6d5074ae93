//! The alert record data model.
//!
//! An [`Alert`] is a single detection event emitted by the video detector:
//! an event class, a confidence score, a detection timestamp, and a
//! time-limited URL to the recorded clip. Alerts are immutable once created;
//! the reconciler only ever inserts and evicts whole records.
//!
//! The wire shape uses the detector backend's field names (`type`,
//! `timestamp`, `presignedUrl`); serde aliases accept the long-form
//! spellings as well.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single detection event record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Opaque unique identifier, assigned by the source
    pub id: String,

    /// Short label describing the detected event class
    #[serde(rename = "type", alias = "category")]
    pub category: String,

    /// Detection confidence in [0.0, 1.0]
    pub confidence: f64,

    /// Detection time, milliseconds since epoch. Informative only: not
    /// guaranteed strictly increasing across the merged sources.
    #[serde(rename = "timestamp", alias = "detectedAt", alias = "detected_at")]
    pub detected_at: i64,

    /// Opaque time-limited URL to the recorded clip. May expire; never
    /// validated here.
    #[serde(
        rename = "presignedUrl",
        alias = "clipReference",
        alias = "clip_reference"
    )]
    pub clip_reference: String,
}

/// Why a single alert entry was rejected at the ingestion edge.
#[derive(Debug, Error)]
pub enum InvalidAlert {
    /// The payload did not decode as an alert record at all
    #[error("undecodable alert payload: {0}")]
    Undecodable(#[from] serde_json::Error),

    /// The `id` field is empty
    #[error("alert id is empty")]
    EmptyId,

    /// Confidence outside the valid range (also rejects NaN)
    #[error("confidence {0} outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),
}

impl Alert {
    /// Check the well-formedness rules: non-empty `id`, confidence within
    /// [0.0, 1.0]. Malformed alerts are dropped at the edge, never stored.
    pub fn validate(&self) -> Result<(), InvalidAlert> {
        if self.id.is_empty() {
            return Err(InvalidAlert::EmptyId);
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(InvalidAlert::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }

    /// Decode and validate one alert from a JSON value (one snapshot array
    /// element).
    pub fn from_value(value: serde_json::Value) -> Result<Self, InvalidAlert> {
        let alert: Alert = serde_json::from_value(value)?;
        alert.validate()?;
        Ok(alert)
    }

    /// Decode and validate one alert from a JSON text line (one push
    /// message).
    pub fn from_json_line(line: &str) -> Result<Self, InvalidAlert> {
        let alert: Alert = serde_json::from_str(line)?;
        alert.validate()?;
        Ok(alert)
    }

    /// Confidence formatted as a percentage for display, e.g. `91.0%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }

    /// Detection time rendered in the local timezone, or the raw millisecond
    /// value when out of chrono's representable range.
    pub fn detected_at_local(&self) -> String {
        match chrono::DateTime::from_timestamp_millis(self.detected_at) {
            Some(utc) => utc
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => format!("{} ms", self.detected_at),
        }
    }
}

/// The snapshot endpoint's response envelope: `{ "alerts": [ ... ] }`.
///
/// Entries are kept as raw JSON values so that one malformed element cannot
/// fail the whole response; per-entry decoding happens in
/// [`SnapshotEnvelope::into_alerts`].
#[derive(Debug, Deserialize)]
pub struct SnapshotEnvelope {
    pub alerts: Vec<serde_json::Value>,
}

impl SnapshotEnvelope {
    /// Decode each entry individually, dropping malformed ones with a
    /// warning. Valid entries in the same batch are unaffected.
    pub fn into_alerts(self) -> Vec<Alert> {
        self.alerts
            .into_iter()
            .filter_map(|value| match Alert::from_value(value) {
                Ok(alert) => Some(alert),
                Err(reason) => {
                    tracing::warn!(%reason, "dropping malformed snapshot entry");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: &str, confidence: f64) -> Alert {
        Alert {
            id: id.to_string(),
            category: "Gun Detected".to_string(),
            confidence,
            detected_at: 1_700_000_000_000,
            clip_reference: "https://clips.example/a.mp4".to_string(),
        }
    }

    #[test]
    fn test_wire_field_names_decode() {
        let json = r#"{
            "id": "alert-1",
            "type": "Gun Detected",
            "confidence": 0.91,
            "timestamp": 1700000000000,
            "presignedUrl": "https://clips.example/a.mp4"
        }"#;
        let a: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(a.id, "alert-1");
        assert_eq!(a.category, "Gun Detected");
        assert_eq!(a.detected_at, 1_700_000_000_000);
        assert_eq!(a.clip_reference, "https://clips.example/a.mp4");
    }

    #[test]
    fn test_long_form_aliases_decode() {
        let json = r#"{
            "id": "alert-2",
            "category": "Intrusion",
            "confidence": 0.5,
            "detectedAt": 1700000000001,
            "clipReference": "https://clips.example/b.mp4"
        }"#;
        let a: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(a.category, "Intrusion");
        assert_eq!(a.detected_at, 1_700_000_000_001);
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        assert!(matches!(
            alert("", 0.5).validate(),
            Err(InvalidAlert::EmptyId)
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        assert!(alert("a", 1.7).validate().is_err());
        assert!(alert("a", -0.1).validate().is_err());
        assert!(alert("a", f64::NAN).validate().is_err());
        assert!(alert("a", 0.0).validate().is_ok());
        assert!(alert("a", 1.0).validate().is_ok());
    }

    #[test]
    fn test_envelope_drops_only_malformed_entries() {
        let json = r#"{
            "alerts": [
                {"id": "a", "type": "Gun", "confidence": 0.9, "timestamp": 1, "presignedUrl": "u"},
                {"id": "b", "type": "Gun", "confidence": 1.7, "timestamp": 2, "presignedUrl": "u"},
                {"type": "no-id", "confidence": 0.5, "timestamp": 3, "presignedUrl": "u"},
                {"id": "c", "type": "Gun", "confidence": 0.5, "timestamp": 4, "presignedUrl": "u"}
            ]
        }"#;
        let envelope: SnapshotEnvelope = serde_json::from_str(json).unwrap();
        let alerts = envelope.into_alerts();
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_from_json_line() {
        let line = r#"{"id":"p1","type":"Gun","confidence":0.8,"timestamp":5,"presignedUrl":"u"}"#;
        let a = Alert::from_json_line(line).unwrap();
        assert_eq!(a.id, "p1");

        assert!(Alert::from_json_line("not json").is_err());
    }

    #[test]
    fn test_confidence_percent_display() {
        assert_eq!(alert("a", 0.91).confidence_percent(), "91.0%");
    }
}
