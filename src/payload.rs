// src/payload.rs
// JSON answer from a tracking endpoint, mapped onto extractor-shaped signals.
//
// Servers in the wild answer with either `progressSteps` (objects) or the older
// `details` (objects or bare strings). Both are accepted.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::core::sanitize::normalize_ws;
use crate::model::{ProgressStep, TrackingSignals};

#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload(pub Value);

fn str_field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// RFC 3339 text or epoch milliseconds; anything else is `None`.
pub fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(ms).single()
        }
        _ => None,
    }
}

/// Map step entries (objects or bare strings) to numbered steps. Blank or
/// unrecognised entries are dropped before numbering.
pub fn steps_from_values(values: &[Value]) -> Vec<ProgressStep> {
    let mut out = Vec::new();
    for v in values {
        let (text, completed, at) = match v {
            Value::String(s) => (s.as_str(), false, None),
            Value::Object(_) => {
                let Some(text) = str_field(v, &["text", "activityScan", "status"]) else { continue };
                let completed = v.get("completed").and_then(Value::as_bool).unwrap_or(false);
                let at = str_field(v, &["dateTime", "timestamp"]).map(str::to_string);
                (text, completed, at)
            }
            _ => continue,
        };
        let text = normalize_ws(text);
        if text.is_empty() {
            continue;
        }
        let completed = completed || text.to_lowercase().starts_with("past event");
        let mut step = ProgressStep::new(out.len(), &text, completed);
        step.occurred_at = at;
        out.push(step);
    }
    out
}

impl RawPayload {
    /// True when the body carries a truthy `error` member.
    pub fn is_error(&self) -> bool {
        match self.0.get("error") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        if !self.is_error() {
            return None;
        }
        Some(match self.0.get("error") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        })
    }

    fn step_values(&self) -> &[Value] {
        ["progressSteps", "details"]
            .iter()
            .filter_map(|k| self.0.get(*k))
            .filter_map(Value::as_array)
            .find(|a| !a.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Steps in payload order.
    pub fn steps(&self) -> Vec<ProgressStep> {
        steps_from_values(self.step_values())
    }

    pub fn signals(&self) -> TrackingSignals {
        let page_text = str_field(&self.0, &["status", "currentStep"]).map(str::to_string);
        TrackingSignals {
            steps: self.steps(),
            explicit_delivered_marker_present: self.0.get("isDelivered").and_then(Value::as_bool) == Some(true),
            page_level_status_text: None,
        }
        .with_page_status(page_text)
    }

    /// Time the remote side reports for this answer, if it reports one.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.0.get("timestamp").and_then(parse_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_progress_steps_objects() {
        let p = RawPayload(json!({
            "trackingNumber": "1Z",
            "status": "In Transit",
            "isDelivered": false,
            "timestamp": "2026-03-01T10:00:00Z",
            "progressSteps": [
                {"text": "Label Created", "completed": true, "dateTime": "02/27/2026 9:00 A.M."},
                {"activityScan": "  ", "completed": true},
                {"status": "Shipped", "completed": false}
            ]
        }));
        let s = p.signals();
        assert_eq!(s.steps.len(), 2);
        assert_eq!(s.steps[1].sequence, 1);
        assert_eq!(s.steps[0].occurred_at.as_deref(), Some("02/27/2026 9:00 A.M."));
        assert_eq!(s.page_level_status_text.as_deref(), Some("In Transit"));
        assert!(!s.explicit_delivered_marker_present);
        assert_eq!(p.timestamp().unwrap().to_rfc3339(), "2026-03-01T10:00:00+00:00");
    }

    #[test]
    fn tolerates_legacy_string_details_and_epoch_millis() {
        let p = RawPayload(json!({
            "currentStep": "Delivered",
            "isDelivered": true,
            "timestamp": 1_700_000_000_000i64,
            "details": ["Past Event: Label Created", "Delivered"]
        }));
        let s = p.signals();
        assert!(s.explicit_delivered_marker_present);
        assert!(s.steps[0].completed);
        assert!(s.steps[1].is_delivery_milestone);
        assert_eq!(p.timestamp().unwrap().timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn error_member_must_be_truthy() {
        assert!(RawPayload(json!({"error": "Tracking number not found"})).is_error());
        assert!(!RawPayload(json!({"error": null, "status": "x"})).is_error());
        assert!(!RawPayload(json!({"error": ""})).is_error());
        assert!(!RawPayload(json!({"status": "x"})).is_error());
    }
}
