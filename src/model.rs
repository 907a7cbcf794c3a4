// src/model.rs
//! Shared vocabulary: steps and signals produced by extractors, the canonical
//! status they normalize into, and the ledger's record type.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::consts::UNKNOWN_CARRIER;
use crate::core::sanitize::normalize_ws;

/// One milestone in a shipment's lifecycle, in the order it was encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    pub text: String,
    pub completed: bool,
    pub is_delivery_milestone: bool,
    pub sequence: usize,
    /// Date/time text as the source reported it, if any.
    pub occurred_at: Option<String>,
}

impl ProgressStep {
    /// Build a step from raw text; the delivery-milestone flag is derived from the text.
    pub fn new(sequence: usize, text: &str, completed: bool) -> Self {
        let text = normalize_ws(text);
        Self {
            is_delivery_milestone: is_delivery_text(&text),
            text,
            completed,
            sequence,
            occurred_at: None,
        }
    }
}

/// "Delivered" / "Delivery" rows are delivery milestones; "Out for Delivery" is not.
pub fn is_delivery_text(text: &str) -> bool {
    let lc = text.to_lowercase();
    lc.contains("delivered") || (lc.contains("delivery") && !lc.contains("out for delivery"))
}

/// Raw evidence gathered by an extractor or endpoint before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingSignals {
    pub steps: Vec<ProgressStep>,
    pub explicit_delivered_marker_present: bool,
    pub page_level_status_text: Option<String>,
}

impl TrackingSignals {
    /// Assemble steps from `(text, completed)` pairs. Blank texts are dropped and
    /// the survivors numbered densely from 0.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let steps = rows
            .into_iter()
            .filter(|(text, _)| !text.trim().is_empty())
            .enumerate()
            .map(|(seq, (text, completed))| ProgressStep::new(seq, text, completed))
            .collect();
        Self { steps, ..Self::default() }
    }

    pub fn with_page_status(mut self, text: Option<String>) -> Self {
        self.page_level_status_text = text
            .map(|t| normalize_ws(&t))
            .filter(|t| !t.is_empty());
        self
    }

    /// Nothing usable: no steps and no page-level text.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.page_level_status_text.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalStatus {
    Delivered,
    OutForDelivery,
    InTransit,
    Pending,
    Unknown,
}

impl CanonicalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalStatus::Delivered => "Delivered",
            CanonicalStatus::OutForDelivery => "Out for Delivery",
            CanonicalStatus::InTransit => "In Transit",
            CanonicalStatus::Pending => "Pending",
            CanonicalStatus::Unknown => "Unknown",
        }
    }

    pub fn is_delivered(self) -> bool { self == CanonicalStatus::Delivered }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case a carrier name; blank or absent becomes `"unknown"`.
pub fn normalize_carrier(carrier: Option<&str>) -> String {
    match carrier.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_lowercase(),
        _ => UNKNOWN_CARRIER.to_string(),
    }
}

/// Deduplication key: trimmed tracking number plus lower-cased carrier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub tracking_number: String,
    pub carrier: String,
}

impl IdentityKey {
    pub fn new(tracking_number: &str, carrier: Option<&str>) -> Self {
        Self {
            tracking_number: tracking_number.trim().to_string(),
            carrier: normalize_carrier(carrier),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.tracking_number, self.carrier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentRecord {
    pub tracking_number: String,
    pub carrier: String,
    pub status: CanonicalStatus,
    pub steps: Vec<ProgressStep>,
    pub label: Option<String>,
    /// `None` only for persisted records whose timestamp could not be read.
    pub last_updated: Option<DateTime<Utc>>,
}

impl ShipmentRecord {
    pub fn new(
        tracking_number: &str,
        carrier: Option<&str>,
        status: CanonicalStatus,
        steps: Vec<ProgressStep>,
        label: Option<&str>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            tracking_number: tracking_number.trim().to_string(),
            carrier: normalize_carrier(carrier),
            status,
            steps,
            label: label.map(str::trim).filter(|l| !l.is_empty()).map(str::to_string),
            last_updated: Some(last_updated),
        }
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(&self.tracking_number, Some(&self.carrier))
    }
}
