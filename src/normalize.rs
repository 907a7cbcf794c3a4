// src/normalize.rs
//! Collapse raw tracking signals into one canonical status.
//!
//! Precedence, highest first:
//! 1. delivery evidence (page marker, a completed delivery milestone, or every
//!    step completed) gives `Delivered`; a trailing delivery milestone is then
//!    marked completed even if the page under-reported it;
//! 2. the most recently completed step (reverse scan);
//! 3. the earliest step, when nothing is completed yet;
//! 4. the page-level status text.
//!
//! The chosen text is classified by keyword. Carrier-internal placeholder
//! tokens never reach the user.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{CanonicalStatus, ProgressStep, TrackingSignals};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub status: CanonicalStatus,
    /// Human-readable status line: the working text, or the canonical name
    /// when the text was a placeholder or absent.
    pub status_text: String,
    pub steps: Vec<ProgressStep>,
}

/// Leaked resource keys, enum names and template syntax seen on carrier pages.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    r"(?i)\bcms\.[a-z0-9_.\-]+",
    r"^[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)+$",
    r"\{\{[^}]*\}\}",
    r"(?i)^(?:null|undefined|n/a)$",
    r"(?i)status not found",
];

fn placeholder_table() -> &'static [Regex] {
    static TABLE: OnceLock<Vec<Regex>> = OnceLock::new();
    TABLE.get_or_init(|| {
        PLACEHOLDER_PATTERNS
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::error!("normalize: bad placeholder pattern {p:?}: {e}");
                    None
                }
            })
            .collect()
    })
}

pub fn is_placeholder(text: &str) -> bool {
    let text = text.trim();
    placeholder_table().iter().any(|re| re.is_match(text))
}

/// Keyword classification, case-insensitive, first matching class wins.
pub fn classify(text: &str) -> CanonicalStatus {
    let lc = text.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| lc.contains(w));
    if lc.contains("delivered") {
        CanonicalStatus::Delivered
    } else if lc.contains("out for delivery") {
        CanonicalStatus::OutForDelivery
    } else if any(&["transit", "shipped", "departed", "arrived"]) {
        CanonicalStatus::InTransit
    } else if any(&["pending", "processing", "label"]) {
        CanonicalStatus::Pending
    } else {
        CanonicalStatus::Unknown
    }
}

fn delivery_evidence(signals: &TrackingSignals) -> bool {
    let steps = &signals.steps;
    signals.explicit_delivered_marker_present
        || steps.iter().any(|s| s.is_delivery_milestone && s.completed)
        || (!steps.is_empty() && steps.iter().all(|s| s.completed))
}

pub fn normalize(signals: TrackingSignals) -> Normalized {
    if delivery_evidence(&signals) {
        let mut steps = signals.steps;
        if let Some(last) = steps.iter_mut().max_by_key(|s| s.sequence) {
            if last.is_delivery_milestone {
                last.completed = true;
            }
        }
        return Normalized {
            status: CanonicalStatus::Delivered,
            status_text: CanonicalStatus::Delivered.to_string(),
            steps,
        };
    }

    let steps = signals.steps;
    let latest_completed = steps
        .iter()
        .filter(|s| s.completed)
        .max_by_key(|s| s.sequence);
    let earliest = steps.iter().min_by_key(|s| s.sequence);

    let working = latest_completed
        .or(earliest)
        .map(|s| s.text.clone())
        .or(signals.page_level_status_text);

    let Some(working) = working else {
        return Normalized {
            status: CanonicalStatus::Unknown,
            status_text: CanonicalStatus::Unknown.to_string(),
            steps,
        };
    };

    if is_placeholder(&working) {
        log::debug!("normalize: placeholder status {working:?} suppressed");
        // Delivery evidence was already ruled out above.
        return Normalized {
            status: CanonicalStatus::Unknown,
            status_text: CanonicalStatus::Unknown.to_string(),
            steps,
        };
    }

    Normalized { status: classify(&working), status_text: working, steps }
}
