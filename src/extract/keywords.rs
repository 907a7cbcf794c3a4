// src/extract/keywords.rs
// Unstructured fallback: visible lines that mention a status keyword.
// Completion cannot be read off plain text, so every step is left incomplete.

use crate::cascade::Strategy;
use crate::config::consts::KEYWORD_LINE_LIMIT;
use crate::core::dom::Document;
use crate::core::sanitize::contains_ci;
use crate::model::TrackingSignals;

pub const KEYWORDS: &[&str] = &[
    "delivered",
    "in transit",
    "out for delivery",
    "pending",
    "shipped",
    "processing",
    "arrived",
    "departed",
];

pub struct KeywordLines {
    pub limit: usize,
}

impl Default for KeywordLines {
    fn default() -> Self { Self { limit: KEYWORD_LINE_LIMIT } }
}

impl Strategy<Document, TrackingSignals> for KeywordLines {
    fn name(&self) -> &str { "keyword-lines" }

    fn attempt(&self, doc: &Document) -> Option<TrackingSignals> {
        let hits: Vec<String> = doc
            .visible_lines()
            .into_iter()
            .filter(|line| KEYWORDS.iter().any(|k| contains_ci(line, k)))
            .take(self.limit)
            .collect();
        let first = hits.first().cloned()?;
        Some(TrackingSignals::from_rows(hits.iter().map(|l| (l.as_str(), false))).with_page_status(Some(first)))
    }
}
