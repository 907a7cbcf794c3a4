// src/extract/mod.rs
//! Pull tracking signals out of a rendered page.
//!
//! Strategies run in a fixed order (structured widget, keyword lines, status
//! selectors) and the first one that finds anything wins. Delivered markers
//! are read from the whole page separately and merged into the winner.

pub mod fallback;
pub mod keywords;
pub mod markers;
pub mod milestones;

use crate::cascade::Cascade;
use crate::core::dom::Document;
use crate::error::ExtractionFailure;
use crate::model::TrackingSignals;

pub use fallback::StatusSelectors;
pub use keywords::KeywordLines;
pub use milestones::MilestoneWidget;

/// Which strategy produced the signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub strategy: String,
    pub signals: TrackingSignals,
}

pub struct Extractor {
    cascade: Cascade<'static, Document, TrackingSignals>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            cascade: Cascade::new()
                .then(MilestoneWidget)
                .then(KeywordLines::default())
                .then(StatusSelectors),
        }
    }
}

impl Extractor {
    pub fn new() -> Self { Self::default() }

    pub fn strategy_names(&self) -> Vec<&str> { self.cascade.names() }

    pub fn extract_detailed(&self, doc: &Document) -> Result<Extraction, ExtractionFailure> {
        let marker = markers::delivered_marker_present(doc);
        let Some(hit) = self.cascade.run(doc) else {
            log::info!("extract: no strategy matched (marker={marker})");
            return Err(ExtractionFailure::NotFound);
        };
        let mut signals = hit.output;
        signals.explicit_delivered_marker_present |= marker;
        Ok(Extraction { strategy: hit.name, signals })
    }

    pub fn extract(&self, doc: &Document) -> Result<TrackingSignals, ExtractionFailure> {
        self.extract_detailed(doc).map(|e| e.signals)
    }
}

/// Extract with the default strategy chain.
pub fn extract(doc: &Document) -> Result<TrackingSignals, ExtractionFailure> {
    Extractor::default().extract(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_order() {
        assert_eq!(
            Extractor::new().strategy_names(),
            vec!["milestone-widget", "keyword-lines", "status-selectors"]
        );
    }

    #[test]
    fn marker_is_merged_into_winner() {
        let doc = Document::parse("<p>Delivered On Tuesday</p><p>Front door</p>");
        let e = Extractor::new().extract_detailed(&doc).unwrap();
        assert_eq!(e.strategy, "keyword-lines");
        assert!(e.signals.explicit_delivered_marker_present);
    }

    #[test]
    fn nothing_found() {
        let doc = Document::parse("<html><body><p>Sign in</p></body></html>");
        assert_eq!(extract(&doc), Err(ExtractionFailure::NotFound));
    }
}
