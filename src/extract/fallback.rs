// src/extract/fallback.rs
// Last resort: a single status element somewhere on the page.

use crate::cascade::Strategy;
use crate::core::dom::{Document, Selector};
use crate::model::TrackingSignals;

pub const STATUS_SELECTORS: &[Selector<'static>] = &[
    Selector::class("ups-tracking-summary-status"),
    Selector::class("ups-tracking-status"),
    Selector::attr_eq("data-testid", "tracking-status"),
    Selector::class("status-text"),
    Selector::class("tracking-status"),
];

pub struct StatusSelectors;

impl Strategy<Document, TrackingSignals> for StatusSelectors {
    fn name(&self) -> &str { "status-selectors" }

    fn attempt(&self, doc: &Document) -> Option<TrackingSignals> {
        let text = STATUS_SELECTORS
            .iter()
            .filter_map(|sel| doc.select_first(Document::ROOT, sel))
            .map(|n| doc.text_one_line(n))
            .find(|t| !t.is_empty())?;
        Some(TrackingSignals::default().with_page_status(Some(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_matches_in_priority_order() {
        let doc = Document::parse(
            r#"<div class="ups-tracking-status">  </div>
               <div class="tracking-status">Label Created</div>
               <div data-testid="tracking-status">Exception</div>"#,
        );
        let s = StatusSelectors.attempt(&doc).unwrap();
        assert!(s.steps.is_empty());
        assert_eq!(s.page_level_status_text.as_deref(), Some("Exception"));
    }
}
