// src/extract/milestones.rs
//! Structured progress widgets: a container holding one row per milestone.
//!
//! Carriers render the same idea differently, so each known widget is a
//! (container, row) selector pair. The first widget that yields at least one
//! non-blank row is used.

use crate::cascade::Strategy;
use crate::core::dom::{Document, NodeId, Selector};
use crate::model::TrackingSignals;

use super::markers::is_check_icon;

pub struct Widget {
    pub name: &'static str,
    /// Tried in order; the first match is the container.
    pub containers: &'static [Selector<'static>],
    pub rows: Selector<'static>,
}

pub const WIDGETS: &[Widget] = &[
    Widget {
        name: "ups-milestones",
        containers: &[
            Selector::tag("milestone-progress-bar").and_id("stApp_shpmtProgress"),
            Selector::tag("milestone-progress-bar"),
            Selector::id("stApp_shpmtProgress"),
        ],
        rows: Selector::tag("tr").and_id_prefix("stApp_ShpmtProg_LVP_progress_row_"),
    },
    Widget {
        name: "fedex-progress",
        containers: &[Selector::class("shipment-status-progress-container")],
        rows: Selector::class("shipment-status-progress-step"),
    },
    Widget {
        name: "ups-legacy-progress",
        containers: &[Selector::class("ups-tracking-progress-container")],
        rows: Selector::class("ups-progress-section"),
    },
];

const PAST_CLASSES: &[&str] = &["ups-progress_past_row", "complete", "completed"];
const CHECK_GLYPHS: &[char] = &['✓', '✔', '✅'];

fn row_completed(doc: &Document, row: NodeId, text: &str) -> bool {
    text.contains(CHECK_GLYPHS)
        || doc.any_in_subtree(row, |el| {
            PAST_CLASSES.iter().any(|c| el.has_class(c)) || is_check_icon(el)
        })
}

fn read_widget(doc: &Document, widget: &Widget) -> Option<TrackingSignals> {
    let container = widget
        .containers
        .iter()
        .find_map(|sel| doc.select_first(Document::ROOT, sel))?;

    let rows: Vec<(String, bool)> = doc
        .select_all(container, &widget.rows)
        .into_iter()
        .map(|row| {
            let raw = doc.text_one_line(row);
            let completed = row_completed(doc, row, &raw);
            let text = raw
                .trim_matches(|c: char| CHECK_GLYPHS.contains(&c) || c.is_whitespace())
                .to_string();
            (text, completed)
        })
        .collect();

    let signals = TrackingSignals::from_rows(rows.iter().map(|(t, c)| (t.as_str(), *c)));
    if signals.steps.is_empty() {
        log::debug!("milestones: {} container found but no usable rows", widget.name);
        return None;
    }
    log::debug!("milestones: {} gave {} step(s)", widget.name, signals.steps.len());
    Some(signals)
}

pub struct MilestoneWidget;

impl Strategy<Document, TrackingSignals> for MilestoneWidget {
    fn name(&self) -> &str { "milestone-widget" }

    fn attempt(&self, doc: &Document) -> Option<TrackingSignals> {
        WIDGETS.iter().find_map(|w| read_widget(doc, w))
    }
}
