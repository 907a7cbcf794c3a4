// src/extract/markers.rs
// Page-level "this parcel is delivered" evidence, independent of the step list.

use crate::core::dom::{Document, Element, Selector};

const DELIVERED_LABEL_ID: &str = "DelvdLabel";
const DELIVERED_ON_TEXT: &str = "Delivered On";
const DELIVERED_ATTR: &str = "data-delivered";

/// `<i>`, `<svg>` or `<span>` styled as an icon.
pub fn is_icon(el: &Element) -> bool {
    matches!(el.tag.as_str(), "i" | "svg" | "span")
        && el.classes().any(|c| c.to_ascii_lowercase().contains("icon"))
}

/// An icon whose classes also name a check mark.
pub fn is_check_icon(el: &Element) -> bool {
    is_icon(el) && el.classes().any(|c| c.to_ascii_lowercase().contains("check"))
}

pub fn delivered_marker_present(doc: &Document) -> bool {
    let label_with_icon = doc
        .select_all(Document::ROOT, &Selector::id_contains(DELIVERED_LABEL_ID))
        .into_iter()
        .any(|label| {
            doc.descendants(label)
                .into_iter()
                .any(|n| doc.element(n).is_some_and(|el| el.tag == "i" || is_icon(el)))
        });
    if label_with_icon {
        return true;
    }

    let flagged = doc
        .select_all(Document::ROOT, &Selector::attr(DELIVERED_ATTR))
        .into_iter()
        .filter_map(|n| doc.element(n)?.attr(DELIVERED_ATTR))
        .any(is_truthy);
    if flagged || doc.select_first(Document::ROOT, &Selector::class("delivered-confirmation")).is_some() {
        return true;
    }

    doc.visible_lines().iter().any(|l| l.contains(DELIVERED_ON_TEXT))
}

/// Bare boolean attribute, `true` or `1`.
fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "" | "true" | "1")
}
