// tests/extraction.rs
//
// Page extraction + normalization on saved carrier pages.
//
use std::fs;
use std::path::PathBuf;

use parcel_track::core::dom::Document;
use parcel_track::error::ExtractionFailure;
use parcel_track::extract::Extractor;
use parcel_track::model::CanonicalStatus;
use parcel_track::normalize::normalize;

fn fixture(name: &str) -> String {
    let p: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name].iter().collect();
    fs::read_to_string(&p).unwrap_or_else(|e| panic!("read {}: {e}", p.display()))
}

fn page(name: &str) -> Document {
    Document::parse(&fixture(name))
}

#[test]
fn ups_widget_wins_over_summary_and_keywords() {
    let e = Extractor::new().extract_detailed(&page("ups_in_transit.html")).unwrap();
    assert_eq!(e.strategy, "milestone-widget");
    assert!(!e.signals.explicit_delivered_marker_present);

    let got: Vec<_> = e.signals.steps.iter().map(|s| (s.text.as_str(), s.completed)).collect();
    assert_eq!(
        got,
        vec![
            ("Label Created", true),
            ("Departed from Facility Louisville, KY", true),
            ("Out for Delivery", false),
            ("Delivered", false),
        ]
    );

    let n = normalize(e.signals);
    assert_eq!(n.status, CanonicalStatus::InTransit);
    assert_eq!(n.status_text, "Departed from Facility Louisville, KY");
}

#[test]
fn delivered_label_overrides_an_unfinished_widget() {
    let e = Extractor::new().extract_detailed(&page("ups_delivered.html")).unwrap();
    assert_eq!(e.strategy, "milestone-widget");
    assert!(e.signals.explicit_delivered_marker_present);
    assert!(!e.signals.steps[3].completed);

    let n = normalize(e.signals);
    assert_eq!(n.status, CanonicalStatus::Delivered);
    assert_eq!(n.status_text, "Delivered");
    assert!(n.steps.iter().all(|s| s.completed));
}

#[test]
fn fedex_latest_completed_step_is_the_status() {
    let e = Extractor::new().extract_detailed(&page("fedex_progress.html")).unwrap();
    assert_eq!(e.strategy, "milestone-widget");
    assert_eq!(e.signals.steps.len(), 5);

    let n = normalize(e.signals);
    assert_eq!(n.status, CanonicalStatus::InTransit);
    assert_eq!(n.status_text, "In transit");
}

#[test]
fn plain_text_dump_falls_back_to_keyword_lines() {
    let doc = Document::from_text(&fixture("keywords_only.txt"));
    let e = Extractor::new().extract_detailed(&doc).unwrap();
    assert_eq!(e.strategy, "keyword-lines");

    let texts: Vec<_> = e.signals.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Your package is In Transit",
            "Arrived at UPS Facility - Hodgkins, IL",
            "Departed from Facility - Louisville, KY",
            "Shipped",
            "Processing at UPS Facility",
        ]
    );
    assert_eq!(normalize(e.signals).status, CanonicalStatus::InTransit);
}

#[test]
fn status_element_is_the_last_resort() {
    let e = Extractor::new().extract_detailed(&page("status_only.html")).unwrap();
    assert_eq!(e.strategy, "status-selectors");
    assert!(e.signals.steps.is_empty());

    let n = normalize(e.signals);
    assert_eq!(n.status, CanonicalStatus::Pending);
    assert_eq!(n.status_text, "Label Created");
}

#[test]
fn login_wall_yields_not_found() {
    assert_eq!(
        Extractor::new().extract(&page("sign_in.html")),
        Err(ExtractionFailure::NotFound)
    );
}

#[test]
fn pathologically_deep_page_still_extracts() {
    let markup = format!("<body>{}<p>In Transit</p></body>", "<div>".repeat(200_000));
    let e = Extractor::new().extract_detailed(&Document::parse(&markup)).unwrap();
    assert_eq!(e.strategy, "keyword-lines");
    assert_eq!(normalize(e.signals).status, CanonicalStatus::InTransit);
}
