// tests/normalizer.rs
//
// Exhaustive check over every completion pattern of a typical four-step
// timeline, plus the marker override.
//
use parcel_track::model::{CanonicalStatus, TrackingSignals};
use parcel_track::normalize::normalize;

const TIMELINE: [&str; 4] = ["Label Created", "Shipped", "Out for Delivery", "Delivered"];

fn timeline(mask: u8) -> TrackingSignals {
    TrackingSignals::from_rows(TIMELINE.iter().enumerate().map(|(i, t)| (*t, mask & (1 << i) != 0)))
}

#[test]
fn every_completion_pattern() {
    for mask in 0u8..16 {
        let n = normalize(timeline(mask));
        let delivered_done = mask & 0b1000 != 0;
        let all_done = mask == 0b1111;

        if delivered_done || all_done {
            assert_eq!(n.status, CanonicalStatus::Delivered, "mask {mask:04b}");
            assert!(n.steps[3].completed, "mask {mask:04b}");
            continue;
        }

        // Highest completed index, else the first step.
        let idx = (0..4).rev().find(|i| mask & (1 << i) != 0).unwrap_or(0);
        assert_eq!(n.status_text, TIMELINE[idx], "mask {mask:04b}");
        let expected = match idx {
            0 => CanonicalStatus::Pending,
            1 => CanonicalStatus::InTransit,
            2 => CanonicalStatus::OutForDelivery,
            _ => unreachable!(),
        };
        assert_eq!(n.status, expected, "mask {mask:04b}");
        // Steps pass through untouched when not delivered.
        assert_eq!(n.steps, timeline(mask).steps, "mask {mask:04b}");
    }
}

#[test]
fn page_marker_beats_any_step_pattern() {
    for mask in 0u8..16 {
        let mut s = timeline(mask);
        s.explicit_delivered_marker_present = true;
        let n = normalize(s);
        assert_eq!(n.status, CanonicalStatus::Delivered);
        assert!(n.steps[3].completed);
        // Earlier steps keep whatever the page said.
        for i in 0..3 {
            assert_eq!(n.steps[i].completed, mask & (1 << i) != 0);
        }
    }
}

#[test]
fn page_text_only_used_without_steps() {
    let with_steps = timeline(0b0001).with_page_status(Some("Delivered".into()));
    assert_eq!(normalize(with_steps).status, CanonicalStatus::Pending);

    let bare = TrackingSignals::default().with_page_status(Some("Out For Delivery Today".into()));
    let n = normalize(bare);
    assert_eq!(n.status, CanonicalStatus::OutForDelivery);
    assert_eq!(n.status_text, "Out For Delivery Today");
}
