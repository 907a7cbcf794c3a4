// tests/refresh.rs
//
// Bulk refresh: only undelivered records are probed, failures stay contained,
// and the resulting order does not depend on which answer came back first.
//
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use parcel_track::error::TransportError;
use parcel_track::ledger::ShipmentLedger;
use parcel_track::model::{CanonicalStatus, ShipmentRecord};
use parcel_track::probe::{EndpointProbe, ProbeCandidate, ProbeRequest, Transport, TransportResponse};
use parcel_track::progress::Progress;
use parcel_track::runner::{refresh_pending, RefreshSummary};
use parcel_track::store::MemoryStore;

struct ByNumber {
    calls: Mutex<Vec<String>>,
    stale: String,
}

impl Transport for ByNumber {
    fn send(&self, req: &ProbeRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(req.tracking_number.clone());
        let body = match req.tracking_number.as_str() {
            "A" => {
                // Answer last so completion order differs from ledger order.
                thread::sleep(StdDuration::from_millis(50));
                r#"{"status":"Out for Delivery"}"#.to_string()
            }
            "B" => return Err(TransportError::Other("timed out".into())),
            "C" => format!(r#"{{"status":"In Transit","timestamp":"{}"}}"#, self.stale),
            other => panic!("{other} should not have been probed"),
        };
        Ok(TransportResponse { status: 200, body })
    }
}

#[derive(Default)]
struct Recorder {
    total: usize,
    items: Vec<String>,
    finished: bool,
}

impl Progress for Recorder {
    fn begin(&mut self, total: usize) { self.total = total; }
    fn item_done(&mut self, item: &str) { self.items.push(item.to_string()); }
    fn finish(&mut self) { self.finished = true; }
}

#[test]
fn refresh_updates_pending_and_contains_failures() {
    let base = Utc::now() - Duration::hours(1);
    let mut ledger = ShipmentLedger::open(MemoryStore::new());
    for (n, status) in [
        ("D", CanonicalStatus::Delivered),
        ("C", CanonicalStatus::Pending),
        ("B", CanonicalStatus::InTransit),
        ("A", CanonicalStatus::InTransit),
    ] {
        let label = (n == "A").then_some("gift");
        ledger
            .upsert(ShipmentRecord::new(n, Some("ups"), status, Vec::new(), label, base))
            .unwrap();
    }

    let probe = EndpointProbe::new(ByNumber {
        calls: Mutex::new(Vec::new()),
        stale: (base - Duration::days(1)).to_rfc3339(),
    });
    let mut progress = Recorder::default();
    let summary = refresh_pending(
        &probe,
        &[ProbeCandidate::post("/api/track")],
        &mut ledger,
        Some(&mut progress),
    )
    .unwrap();

    assert_eq!(summary, RefreshSummary { attempted: 3, updated: 1, untouched: 2 });

    let mut called = probe.transport().calls.lock().unwrap().clone();
    called.sort();
    assert_eq!(called, vec!["A", "B", "C"]);

    let order: Vec<_> = ledger.records().iter().map(|r| r.tracking_number.as_str()).collect();
    assert_eq!(order, vec!["C", "A", "B", "D"]);

    let a = &ledger.records()[1];
    assert_eq!(a.status, CanonicalStatus::OutForDelivery);
    assert_eq!(a.label.as_deref(), Some("gift"));
    assert!(a.last_updated > Some(base));

    // Kept because the stored record was newer than the answer.
    assert_eq!(ledger.records()[0].status, CanonicalStatus::Pending);
    // Probe failure leaves the record exactly as it was.
    assert_eq!(ledger.records()[2].status, CanonicalStatus::InTransit);

    assert_eq!(progress.total, 3);
    assert_eq!(progress.items.len(), 3);
    assert!(progress.items.iter().any(|i| i == "B (failed)"));
    assert!(progress.finished);
}

#[test]
fn nothing_pending_sends_nothing() {
    let mut ledger = ShipmentLedger::open(MemoryStore::new());
    ledger
        .upsert(ShipmentRecord::new("D", Some("ups"), CanonicalStatus::Delivered, Vec::new(), None, Utc::now()))
        .unwrap();
    let probe = EndpointProbe::new(ByNumber { calls: Mutex::new(Vec::new()), stale: String::new() });

    let summary = refresh_pending(&probe, &ProbeCandidate::defaults(), &mut ledger, None).unwrap();
    assert_eq!(summary, RefreshSummary::default());
    assert!(probe.transport().calls.lock().unwrap().is_empty());
    assert_eq!(ledger.len(), 1);
}

/// Answers only once `expected` requests are waiting at the same time.
struct Rendezvous {
    expected: usize,
    arrived: Mutex<usize>,
    all_in: Condvar,
}

impl Transport for Rendezvous {
    fn send(&self, _req: &ProbeRequest) -> Result<TransportResponse, TransportError> {
        let mut arrived = self.arrived.lock().unwrap();
        *arrived += 1;
        self.all_in.notify_all();
        let (arrived, wait) = self
            .all_in
            .wait_timeout_while(arrived, StdDuration::from_secs(5), |n| *n < self.expected)
            .unwrap();
        if wait.timed_out() {
            return Err(TransportError::Other(format!("only {} of {} in flight", *arrived, self.expected)));
        }
        Ok(TransportResponse { status: 200, body: r#"{"status":"Out for Delivery"}"#.to_string() })
    }
}

#[test]
fn every_pending_shipment_is_in_flight_at_once() {
    let base = Utc::now() - Duration::hours(1);
    let mut ledger = ShipmentLedger::open(MemoryStore::new());
    for n in 0..20 {
        ledger
            .upsert(ShipmentRecord::new(&format!("1Z{n:02}"), Some("ups"), CanonicalStatus::InTransit, Vec::new(), None, base))
            .unwrap();
    }

    let service = EndpointProbe::new(Rendezvous { expected: 20, arrived: Mutex::new(0), all_in: Condvar::new() });
    let summary = refresh_pending(&service, &[ProbeCandidate::post("/api/track")], &mut ledger, None).unwrap();

    assert_eq!(summary, RefreshSummary { attempted: 20, updated: 20, untouched: 0 });
    assert!(ledger.records().iter().all(|r| r.status == CanonicalStatus::OutForDelivery));
}
