// src/runner.rs
//! Wiring for the user-facing flows: track one shipment (via the tracking
//! service or from a page), and re-probe every undelivered shipment.
//!
//! `progress` can be None (no UI updates) or Some(&mut impl Progress).

use std::sync::mpsc;
use std::thread;

use chrono::{DateTime, Utc};

use crate::core::dom::Document;
use crate::core::net;
use crate::error::{ExtractionFailure, LedgerError, ProbeFailure, TrackError};
use crate::extract::Extractor;
use crate::ledger::{ShipmentLedger, UpsertOutcome};
use crate::model::{normalize_carrier, ShipmentRecord, TrackingSignals};
use crate::normalize::{normalize, Normalized};
use crate::payload::RawPayload;
use crate::probe::{EndpointProbe, ProbeCandidate, Transport};
use crate::progress::Progress;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    pub tracking_number: String,
    pub carrier: Option<String>,
    pub label: Option<String>,
}

impl TrackRequest {
    pub fn new(tracking_number: &str, carrier: Option<&str>, label: Option<&str>) -> Self {
        Self {
            tracking_number: tracking_number.trim().to_string(),
            carrier: carrier.map(str::to_string),
            label: label.map(str::to_string),
        }
    }

    fn validate(&self) -> Result<(), TrackError> {
        if self.tracking_number.is_empty() {
            return Err(TrackError::MissingTrackingNumber);
        }
        Ok(())
    }

    pub fn carrier(&self) -> String { normalize_carrier(self.carrier.as_deref()) }
}

/// Result of one tracking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
    pub record: ShipmentRecord,
    pub status_text: String,
    /// `None` when nothing was found and the ledger was left alone.
    pub upsert: Option<UpsertOutcome>,
    /// Which strategy or route produced the answer.
    pub source: String,
}

fn build_record(req: &TrackRequest, normalized: Normalized, at: DateTime<Utc>) -> (ShipmentRecord, String) {
    let record = ShipmentRecord::new(
        &req.tracking_number,
        req.carrier.as_deref(),
        normalized.status,
        normalized.steps,
        req.label.as_deref(),
        at,
    );
    (record, normalized.status_text)
}

fn evict_quietly<S: KeyValueStore>(ledger: &mut ShipmentLedger<S>) {
    if let Err(e) = ledger.evict_expired() {
        log::error!("runner: eviction after upsert failed: {e}");
    }
}

fn commit<S: KeyValueStore>(
    ledger: &mut ShipmentLedger<S>,
    req: &TrackRequest,
    signals: TrackingSignals,
    at: DateTime<Utc>,
    source: String,
) -> Result<TrackOutcome, TrackError> {
    let (record, status_text) = build_record(req, normalize(signals), at);
    let upsert = ledger.upsert(record.clone())?;
    evict_quietly(ledger);
    log::info!("runner: {} -> {} via {}", record.key(), record.status, source);
    Ok(TrackOutcome { record, status_text, upsert: Some(upsert), source })
}

/// Ask the tracking service, normalize, record.
pub fn track_via_probe<T: Transport, S: KeyValueStore>(
    probe: &EndpointProbe<T>,
    candidates: &[ProbeCandidate],
    ledger: &mut ShipmentLedger<S>,
    req: &TrackRequest,
) -> Result<TrackOutcome, TrackError> {
    req.validate()?;
    let payload = probe.probe(&req.tracking_number, &req.carrier(), candidates)?;
    let at = payload.timestamp().unwrap_or_else(Utc::now);
    commit(ledger, req, payload.signals(), at, "endpoint".to_string())
}

/// Extract from an already-parsed page. A page with nothing on it yields an
/// `Unknown` outcome and does not touch the ledger.
pub fn track_page<S: KeyValueStore>(
    extractor: &Extractor,
    ledger: &mut ShipmentLedger<S>,
    req: &TrackRequest,
    doc: &Document,
) -> Result<TrackOutcome, TrackError> {
    req.validate()?;
    match extractor.extract_detailed(doc) {
        Ok(extraction) => commit(ledger, req, extraction.signals, Utc::now(), extraction.strategy),
        Err(ExtractionFailure::NotFound) => {
            log::info!("runner: nothing extractable for {}", req.tracking_number);
            let (record, status_text) = build_record(req, normalize(TrackingSignals::default()), Utc::now());
            Ok(TrackOutcome { record, status_text, upsert: None, source: "none".to_string() })
        }
    }
}

/// Fetch `url` (plain GET, no rendering) and track from its markup.
pub fn fetch_and_track<S: KeyValueStore>(
    client: &reqwest::blocking::Client,
    url: &str,
    extractor: &Extractor,
    ledger: &mut ShipmentLedger<S>,
    req: &TrackRequest,
) -> Result<TrackOutcome, TrackError> {
    req.validate()?;
    let markup = net::fetch_page(client, url)?;
    let doc = Document::parse(&markup);
    track_page(extractor, ledger, req, &doc)
}

/* ---------------- Bulk refresh ---------------- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub attempted: usize,
    pub updated: usize,
    /// Probe failed or the stored record was already newer.
    pub untouched: usize,
}

type ProbeResult = (usize, Result<RawPayload, ProbeFailure>);

/// Re-probe every undelivered shipment, one thread per shipment (the ledger
/// cap bounds the count). Results are applied one by one in ledger order once all have settled, so
/// the final ordering does not depend on which answer arrived first.
pub fn refresh_pending<T: Transport, S: KeyValueStore>(
    probe: &EndpointProbe<T>,
    candidates: &[ProbeCandidate],
    ledger: &mut ShipmentLedger<S>,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RefreshSummary, LedgerError> {
    ledger.evict_expired()?;
    let pending = ledger.pending();

    if let Some(p) = progress.as_deref_mut() {
        p.begin(pending.len());
        p.log(&format!("Refreshing {} shipment(s)…", pending.len()));
    }
    if pending.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        return Ok(RefreshSummary::default());
    }

    let mut results: Vec<Option<Result<RawPayload, ProbeFailure>>> = vec![None; pending.len()];
    let (tx, rx) = mpsc::channel::<ProbeResult>();

    thread::scope(|scope| {
        for (i, rec) in pending.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let result = probe.probe(&rec.tracking_number, &rec.carrier, candidates);
                if tx.send((i, result)).is_err() {
                    log::warn!("refresh: {} finished after the collector stopped", rec.key());
                }
            });
        }
        drop(tx); // main thread is sole receiver now

        for (i, result) in rx {
            if let Some(p) = progress.as_deref_mut() {
                let what = if result.is_ok() { "ok" } else { "failed" };
                p.item_done(&format!("{} ({what})", pending[i].tracking_number));
            }
            results[i] = Some(result);
        }
    });

    let now = Utc::now();
    let mut summary = RefreshSummary { attempted: pending.len(), ..RefreshSummary::default() };
    for (old, result) in pending.iter().zip(results) {
        let payload = match result {
            Some(Ok(payload)) => payload,
            Some(Err(e)) => {
                log::warn!("refresh: {} left as is: {e}", old.key());
                summary.untouched += 1;
                continue;
            }
            None => {
                log::error!("refresh: {} never reported back", old.key());
                summary.untouched += 1;
                continue;
            }
        };
        let normalized = normalize(payload.signals());
        let record = ShipmentRecord {
            status: normalized.status,
            steps: normalized.steps,
            last_updated: Some(payload.timestamp().unwrap_or(now)),
            ..old.clone()
        };
        match ledger.upsert(record)? {
            UpsertOutcome::KeptExisting => summary.untouched += 1,
            _ => summary.updated += 1,
        }
    }

    ledger.evict_expired()?;
    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!(
            "Refresh done: {} updated, {} unchanged",
            summary.updated, summary.untouched
        ));
        p.finish();
    }
    log::info!("refresh: {summary:?}");
    Ok(summary)
}
