// src/ledger.rs
//! Deduplicated, capped, time-bounded history of tracked shipments.
//!
//! The ledger owns its records exclusively. Every mutation re-reads the
//! persisted collection, applies the change, and writes the whole collection
//! back; a persisted value that cannot be read is treated as empty and
//! replaced on the next write.
//!
//! Ordering is most-recently-upserted first. At most [`LEDGER_CAP`] records
//! are kept; the tail is dropped. Delivered records older than
//! [`RETENTION_DAYS`] whole days are evicted before every listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::consts::{LEDGER_CAP, LEDGER_KEY, RETENTION_DAYS};
use crate::error::{LedgerError, LedgerReadFailure};
use crate::filter::ShipmentFilter;
use crate::model::{normalize_carrier, IdentityKey, ProgressStep, ShipmentRecord};
use crate::normalize::classify;
use crate::payload::{parse_timestamp, steps_from_values};
use crate::store::KeyValueStore;

/* ---------------- Persisted form ---------------- */

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredStep {
    text: String,
    completed: bool,
    is_delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredShipment {
    tracking_number: String,
    #[serde(default)]
    carrier: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    timestamp: Value,
    #[serde(default)]
    details: Option<Vec<Value>>,
    #[serde(default)]
    label: Option<String>,
}

impl StoredShipment {
    fn from_record(r: &ShipmentRecord) -> Self {
        let details = r
            .steps
            .iter()
            .map(|s| StoredStep {
                text: s.text.clone(),
                completed: s.completed,
                is_delivered: s.is_delivery_milestone,
                date_time: s.occurred_at.clone(),
            })
            .filter_map(|s| serde_json::to_value(s).ok())
            .collect();
        Self {
            tracking_number: r.tracking_number.clone(),
            carrier: Some(r.carrier.clone()),
            status: Some(r.status.to_string()),
            timestamp: r.last_updated.map(|t| Value::String(t.to_rfc3339())).unwrap_or(Value::Null),
            details: Some(details),
            label: Some(r.label.clone().unwrap_or_default()),
        }
    }

    fn into_record(self) -> Option<ShipmentRecord> {
        let tracking_number = self.tracking_number.trim().to_string();
        if tracking_number.is_empty() {
            return None;
        }
        let steps: Vec<ProgressStep> = steps_from_values(self.details.as_deref().unwrap_or(&[]));
        Some(ShipmentRecord {
            tracking_number,
            carrier: normalize_carrier(self.carrier.as_deref()),
            status: classify(self.status.as_deref().unwrap_or("")),
            steps,
            label: self.label.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            last_updated: parse_timestamp(&self.timestamp),
        })
    }
}

/// Decode a persisted collection. Individual malformed entries are skipped.
fn decode(text: &str) -> Result<Vec<ShipmentRecord>, LedgerReadFailure> {
    let entries: Vec<Value> = serde_json::from_str(text)?;
    let mut out = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StoredShipment>(entry) {
            Ok(stored) => match stored.into_record() {
                Some(r) => out.push(r),
                None => log::warn!("ledger: entry {i} has no tracking number, dropped"),
            },
            Err(e) => log::warn!("ledger: entry {i} unreadable, dropped: {e}"),
        }
    }
    Ok(out)
}

fn encode(records: &[ShipmentRecord]) -> Result<String, serde_json::Error> {
    let stored: Vec<StoredShipment> = records.iter().map(StoredShipment::from_record).collect();
    serde_json::to_string_pretty(&stored)
}

/* ---------------- Ledger ---------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// An older (or equally old) record under the same key was replaced.
    Replaced,
    /// The stored record was newer; it was kept and moved to the head.
    KeptExisting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub records: Vec<ShipmentRecord>,
    /// How many expired records the implicit eviction removed.
    pub evicted: usize,
}

pub struct ShipmentLedger<S: KeyValueStore> {
    store: S,
    key: String,
    records: Vec<ShipmentRecord>,
}

/// Delivered and more than the retention window old, in whole days.
pub fn is_expired(r: &ShipmentRecord, now: DateTime<Utc>) -> bool {
    r.status.is_delivered()
        && r.last_updated
            .is_some_and(|t| (now - t).num_days() > RETENTION_DAYS)
}

impl<S: KeyValueStore> ShipmentLedger<S> {
    pub fn open(store: S) -> Self {
        Self::open_with_key(store, LEDGER_KEY)
    }

    pub fn open_with_key(store: S, key: &str) -> Self {
        let mut ledger = Self { store, key: key.to_string(), records: Vec::new() };
        ledger.reload();
        log::info!("ledger: loaded {} record(s) from '{}'", ledger.records.len(), ledger.key);
        ledger
    }

    fn read_persisted(&self) -> Result<Vec<ShipmentRecord>, LedgerReadFailure> {
        let text = self.store.read(&self.key)?.ok_or(LedgerReadFailure::Missing)?;
        decode(&text)
    }

    /// Replace the in-memory view with the persisted one.
    pub fn reload(&mut self) {
        self.records = match self.read_persisted() {
            Ok(records) => records,
            Err(LedgerReadFailure::Missing) => Vec::new(),
            Err(e) => {
                log::error!("ledger: {e}; starting empty");
                Vec::new()
            }
        };
    }

    fn persist(&mut self) -> Result<(), LedgerError> {
        let text = encode(&self.records)?;
        self.store.write(&self.key, &text)?;
        log::debug!("ledger: wrote {} record(s)", self.records.len());
        Ok(())
    }

    pub fn records(&self) -> &[ShipmentRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn store(&self) -> &S { &self.store }

    pub fn get(&self, key: &IdentityKey) -> Option<&ShipmentRecord> {
        self.records.iter().find(|r| r.key() == *key)
    }

    pub fn upsert(&mut self, record: ShipmentRecord) -> Result<UpsertOutcome, LedgerError> {
        self.reload();
        let key = record.key();
        let (survivor, outcome) = match self.records.iter().position(|r| r.key() == key) {
            Some(pos) => {
                let existing = self.records.remove(pos);
                if existing.last_updated > record.last_updated {
                    (existing, UpsertOutcome::KeptExisting)
                } else {
                    (record, UpsertOutcome::Replaced)
                }
            }
            None => (record, UpsertOutcome::Inserted),
        };
        self.records.insert(0, survivor);
        if self.records.len() > LEDGER_CAP {
            let dropped = self.records.len() - LEDGER_CAP;
            self.records.truncate(LEDGER_CAP);
            log::info!("ledger: cap reached, dropped {dropped} oldest record(s)");
        }
        self.persist()?;
        log::info!("ledger: upsert {key} -> {outcome:?}");
        Ok(outcome)
    }

    /// Absent keys are not an error. Returns whether something was removed.
    pub fn remove(&mut self, key: &IdentityKey) -> Result<bool, LedgerError> {
        self.reload();
        let before = self.records.len();
        self.records.retain(|r| r.key() != *key);
        let removed = self.records.len() != before;
        if removed {
            self.persist()?;
            log::info!("ledger: removed {key}");
        }
        Ok(removed)
    }

    pub fn evict_expired(&mut self) -> Result<usize, LedgerError> {
        self.evict_expired_at(Utc::now())
    }

    pub fn evict_expired_at(&mut self, now: DateTime<Utc>) -> Result<usize, LedgerError> {
        self.reload();
        let before = self.records.len();
        self.records.retain(|r| !is_expired(r, now));
        let evicted = before - self.records.len();
        if evicted > 0 {
            self.persist()?;
            log::info!("ledger: evicted {evicted} expired record(s)");
        }
        Ok(evicted)
    }

    pub fn list_filtered(&mut self, filter: &ShipmentFilter) -> Listing {
        self.list_filtered_at(filter, Utc::now())
    }

    /// Evict, then filter. A failed eviction write is logged; the listing
    /// still leaves expired records out.
    pub fn list_filtered_at(&mut self, filter: &ShipmentFilter, now: DateTime<Utc>) -> Listing {
        let evicted = match self.evict_expired_at(now) {
            Ok(n) => n,
            Err(e) => {
                log::error!("ledger: eviction not persisted: {e}");
                0
            }
        };
        let records = self
            .records
            .iter()
            .filter(|r| !is_expired(r, now) && filter.matches(r))
            .cloned()
            .collect();
        Listing { records, evicted }
    }

    /// Records whose status is not yet Delivered, in ledger order.
    pub fn pending(&self) -> Vec<ShipmentRecord> {
        self.records.iter().filter(|r| !r.status.is_delivered()).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalStatus;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn rec(n: &str, status: CanonicalStatus, ts: DateTime<Utc>) -> ShipmentRecord {
        ShipmentRecord::new(n, Some("ups"), status, Vec::new(), None, ts)
    }

    #[test]
    fn legacy_entries_load_with_defaults() {
        let json = r#"[
            {"trackingNumber":"1Z1","status":"Departed from Facility","timestamp":1772366400000,
             "details":[{"activityScan":"Departed","completed":true}]},
            {"trackingNumber":"  ","status":"Delivered"},
            {"nope":true},
            {"trackingNumber":"1Z2","carrier":"FedEx","status":"cms.stapp.eod","timestamp":"garbage","label":" "}
        ]"#;
        let ledger = ShipmentLedger::open(MemoryStore::new().with(LEDGER_KEY, json));
        let rs = ledger.records();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs[0].carrier, "unknown");
        assert_eq!(rs[0].status, CanonicalStatus::InTransit);
        assert!(rs[0].last_updated.is_some());
        assert_eq!(rs[0].steps[0].text, "Departed");
        assert_eq!(rs[1].carrier, "fedex");
        assert_eq!(rs[1].status, CanonicalStatus::Unknown);
        assert_eq!(rs[1].last_updated, None);
        assert_eq!(rs[1].label, None);
    }

    #[test]
    fn unreadable_ledger_starts_empty_and_is_overwritten() {
        let mut ledger = ShipmentLedger::open(MemoryStore::new().with(LEDGER_KEY, "{not json"));
        assert!(ledger.is_empty());
        ledger.upsert(rec("1Z", CanonicalStatus::Pending, at(1))).unwrap();
        let text = ledger.store().get(LEDGER_KEY).unwrap();
        assert!(text.contains("\"trackingNumber\": \"1Z\""));
        assert!(text.contains("\"status\": \"Pending\""));
    }

    #[test]
    fn older_incoming_keeps_existing_at_head() {
        let mut ledger = ShipmentLedger::open(MemoryStore::new());
        ledger.upsert(rec("A", CanonicalStatus::InTransit, at(5))).unwrap();
        ledger.upsert(rec("B", CanonicalStatus::Pending, at(5))).unwrap();
        let outcome = ledger.upsert(rec("A", CanonicalStatus::Pending, at(4))).unwrap();
        assert_eq!(outcome, UpsertOutcome::KeptExisting);
        assert_eq!(ledger.records()[0].tracking_number, "A");
        assert_eq!(ledger.records()[0].status, CanonicalStatus::InTransit);
    }

    #[test]
    fn eviction_is_whole_days_and_delivered_only() {
        let now = at(20);
        let mut ledger = ShipmentLedger::open(MemoryStore::new());
        ledger.upsert(rec("old-delivered", CanonicalStatus::Delivered, now - Duration::days(6))).unwrap();
        ledger
            .upsert(rec("edge", CanonicalStatus::Delivered, now - Duration::days(5) - Duration::hours(23)))
            .unwrap();
        ledger.upsert(rec("old-transit", CanonicalStatus::InTransit, now - Duration::days(30))).unwrap();
        assert_eq!(ledger.evict_expired_at(now).unwrap(), 1);
        let left: Vec<_> = ledger.records().iter().map(|r| r.tracking_number.as_str()).collect();
        assert_eq!(left, vec!["old-transit", "edge"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut ledger = ShipmentLedger::open(MemoryStore::new());
        ledger.upsert(rec("A", CanonicalStatus::Pending, at(1))).unwrap();
        let key = IdentityKey::new("A", Some("UPS"));
        assert!(ledger.remove(&key).unwrap());
        assert!(!ledger.remove(&key).unwrap());
        assert!(ledger.is_empty());
    }
}
