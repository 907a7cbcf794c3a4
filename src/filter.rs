// src/filter.rs
// Display filters over the ledger. Every populated predicate must hold.
// Date bounds compare UTC calendar days and include the whole bound day.

use chrono::NaiveDate;

use crate::model::ShipmentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Delivered,
    NotDelivered,
}

impl StatusFilter {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "delivered" => StatusFilter::Delivered,
            "not-delivered" | "not_delivered" | "undelivered" | "pending" => StatusFilter::NotDelivered,
            "" | "all" => StatusFilter::All,
            other => {
                log::warn!("filter: unknown status filter '{other}', showing all");
                StatusFilter::All
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Delivered => "delivered",
            StatusFilter::NotDelivered => "not-delivered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CarrierFilter {
    #[default]
    All,
    Only(String),
}

impl CarrierFilter {
    pub fn parse(text: &str) -> Self {
        let c = text.trim().to_lowercase();
        if c.is_empty() || c == "all" { CarrierFilter::All } else { CarrierFilter::Only(c) }
    }
}

/// One end of a date range. An unparsable bound stays active and matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateBound {
    #[default]
    Unset,
    On(NaiveDate),
    Invalid(String),
}

impl DateBound {
    /// `YYYY-MM-DD`; blank means unset.
    pub fn parse(text: &str) -> Self {
        let t = text.trim();
        if t.is_empty() {
            return DateBound::Unset;
        }
        match NaiveDate::parse_from_str(t, "%Y-%m-%d") {
            Ok(d) => DateBound::On(d),
            Err(_) => {
                log::warn!("filter: unparsable date bound '{t}', excluding all records");
                DateBound::Invalid(t.to_string())
            }
        }
    }

    pub fn is_set(&self) -> bool { !matches!(self, DateBound::Unset) }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShipmentFilter {
    pub status: StatusFilter,
    pub carrier: CarrierFilter,
    pub from: DateBound,
    pub to: DateBound,
}

impl ShipmentFilter {
    pub fn all() -> Self { Self::default() }

    /// Build from the string query surface used by the CLI and GUI.
    pub fn from_query(status: &str, carrier: &str, from: &str, to: &str) -> Self {
        Self {
            status: StatusFilter::parse(status),
            carrier: CarrierFilter::parse(carrier),
            from: DateBound::parse(from),
            to: DateBound::parse(to),
        }
    }

    pub fn has_date_bounds(&self) -> bool { self.from.is_set() || self.to.is_set() }

    fn status_ok(&self, r: &ShipmentRecord) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Delivered => r.status.is_delivered(),
            StatusFilter::NotDelivered => !r.status.is_delivered(),
        }
    }

    fn carrier_ok(&self, r: &ShipmentRecord) -> bool {
        match &self.carrier {
            CarrierFilter::All => true,
            CarrierFilter::Only(c) => r.carrier == *c,
        }
    }

    fn dates_ok(&self, r: &ShipmentRecord) -> bool {
        if !self.has_date_bounds() {
            return true;
        }
        let Some(ts) = r.last_updated else { return false };
        let day = ts.date_naive();
        let lower = match &self.from {
            DateBound::Unset => true,
            DateBound::On(d) => day >= *d,
            DateBound::Invalid(_) => false,
        };
        let upper = match &self.to {
            DateBound::Unset => true,
            DateBound::On(d) => day <= *d,
            DateBound::Invalid(_) => false,
        };
        lower && upper
    }

    pub fn matches(&self, r: &ShipmentRecord) -> bool {
        self.status_ok(r) && self.carrier_ok(r) && self.dates_ok(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalStatus;
    use chrono::{TimeZone, Utc};

    fn rec(carrier: &str, status: CanonicalStatus, day: u32) -> ShipmentRecord {
        let ts = Utc.with_ymd_and_hms(2026, 3, day, 23, 59, 0).unwrap();
        ShipmentRecord::new("1Z", Some(carrier), status, Vec::new(), None, ts)
    }

    #[test]
    fn date_bounds_include_whole_day() {
        let f = ShipmentFilter::from_query("all", "all", "2026-03-02", "2026-03-02");
        assert!(f.matches(&rec("ups", CanonicalStatus::InTransit, 2)));
        assert!(!f.matches(&rec("ups", CanonicalStatus::InTransit, 3)));
    }

    #[test]
    fn invalid_bound_excludes_everything() {
        let f = ShipmentFilter::from_query("", "", "03/02/2026", "");
        assert!(matches!(f.from, DateBound::Invalid(_)));
        assert!(!f.matches(&rec("ups", CanonicalStatus::InTransit, 2)));
    }

    #[test]
    fn missing_timestamp_only_matters_with_bounds() {
        let mut r = rec("ups", CanonicalStatus::Pending, 1);
        r.last_updated = None;
        assert!(ShipmentFilter::all().matches(&r));
        assert!(!ShipmentFilter::from_query("all", "all", "", "2030-01-01").matches(&r));
    }

    #[test]
    fn carrier_is_case_insensitive() {
        let f = ShipmentFilter::from_query("not-delivered", " UPS ", "", "");
        assert!(f.matches(&rec("ups", CanonicalStatus::OutForDelivery, 1)));
        assert!(!f.matches(&rec("fedex", CanonicalStatus::OutForDelivery, 1)));
        assert!(!f.matches(&rec("ups", CanonicalStatus::Delivered, 1)));
    }
}
