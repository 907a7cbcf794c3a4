// src/error.rs
//! Failure taxonomy. Only outcomes a caller can act on are typed here;
//! per-strategy and per-candidate detail goes to the log instead.

/// No extraction strategy produced signals for a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionFailure {
    #[error("No tracking information found on page")]
    NotFound,
}

/// Every endpoint candidate failed, answered with an error, or returned malformed data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    #[error("Could not retrieve tracking information ({attempted} route(s) tried)")]
    AllCandidatesExhausted { attempted: usize },
}

/// Transport-level failure of a single remote call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP client setup failed: {0}")]
    Client(reqwest::Error),
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Persisted ledger data could not be read. Recovered locally, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum LedgerReadFailure {
    #[error("no persisted ledger")]
    Missing,
    #[error("ledger storage unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger data malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A ledger mutation could not be written back.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Could not save shipments: {0}")]
    Write(#[from] std::io::Error),
    #[error("Could not encode shipments: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Everything a single tracking request can end in.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Tracking number is required")]
    MissingTrackingNumber,
    #[error(transparent)]
    Probe(#[from] ProbeFailure),
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),
    #[error("Could not load tracking page: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
