// src/config/consts.rs

// Remote tracking service
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000";
pub const ENDPOINT_ENV: &str = "PARCEL_TRACK_ENDPOINT";
pub const TIMEOUT_SECS: u64 = 30;

// Local store
pub const STORE_DIR: &str = ".store";
pub const LEDGER_KEY: &str = "trackedShipments";
pub const LOG_FILE: &str = "debug.log";
pub const CONFIG_FILE: &str = "parcel_track.cfg";

// Ledger policy
pub const LEDGER_CAP: usize = 20;
pub const RETENTION_DAYS: i64 = 5;
pub const UNKNOWN_CARRIER: &str = "unknown";

// Extraction
pub const KEYWORD_LINE_LIMIT: usize = 5;

// Export
pub const DEFAULT_OUT_FILE: &str = "shipments";
