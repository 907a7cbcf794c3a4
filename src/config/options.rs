// src/config/options.rs
//! Runtime options, read from a `key = value` file next to the executable's
//! working directory. Unknown keys are ignored and malformed values keep their
//! defaults, so a stale config file never stops the app from starting.
use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;

use super::consts::*;
use crate::probe::ProbeCandidate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    /// Base URL of the tracking service.
    pub endpoint: String,
    pub store_dir: PathBuf,
    pub timeout_secs: u64,
    pub log_level: LevelFilter,
    pub candidates: Vec<ProbeCandidate>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            store_dir: PathBuf::from(STORE_DIR),
            timeout_secs: TIMEOUT_SECS,
            log_level: LevelFilter::Info,
            candidates: ProbeCandidate::defaults(),
        }
    }
}

impl AppOptions {
    /// Defaults, then the config file (if present), then the environment.
    pub fn load() -> Self {
        let mut opts = Self::from_file(Path::new(CONFIG_FILE));
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            opts.set_endpoint(&endpoint);
        }
        opts
    }

    pub fn from_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut opts = Self::default();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("config: line {} has no '=', ignored", lineno + 1);
                continue;
            };
            opts.apply(key.trim(), value.trim());
        }
        opts
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "endpoint" => self.set_endpoint(value),
            "store_dir" if !value.is_empty() => self.store_dir = PathBuf::from(value),
            "timeout_secs" => match value.parse::<u64>() {
                Ok(n) if n > 0 => self.timeout_secs = n,
                _ => log::warn!("config: bad timeout_secs '{value}'"),
            },
            "log_level" => match value.parse::<LevelFilter>() {
                Ok(l) => self.log_level = l,
                Err(_) => log::warn!("config: bad log_level '{value}'"),
            },
            "candidates" => {
                let list = ProbeCandidate::parse_list(value);
                if list.is_empty() {
                    log::warn!("config: no usable candidates in '{value}', keeping defaults");
                } else {
                    self.candidates = list;
                }
            }
            other => log::debug!("config: unknown key '{other}'"),
        }
    }

    fn set_endpoint(&mut self, value: &str) {
        let v = value.trim().trim_end_matches('/');
        if v.starts_with("http://") || v.starts_with("https://") {
            self.endpoint = v.to_string();
        } else {
            log::warn!("config: endpoint '{value}' is not an http(s) URL");
        }
    }

    pub fn log_path(&self) -> PathBuf { self.store_dir.join(LOG_FILE) }
}
