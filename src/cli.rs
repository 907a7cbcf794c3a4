// src/cli.rs
use std::fs;
use std::path::PathBuf;

use crate::config::options::AppOptions;
use crate::core::{dom::Document, net};
use crate::csv::{records_to_string, Delim};
use crate::error::{FetchError, LedgerError, TrackError};
use crate::extract::Extractor;
use crate::filter::ShipmentFilter;
use crate::ledger::ShipmentLedger;
use crate::model::IdentityKey;
use crate::probe::{EndpointProbe, HttpTransport};
use crate::progress::Progress;
use crate::runner::{self, TrackOutcome, TrackRequest};
use crate::store::FileStore;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

fn usage(msg: impl Into<String>) -> CliError {
    CliError::Usage(msg.into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Url(String),
    Html(PathBuf),
    Text(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    pub status: String,
    pub carrier: String,
    pub from: String,
    pub to: String,
    pub format: Delim,
    pub include_headers: bool,
    pub out: Option<PathBuf>,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            status: "all".into(),
            carrier: "all".into(),
            from: String::new(),
            to: String::new(),
            format: Delim::Csv,
            include_headers: false,
            out: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Track(TrackRequest),
    Page(PageSource, TrackRequest),
    List(ListArgs),
    Remove(IdentityKey),
    Refresh,
    Evict,
    Help,
}

fn value<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Result<String, CliError> {
    args.next().ok_or_else(|| usage(format!("Missing value for {flag}")))
}

/// Parse everything after the program name.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, CliError> {
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else { return Ok(Command::Help) };

    let mut positional: Vec<String> = Vec::new();
    let mut carrier: Option<String> = None;
    let mut label: Option<String> = None;
    let mut as_text = false;
    let mut list = ListArgs::default();

    while let Some(a) = args.next() {
        match a.as_str() {
            "-c" | "--carrier" => {
                let v = value(&mut args, &a)?;
                list.carrier = v.clone();
                carrier = Some(v);
            }
            "-l" | "--label" => label = Some(value(&mut args, &a)?),
            "--text" => as_text = true,
            "--status" => list.status = value(&mut args, &a)?,
            "--from" => list.from = value(&mut args, &a)?,
            "--to" => list.to = value(&mut args, &a)?,
            "--format" => {
                let v = value(&mut args, &a)?;
                list.format = match v.to_ascii_lowercase().as_str() {
                    "csv" => Delim::Csv,
                    "tsv" => Delim::Tsv,
                    other => return Err(usage(format!("Unknown format: {other}"))),
                };
            }
            "--include-headers" => list.include_headers = true,
            "-o" | "--out" => list.out = Some(PathBuf::from(value(&mut args, &a)?)),
            "-h" | "--help" => return Ok(Command::Help),
            s if s.starts_with('-') => return Err(usage(format!("Unknown arg: {s}"))),
            _ => positional.push(a.clone()),
        }
    }

    let number = |idx: usize| -> Result<String, CliError> {
        positional
            .get(idx)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| usage("Tracking number is required"))
    };
    let request = |n: String| TrackRequest::new(&n, carrier.as_deref(), label.as_deref());

    let command = match cmd.as_str() {
        "track" => Command::Track(request(number(0)?)),
        "page" => {
            let src = positional.first().ok_or_else(|| usage("Missing page url or file"))?;
            let source = if src.starts_with("http://") || src.starts_with("https://") {
                PageSource::Url(src.clone())
            } else if as_text {
                PageSource::Text(PathBuf::from(src))
            } else {
                PageSource::Html(PathBuf::from(src))
            };
            Command::Page(source, request(number(1)?))
        }
        "list" => Command::List(list),
        "remove" => Command::Remove(IdentityKey::new(&number(0)?, carrier.as_deref())),
        "refresh" => Command::Refresh,
        "evict" => Command::Evict,
        "help" => Command::Help,
        other => return Err(usage(format!("Unknown command: {other}"))),
    };
    Ok(command)
}

/// Prints progress lines to stderr.
struct CliProgress {
    done: usize,
    total: usize,
}

impl Progress for CliProgress {
    fn begin(&mut self, total: usize) { self.total = total; }
    fn log(&mut self, msg: &str) { eprintln!("{msg}"); }
    fn item_done(&mut self, item: &str) {
        self.done += 1;
        eprintln!("[{}/{}] {item}", self.done, self.total);
    }
}

fn print_outcome(out: &TrackOutcome) {
    let r = &out.record;
    println!("{} ({}): {}", r.tracking_number, r.carrier, r.status);
    if out.status_text != r.status.to_string() {
        println!("  {}", out.status_text);
    }
    if let Some(label) = &r.label {
        println!("  label: {label}");
    }
    for s in &r.steps {
        let mark = if s.completed { "x" } else { " " };
        match &s.occurred_at {
            Some(at) => println!("  [{mark}] {} ({at})", s.text),
            None => println!("  [{mark}] {}", s.text),
        }
    }
    if out.upsert.is_none() {
        println!("  (nothing found on page; not recorded)");
    }
}

fn read_file(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io { path: path.clone(), source })
}

pub fn run<I: IntoIterator<Item = String>>(args: I) -> Result<(), CliError> {
    let command = parse_args(args)?;
    if command == Command::Help {
        eprintln!(include_str!("cli_help.txt"));
        return Ok(());
    }

    let opts = AppOptions::load();
    crate::log::init(opts.log_path(), opts.log_level);
    log::info!("cli: {command:?}");
    let mut ledger = ShipmentLedger::open(FileStore::new(&opts.store_dir));

    match command {
        Command::Track(req) => {
            let probe = EndpointProbe::new(HttpTransport::new(&opts.endpoint, opts.timeout_secs)?);
            let out = runner::track_via_probe(&probe, &opts.candidates, &mut ledger, &req)?;
            print_outcome(&out);
        }
        Command::Page(source, req) => {
            let extractor = Extractor::new();
            let out = match source {
                PageSource::Url(url) => {
                    let client = net::http_client(opts.timeout_secs)?;
                    runner::fetch_and_track(&client, &url, &extractor, &mut ledger, &req)?
                }
                PageSource::Html(path) => {
                    let doc = Document::parse(&read_file(&path)?);
                    runner::track_page(&extractor, &mut ledger, &req, &doc)?
                }
                PageSource::Text(path) => {
                    let doc = Document::from_text(&read_file(&path)?);
                    runner::track_page(&extractor, &mut ledger, &req, &doc)?
                }
            };
            print_outcome(&out);
        }
        Command::List(args) => {
            let filter = ShipmentFilter::from_query(&args.status, &args.carrier, &args.from, &args.to);
            let listing = ledger.list_filtered(&filter);
            if listing.evicted > 0 {
                eprintln!("Evicted {} expired shipment(s)", listing.evicted);
            }
            let text = records_to_string(&listing.records, args.include_headers, args.format);
            match args.out {
                Some(path) => {
                    fs::write(&path, text).map_err(|source| CliError::Io { path: path.clone(), source })?;
                    eprintln!("Wrote {} shipment(s) to {}", listing.records.len(), path.display());
                }
                None => print!("{text}"),
            }
        }
        Command::Remove(key) => {
            if ledger.remove(&key)? {
                println!("Removed {key}");
            } else {
                println!("{key} was not tracked");
            }
        }
        Command::Refresh => {
            let probe = EndpointProbe::new(HttpTransport::new(&opts.endpoint, opts.timeout_secs)?);
            let mut progress = CliProgress { done: 0, total: 0 };
            let summary = runner::refresh_pending(&probe, &opts.candidates, &mut ledger, Some(&mut progress))?;
            println!(
                "Refreshed {}: {} updated, {} unchanged",
                summary.attempted, summary.updated, summary.untouched
            );
        }
        Command::Evict => {
            let n = ledger.evict_expired()?;
            println!("Evicted {n} expired shipment(s)");
        }
        Command::Help => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn parses_track_with_carrier_and_label() {
        let cmd = parse_args(args("track 1Z999 --carrier UPS -l desk")).unwrap();
        assert_eq!(cmd, Command::Track(TrackRequest::new("1Z999", Some("UPS"), Some("desk"))));
    }

    #[test]
    fn parses_list_filters() {
        let Command::List(l) = parse_args(args("list --status delivered -c ups --from 2026-03-01 --format tsv")).unwrap()
        else {
            panic!("expected list");
        };
        assert_eq!((l.status.as_str(), l.carrier.as_str(), l.from.as_str()), ("delivered", "ups", "2026-03-01"));
        assert_eq!(l.format, Delim::Tsv);
    }

    #[test]
    fn page_source_kinds() {
        let cmd = parse_args(args("page https://x.test/t 1Z")).unwrap();
        assert!(matches!(cmd, Command::Page(PageSource::Url(_), _)));
        let cmd = parse_args(args("page dump.txt 1Z --text")).unwrap();
        assert!(matches!(cmd, Command::Page(PageSource::Text(_), _)));
    }

    #[test]
    fn missing_number_and_unknown_flags_are_usage_errors() {
        assert!(matches!(parse_args(args("track")), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(args("list --bogus")), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(Vec::new()), Ok(Command::Help)));
    }
}
