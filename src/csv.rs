// src/csv.rs
use std::io::{self, Write};

use crate::model::ShipmentRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delim {
    #[default]
    Csv,
    Tsv,
}

impl Delim {
    pub fn sep(self) -> char {
        match self { Delim::Csv => ',', Delim::Tsv => '\t' }
    }
    pub fn ext(self) -> &'static str {
        match self { Delim::Csv => "csv", Delim::Tsv => "tsv" }
    }
}

pub const HEADERS: &[&str] = &["Tracking number", "Carrier", "Status", "Label", "Last updated", "Steps"];

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// One display row per record; columns follow [`HEADERS`].
pub fn record_row(r: &ShipmentRecord) -> Vec<String> {
    let updated = r
        .last_updated
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let done = r.steps.iter().filter(|s| s.completed).count();
    vec![
        r.tracking_number.clone(),
        r.carrier.to_uppercase(),
        r.status.to_string(),
        r.label.clone().unwrap_or_default(),
        updated,
        format!("{}/{}", done, r.steps.len()),
    ]
}

/// Render records (optionally with a header line) into a string.
pub fn records_to_string(records: &[ShipmentRecord], include_headers: bool, delim: Delim) -> String {
    let sep = delim.sep();
    let mut buf: Vec<u8> = Vec::new();

    if include_headers {
        let h: Vec<String> = HEADERS.iter().map(|s| s.to_string()).collect();
        let _ = write_row(&mut buf, &h, sep);
    }
    for r in records {
        let _ = write_row(&mut buf, &record_row(r), sep);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}
