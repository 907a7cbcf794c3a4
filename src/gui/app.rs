// src/gui/app.rs
use std::{
    error::Error,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use eframe::egui;

use crate::{
    config::{consts::DEFAULT_OUT_FILE, state::AppState},
    csv::Delim,
    filter::ShipmentFilter,
    ledger::ShipmentLedger,
    model::{IdentityKey, ShipmentRecord},
    store::FileStore,
};

use super::components;

/// Carriers offered in the track form and always shown as tabs.
pub const KNOWN_CARRIERS: &[&str] = &["ups", "fedex", "usps"];

pub type SharedLedger = Arc<Mutex<ShipmentLedger<FileStore>>>;

pub fn run(options: eframe::NativeOptions, state: AppState) -> Result<(), Box<dyn Error>> {
    crate::log::init(state.options.log_path(), state.options.log_level);
    eframe::run_native(
        "Parcel Tracker",
        options,
        Box::new(move |_cc| Ok(Box::new(App::new(state)))),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth for inputs (UI thread only)
    pub state: AppState,

    // shared with background jobs
    pub ledger: SharedLedger,

    // current view: filtered records, carrier tabs, selected row
    pub rows: Vec<ShipmentRecord>,
    pub carriers: Vec<String>,
    pub selected: Option<IdentityKey>,

    // export bar
    pub export_format: Delim,
    pub include_headers: bool,
    pub out_path_text: String,

    // status/progress (workers write here)
    pub status: Arc<Mutex<String>>,
    pub running: Arc<AtomicBool>,
    pub view_dirty: Arc<AtomicBool>,
}

impl App {
    pub fn new(state: AppState) -> Self {
        let ledger = ShipmentLedger::open(FileStore::new(&state.options.store_dir));
        log::info!(
            "gui: init endpoint={} store={} records={}",
            state.options.endpoint,
            state.options.store_dir.display(),
            ledger.len()
        );

        let mut app = Self {
            state,
            ledger: Arc::new(Mutex::new(ledger)),
            rows: Vec::new(),
            carriers: Vec::new(),
            selected: None,
            export_format: Delim::Csv,
            include_headers: true,
            out_path_text: format!("{DEFAULT_OUT_FILE}.{}", Delim::Csv.ext()),
            status: Arc::new(Mutex::new("Idle".to_string())),
            running: Arc::new(AtomicBool::new(false)),
            view_dirty: Arc::new(AtomicBool::new(false)),
        };
        app.rebuild_view();
        app
    }

    /* ---------- tiny helpers ---------- */

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }

    pub fn status_text(&self) -> String {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    #[inline]
    pub fn is_running(&self) -> bool { self.running.load(Ordering::Acquire) }

    pub fn filter(&self) -> ShipmentFilter {
        let g = &self.state.gui;
        ShipmentFilter::from_query(&g.status_filter, &g.carrier_tab, &g.date_from, &g.date_to)
    }

    /// Re-list the ledger through the current filters. If a background job
    /// holds the ledger, try again on a later frame.
    pub fn rebuild_view(&mut self) {
        let filter = self.filter();
        let Ok(mut ledger) = self.ledger.try_lock() else {
            self.view_dirty.store(true, Ordering::Release);
            return;
        };
        let listing = ledger.list_filtered(&filter);
        self.carriers = carrier_tabs(ledger.records());
        drop(ledger);

        if listing.evicted > 0 && !self.is_running() {
            self.status(format!("Removed {} delivered shipment(s) past retention", listing.evicted));
        }
        if let Some(sel) = &self.selected {
            if !listing.records.iter().any(|r| r.key() == *sel) {
                self.selected = None;
            }
        }
        log::debug!("gui: view rebuilt, {} row(s) for {filter:?}", listing.records.len());
        self.rows = listing.records;
    }
}

/// "all", the known carriers, then any other carrier seen in the ledger.
fn carrier_tabs(records: &[ShipmentRecord]) -> Vec<String> {
    let mut tabs: Vec<String> = std::iter::once("all")
        .chain(KNOWN_CARRIERS.iter().copied())
        .map(str::to_string)
        .collect();
    let mut extra: Vec<String> = records
        .iter()
        .map(|r| r.carrier.clone())
        .filter(|c| !tabs.contains(c))
        .collect();
    extra.sort();
    extra.dedup();
    tabs.extend(extra);
    tabs
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.view_dirty.swap(false, Ordering::AcqRel) {
            self.rebuild_view();
        }
        if self.is_running() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::SidePanel::left("track")
            .resizable(false)
            .show(ctx, |ui| {
                components::track_panel::draw(ui, self);
            });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.is_running() {
                    ui.add(egui::Spinner::new());
                }
                ui.label(self.status_text());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            components::tabs::draw(ui, self);

            ui.separator();

            components::filter_bar::draw(ui, self);

            ui.separator();

            components::export_bar::draw(ui, self);

            ui.separator();

            components::data_table::draw(ui, self);
        });
    }
}
