// src/gui/actions/mod.rs
//
// Folder module facade: re-export public entrypoints.
// Network work (track, refresh) runs on a background thread that holds the
// ledger lock; the UI thread only rebuilds its view once the job is done.

mod export;
mod refresh;
mod remove;
mod track;

pub use export::export;
pub use refresh::refresh;
pub use remove::remove;
pub use track::track;

use std::sync::atomic::Ordering;
use std::thread;

use eframe::egui;

use crate::{
    config::options::AppOptions,
    gui::{app::App, progress::GuiProgress},
    ledger::ShipmentLedger,
    store::FileStore,
};

/// Run `job` off the UI thread. At most one job runs at a time; the string
/// it returns becomes the status line.
pub(super) fn spawn_job<F>(app: &App, ctx: &egui::Context, name: &'static str, job: F)
where
    F: FnOnce(&mut ShipmentLedger<FileStore>, &AppOptions, &mut GuiProgress) -> String + Send + 'static,
{
    if app.running.swap(true, Ordering::AcqRel) {
        log::debug!("{name}: another job is still running");
        return;
    }

    let ledger = app.ledger.clone();
    let opts = app.state.options.clone();
    let status = app.status.clone();
    let running = app.running.clone();
    let dirty = app.view_dirty.clone();
    let ctx = ctx.clone();

    let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
        let mut prog = GuiProgress::new(status.clone());
        let msg = match ledger.lock() {
            Ok(mut guard) => job(&mut *guard, &opts, &mut prog),
            Err(_) => {
                log::error!("{name}: ledger lock poisoned");
                "Error: ledger unavailable".to_string()
            }
        };
        if let Ok(mut s) = status.lock() {
            *s = msg;
        }
        running.store(false, Ordering::Release);
        dirty.store(true, Ordering::Release);
        ctx.request_repaint();
    });

    if let Err(e) = spawned {
        log::error!("{name}: could not start worker: {e}");
        app.running.store(false, Ordering::Release);
        app.status(format!("Error: {e}"));
    }
}
