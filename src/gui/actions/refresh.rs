// src/gui/actions/refresh.rs
use eframe::egui;

use crate::{
    gui::app::App,
    probe::{EndpointProbe, HttpTransport},
    runner,
};

use super::spawn_job;

/// Re-probe every shipment that is not yet delivered.
pub fn refresh(app: &mut App, ctx: &egui::Context) {
    log::info!("Refresh: Begin");
    spawn_job(app, ctx, "refresh", |ledger, opts, prog| {
        let probe = match HttpTransport::new(&opts.endpoint, opts.timeout_secs) {
            Ok(t) => EndpointProbe::new(t),
            Err(e) => return format!("Error: {e}"),
        };
        match runner::refresh_pending(&probe, &opts.candidates, ledger, Some(prog)) {
            Ok(s) if s.attempted == 0 => "Nothing to refresh".to_string(),
            Ok(s) => format!(
                "Refreshed {}: {} updated, {} unchanged",
                s.attempted, s.updated, s.untouched
            ),
            Err(e) => {
                log::error!("Refresh: {e}");
                format!("Refresh error: {e}")
            }
        }
    });
}
