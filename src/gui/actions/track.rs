// src/gui/actions/track.rs
use eframe::egui;

use crate::{
    gui::app::App,
    probe::{EndpointProbe, HttpTransport},
    runner::{self, TrackRequest},
};

use super::spawn_job;

pub fn track(app: &mut App, ctx: &egui::Context) {
    let g = &app.state.gui;
    let label = Some(g.label_input.trim()).filter(|l| !l.is_empty());
    let req = TrackRequest::new(&g.tracking_input, Some(&g.carrier_input), label);
    if req.tracking_number.is_empty() {
        app.status("Enter a tracking number");
        return;
    }

    log::info!("Track: Begin {} ({})", req.tracking_number, req.carrier());
    app.status(format!("Tracking {}…", req.tracking_number));

    spawn_job(app, ctx, "track", move |ledger, opts, _prog| {
        let probe = match HttpTransport::new(&opts.endpoint, opts.timeout_secs) {
            Ok(t) => EndpointProbe::new(t),
            Err(e) => {
                log::error!("Track: client setup failed: {e}");
                return format!("Error: {e}");
            }
        };
        match runner::track_via_probe(&probe, &opts.candidates, ledger, &req) {
            Ok(out) => format!("{}: {}", out.record.key(), out.status_text),
            Err(e) => {
                log::error!("Track: {} failed: {e}", req.tracking_number);
                format!("Error tracking {}: {e}", req.tracking_number)
            }
        }
    });

    let g = &mut app.state.gui;
    g.tracking_input.clear();
    g.label_input.clear();
}
