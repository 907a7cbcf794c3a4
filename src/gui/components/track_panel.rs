// src/gui/components/track_panel.rs
//
// Left panel: the track form and the bulk refresh button. Both kick off
// background jobs, so they are disabled while one is running.

use eframe::egui;

use crate::{
    config::consts::UNKNOWN_CARRIER,
    gui::{actions, app::{App, KNOWN_CARRIERS}},
};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let ctx = ui.ctx().clone();
    let idle = !app.is_running();

    ui.heading("Track");
    ui.add_space(4.0);

    ui.label("Tracking number");
    let number = ui.add(
        egui::TextEdit::singleline(&mut app.state.gui.tracking_input)
            .hint_text("1Z…")
            .desired_width(180.0),
    );

    ui.label("Carrier");
    let carrier = &mut app.state.gui.carrier_input;
    egui::ComboBox::from_id_salt("carrier_input")
        .selected_text(carrier.to_uppercase())
        .width(180.0)
        .show_ui(ui, |ui| {
            for c in KNOWN_CARRIERS.iter().chain(std::iter::once(&UNKNOWN_CARRIER)) {
                ui.selectable_value(carrier, c.to_string(), c.to_uppercase());
            }
        });

    ui.label("Label (optional)");
    let label = ui.add(
        egui::TextEdit::singleline(&mut app.state.gui.label_input)
            .hint_text("e.g. new keyboard")
            .desired_width(180.0),
    );

    let enter = (number.lost_focus() || label.lost_focus()) && ui.input(|i| i.key_pressed(egui::Key::Enter));
    ui.add_space(6.0);
    let clicked = ui.add_enabled(idle, egui::Button::new("Track")).clicked();
    if (clicked || enter) && idle {
        actions::track(app, &ctx);
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(6.0);

    let pending = app.rows.iter().filter(|r| !r.status.is_delivered()).count();
    if ui
        .add_enabled(idle, egui::Button::new("Refresh pending"))
        .on_hover_text(format!("Re-check every undelivered shipment ({pending} shown)"))
        .clicked()
    {
        actions::refresh(app, &ctx);
    }
}
