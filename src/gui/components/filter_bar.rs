// src/gui/components/filter_bar.rs
//
// Status and date-range filters. Dates are `YYYY-MM-DD`; an unparsable
// bound is flagged and, like in the CLI, hides every row until fixed.

use eframe::egui;

use chrono::NaiveDate;

use crate::{filter::StatusFilter, gui::app::App};

const INVALID: egui::Color32 = egui::Color32::from_rgb(0xDC, 0x61, 0x49);

fn date_field(ui: &mut egui::Ui, label: &str, text: &mut String) -> bool {
    ui.label(label);
    let resp = ui.add(
        egui::TextEdit::singleline(text)
            .hint_text("YYYY-MM-DD")
            .desired_width(96.0),
    );
    let t = text.trim();
    if !t.is_empty() && NaiveDate::parse_from_str(t, "%Y-%m-%d").is_err() {
        ui.colored_label(INVALID, "invalid date");
    }
    resp.changed()
}

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let mut changed = false;

    ui.horizontal(|ui| {
        let g = &mut app.state.gui;

        ui.label("Status:");
        let before = StatusFilter::parse(&g.status_filter);
        let mut status = before;
        ui.selectable_value(&mut status, StatusFilter::All, "All");
        ui.selectable_value(&mut status, StatusFilter::Delivered, "Delivered");
        ui.selectable_value(&mut status, StatusFilter::NotDelivered, "Not delivered");
        if status != before {
            g.status_filter = status.as_str().to_string();
            log::info!("UI: Status filter → {}", g.status_filter);
            changed = true;
        }

        ui.separator();

        changed |= date_field(ui, "From", &mut g.date_from);
        changed |= date_field(ui, "To", &mut g.date_to);

        if (!g.date_from.is_empty() || !g.date_to.is_empty()) && ui.button("Clear dates").clicked() {
            g.date_from.clear();
            g.date_to.clear();
            changed = true;
        }
    });

    if changed {
        app.rebuild_view();
    }
}
