// src/gui/components/data_table.rs
//
// Shipment history: one row per record in ledger order, a Remove button per
// row, and the selected record's milestones underneath.

use eframe::egui::{self, Align, Color32, Layout, RichText, TextWrapMode};
use egui_extras::{Column, TableBuilder};

use crate::{
    csv::{record_row, HEADERS},
    gui::{actions, app::App},
    model::{CanonicalStatus, IdentityKey, ShipmentRecord},
};

fn status_color(status: CanonicalStatus) -> Option<Color32> {
    match status {
        CanonicalStatus::Delivered => Some(Color32::from_rgb(0x4C, 0xAF, 0x50)),
        CanonicalStatus::OutForDelivery => Some(Color32::from_rgb(0xFF, 0xA5, 0x00)),
        CanonicalStatus::InTransit => Some(Color32::from_rgb(0x64, 0xB4, 0xFF)),
        CanonicalStatus::Pending => Some(Color32::GRAY),
        CanonicalStatus::Unknown => None,
    }
}

const STATUS_COL: usize = 2;
const WIDTHS: [f32; 6] = [180.0, 70.0, 120.0, 160.0, 120.0, 50.0];

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    if app.rows.is_empty() {
        ui.label(if app.filter() == crate::filter::ShipmentFilter::all() {
            "No shipments tracked yet."
        } else {
            "No shipments match the current filters."
        });
        return;
    }

    let mut clicked: Option<IdentityKey> = None;
    let mut remove: Option<IdentityKey> = None;
    let idle = !app.is_running();
    let table_h = (ui.available_height() * 0.6).max(120.0);

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(table_h)
        .cell_layout(Layout::left_to_right(Align::Center));
    for w in WIDTHS {
        table = table.column(Column::initial(w).clip(true).at_least(30.0));
    }
    table = table.column(Column::remainder());

    table
        .header(22.0, |mut header| {
            for h in HEADERS.iter().chain(std::iter::once(&"")) {
                header.col(|ui| {
                    ui.strong(*h);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, app.rows.len(), |mut row| {
                let Some(r) = app.rows.get(row.index()) else { return };
                let key = r.key();
                let selected = app.selected.as_ref() == Some(&key);
                row.set_selected(selected);

                for (ci, cell) in record_row(r).into_iter().enumerate() {
                    row.col(|ui| {
                        ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
                        let mut text = RichText::new(cell);
                        if ci == STATUS_COL {
                            if let Some(c) = status_color(r.status) {
                                text = text.color(c);
                            }
                        }
                        if ci == 0 {
                            if ui.selectable_label(selected, text).clicked() {
                                clicked = Some(key.clone());
                            }
                        } else {
                            ui.label(text);
                        }
                    });
                }
                row.col(|ui| {
                    if ui.add_enabled(idle, egui::Button::new("Remove").small()).clicked() {
                        remove = Some(key.clone());
                    }
                });
            });
        });

    if let Some(key) = clicked {
        app.selected = if app.selected.as_ref() == Some(&key) { None } else { Some(key) };
    }
    if let Some(key) = remove {
        actions::remove(app, &key);
    }

    ui.separator();
    if let Some(r) = app.selected.as_ref().and_then(|k| app.rows.iter().find(|r| r.key() == *k)) {
        details(ui, r);
    }
}

fn details(ui: &mut egui::Ui, r: &ShipmentRecord) {
    ui.horizontal(|ui| {
        ui.strong(r.key().to_string());
        if let Some(label) = &r.label {
            ui.label(format!("· {label}"));
        }
    });
    if r.steps.is_empty() {
        ui.label("No milestones recorded.");
        return;
    }
    egui::ScrollArea::vertical().id_salt("steps_scroll").show(ui, |ui| {
        for s in &r.steps {
            let mark = if s.completed { "✔" } else { "○" };
            let mut line = format!("{mark} {}", s.text);
            if let Some(at) = &s.occurred_at {
                line.push_str(&format!("  ({at})"));
            }
            let mut text = RichText::new(line);
            if s.is_delivery_milestone && s.completed {
                text = text.strong();
            }
            if !s.completed {
                text = text.weak();
            }
            ui.label(text);
        }
    });
}
