// src/gui/components/export_bar.rs

use eframe::egui;

use crate::{
    csv::Delim,
    gui::{actions, app::App},
};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        let prev = app.export_format;
        ui.label("Format:");
        ui.selectable_value(&mut app.export_format, Delim::Csv, "CSV");
        ui.selectable_value(&mut app.export_format, Delim::Tsv, "TSV");
        if app.export_format != prev {
            // Follow the format only if the extension still matches the old one.
            let old = format!(".{}", prev.ext());
            if let Some(stem) = app.out_path_text.strip_suffix(&old) {
                app.out_path_text = format!("{stem}.{}", app.export_format.ext());
            }
            log::info!("UI: Export format → {:?}", app.export_format);
        }

        ui.checkbox(&mut app.include_headers, "Include headers");

        ui.add(egui::TextEdit::singleline(&mut app.out_path_text).desired_width(220.0));

        let label = format!("Export {} row(s)", app.rows.len());
        if ui.add_enabled(!app.rows.is_empty(), egui::Button::new(label)).clicked() {
            actions::export(app);
        }
    });
}
