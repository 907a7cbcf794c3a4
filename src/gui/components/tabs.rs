// src/gui/components/tabs.rs
//
// Carrier tabs above the table. Switching a tab re-lists the ledger.

use eframe::egui;

use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let mut picked: Option<String> = None;

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;
        for tab in &app.carriers {
            let selected = *tab == app.state.gui.carrier_tab;
            let title = if tab == "all" { "All".to_string() } else { tab.to_uppercase() };
            if ui.selectable_label(selected, title).clicked() && !selected {
                picked = Some(tab.clone());
            }
        }
    });

    if let Some(tab) = picked {
        log::info!("UI: Carrier tab {} → {}", app.state.gui.carrier_tab, tab);
        app.state.gui.carrier_tab = tab;
        app.rebuild_view();
    }
}
