// src/gui/actions/export.rs
use std::{fs, path::PathBuf};

use crate::{csv::records_to_string, gui::app::App};

/// Write the rows currently shown to the path in the export bar.
pub fn export(app: &mut App) {
    if app.rows.is_empty() {
        log::debug!("Export: Clicked, but there's nothing to export");
        app.status("Nothing to export");
        return;
    }

    let mut path = PathBuf::from(app.out_path_text.trim());
    if path.extension().is_none() {
        path.set_extension(app.export_format.ext());
        app.out_path_text = path.to_string_lossy().into_owned();
    }

    let text = records_to_string(&app.rows, app.include_headers, app.export_format);
    let result = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => fs::create_dir_all(dir).and_then(|_| fs::write(&path, text)),
        None => fs::write(&path, text),
    };

    match result {
        Ok(()) => {
            log::info!("Export: OK rows={} path={}", app.rows.len(), path.display());
            app.status(format!("Exported {} shipment(s) to {}", app.rows.len(), path.display()));
        }
        Err(e) => {
            log::error!("Export: Error {}: {e}", path.display());
            app.status(format!("Export error: {e}"));
        }
    }
}
