// src/gui/actions/remove.rs
use crate::{gui::app::App, model::IdentityKey};

pub fn remove(app: &mut App, key: &IdentityKey) {
    let msg = match app.ledger.try_lock() {
        Ok(mut ledger) => match ledger.remove(key) {
            Ok(true) => format!("Removed {key}"),
            Ok(false) => format!("{key} was already gone"),
            Err(e) => {
                log::error!("Remove: {key}: {e}");
                format!("Error removing {key}: {e}")
            }
        },
        Err(_) => "Busy, try again when the current job finishes".to_string(),
    };
    app.status(msg);
    if app.selected.as_ref() == Some(key) {
        app.selected = None;
    }
    app.rebuild_view();
}
