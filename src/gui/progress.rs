// src/gui/progress.rs
use std::sync::{Arc, Mutex};

use crate::progress::Progress;

/// Mirrors progress into the status line the UI thread draws.
pub struct GuiProgress {
    status: Arc<Mutex<String>>,
    done: usize,
    total: usize,
}

impl GuiProgress {
    pub fn new(status: Arc<Mutex<String>>) -> Self {
        Self { status, done: 0, total: 0 }
    }

    fn set_status(&self, msg: impl Into<String>) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }
    fn log(&mut self, msg: &str) {
        self.set_status(msg);
    }
    fn item_done(&mut self, item: &str) {
        self.done += 1;
        self.set_status(format!("Checked {item} ({}/{})", self.done, self.total));
    }
    fn finish(&mut self) {
        if self.total == 0 {
            self.set_status("Nothing to refresh");
        } else {
            self.set_status(format!("Refresh complete ({}/{})", self.done, self.total));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_settled_items() {
        let status = Arc::new(Mutex::new(String::new()));
        let mut p = GuiProgress::new(status.clone());
        p.begin(2);
        p.item_done("1Z1 (ok)");
        assert_eq!(*status.lock().unwrap(), "Checked 1Z1 (ok) (1/2)");
        p.item_done("1Z2 (failed)");
        p.finish();
        assert_eq!(*status.lock().unwrap(), "Refresh complete (2/2)");
    }
}
