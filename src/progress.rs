// src/progress.rs
/// Lightweight progress reporting used by long-running operations (bulk refresh).
/// Frontends (GUI/CLI) implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one logical unit settles (e.g., a shipment was re-probed),
    /// whether it succeeded or not.
    fn item_done(&mut self, _item: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}
