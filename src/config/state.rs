// src/config/state.rs
use super::options::AppOptions;

/// GUI-only state that is not persisted.
#[derive(Clone, Debug)]
pub struct GuiState {
    pub window_w: u32,
    pub window_h: u32,

    // Track form
    pub tracking_input: String,
    pub carrier_input: String,
    pub label_input: String,

    // Filter bar
    pub status_filter: String,
    pub carrier_tab: String,
    pub date_from: String,
    pub date_to: String,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            window_w: 1000,
            window_h: 680,
            tracking_input: String::new(),
            carrier_input: "ups".to_string(),
            label_input: String::new(),
            status_filter: "all".to_string(),
            carrier_tab: "all".to_string(),
            date_from: String::new(),
            date_to: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}
