use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ops::view::{FilterMode, SortMode};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Initial view settings for the TUI and `list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub filter: FilterMode,
    #[serde(default)]
    pub sort: SortMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// How long transient status messages stay up
    #[serde(default = "default_status_timeout_ms")]
    pub status_timeout_ms: u64,
    /// Hex color overrides keyed by theme slot (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            status_timeout_ms: default_status_timeout_ms(),
            colors: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_status_timeout_ms() -> u64 {
    2000
}
