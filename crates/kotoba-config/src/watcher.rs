use serde::{Deserialize, Serialize};

fn default_debounce_ms() -> u64 {
    300
}

/// How a settled selection turns into a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Mount the popup and start translating right away
    #[default]
    Immediate,
    /// Mount a trigger button first, translate once it is pressed
    Button,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WatcherConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub trigger: TriggerMode,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            trigger: TriggerMode::default(),
        }
    }
}
