use std::env;

use serde::{Deserialize, Serialize};

use self::placement::PlacementConfig;
use self::translator::TranslatorConfig;
use self::watcher::WatcherConfig;

pub mod placement;
pub mod translator;
pub mod watcher;

pub use watcher::TriggerMode;

fn default_channel_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub watcher: WatcherConfig,
    pub placement: PlacementConfig,
    pub translator: TranslatorConfig,

    /// Capacity of the watcher inbox, which also carries session updates
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watcher: WatcherConfig::default(),
            placement: PlacementConfig::default(),
            translator: TranslatorConfig::default(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Config {
    pub fn apply_env(&mut self) {
        if let Some(debounce_ms) = env::var("KOTOBA_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.watcher.debounce_ms = debounce_ms;
        }

        if let Ok(api_url) = env::var("KOTOBA_TRANSLATE_URL") {
            self.translator.api_url = api_url;
        }

        if let Some(stall_timeout_ms) = env::var("KOTOBA_STALL_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.translator.stall_timeout_ms = Some(stall_timeout_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.watcher.debounce_ms, 300);
        assert_eq!(config.watcher.trigger, TriggerMode::Immediate);
        assert_eq!(config.placement.margin, 12.0);
        assert_eq!(config.translator.api_url, "http://localhost:3000/translate");
        assert_eq!(config.translator.text_field, "translationText");
        assert_eq!(config.translator.stall_timeout_ms, None);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"watcher": {"trigger": "button"}}"#).unwrap();
        assert_eq!(config.watcher.trigger, TriggerMode::Button);
        assert_eq!(config.watcher.debounce_ms, 300);
        assert_eq!(config.channel_capacity, 64);
    }
}
