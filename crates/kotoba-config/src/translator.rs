use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "http://localhost:3000/translate".to_string()
}

fn default_text_field() -> String {
    "translationText".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request body field that carries the selected text
    #[serde(default = "default_text_field")]
    pub text_field: String,
    /// Fail a session that waits longer than this for its next chunk.
    /// Unbounded when unset.
    #[serde(default)]
    pub stall_timeout_ms: Option<u64>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            text_field: default_text_field(),
            stall_timeout_ms: None,
        }
    }
}
