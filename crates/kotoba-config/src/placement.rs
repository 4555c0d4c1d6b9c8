use serde::{Deserialize, Serialize};

fn default_margin() -> f64 {
    12.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PlacementConfig {
    /// Gap between the selection edge and the popup
    #[serde(default = "default_margin")]
    pub margin: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
        }
    }
}
