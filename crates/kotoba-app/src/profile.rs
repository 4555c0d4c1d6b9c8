use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use kotoba_config::Config;

/// Load a config file, then apply environment overrides.
/// Without a file, defaults are used.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader)?
        }
        None => Config::default(),
    };

    config.apply_env();
    Ok(config)
}

/// Write the effective config, for use as a starting point
pub fn dump_config(config: &Config) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
