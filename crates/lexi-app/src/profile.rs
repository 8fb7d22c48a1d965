use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use lexi_config::Config;

/// Load a JSON config file, or defaults plus environment overrides
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No config file given, using defaults");
        return Ok(Config::new());
    };

    tracing::info!("Loading config from {}", path.display());
    let file = File::open(path)?;
    let config: Config = serde_json::from_reader(BufReader::new(file))?;
    Ok(config.sanitized())
}

/// Write the effective config so it can be edited and passed back with --config
pub fn write_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    tracing::info!("Wrote config to {}", path.display());
    Ok(())
}
