mod schema;

pub use schema::{CloudinaryConfig, Config};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/runboard/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("runboard")
}

/// Get the default config file path (~/.config/runboard/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Default record data file path (~/.config/runboard/athletes.json), used
/// when neither the CLI nor the config file overrides it.
pub fn default_data_path() -> PathBuf {
    get_config_dir().join("athletes.json")
}

/// Load configuration from a YAML file.
///
/// With an explicit `path` the file must exist and parse. With the default
/// path, a missing file simply yields the default configuration, since the
/// store has a sensible default location and Cloudinary is optional.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}
