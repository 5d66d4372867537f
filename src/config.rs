//! Locating and reading `config.toml`.

use directories::ProjectDirs;
use gridmerge_core::Config;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridmerge")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Load the config, falling back to defaults.
///
/// Problems never abort: they are returned as warnings for the caller to
/// print. An explicitly requested file that does not exist is a warning; a
/// missing default file is not.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = Config::default();

    let config_path = explicit.map(Path::to_path_buf).or_else(user_config_path);
    if let Some(path) = config_path.as_ref() {
        if path.exists() {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
                    warnings.push(format!(
                        "Refusing to read {}: file too large ({} bytes, max {})",
                        path.display(),
                        meta.len(),
                        MAX_CONFIG_FILE_BYTES
                    ));
                }
                Ok(_) => match std::fs::read_to_string(path) {
                    Ok(content) => match Config::from_toml_str(&content) {
                        Ok(parsed) => config = parsed,
                        Err(err) => {
                            warnings.push(format!("Failed to parse {}: {}", path.display(), err))
                        }
                    },
                    Err(err) => {
                        warnings.push(format!("Failed to read {}: {}", path.display(), err))
                    }
                },
                Err(err) => warnings.push(format!(
                    "Failed to read metadata for {}: {}",
                    path.display(),
                    err
                )),
            }
        } else if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    config.apply_env(|name| std::env::var(name).ok());
    (config, warnings)
}
