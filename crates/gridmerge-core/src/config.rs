//! Settings for summarization and export.
//!
//! Every field has a default so a partial (or missing) `config.toml` is fine.

use serde::Deserialize;

use crate::error::{GridMergeError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SHEET_NAME: &str = "Merged Result";
pub const DEFAULT_FILE_NAME: &str = "merged_output.xlsx";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub summary: SummaryConfig,
    pub export: ExportConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f64,
    /// Number of data rows (after the header) sent to the service.
    pub max_rows: usize,
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: 0.3,
            max_rows: 50,
            timeout_secs: 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub sheet_name: String,
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GridMergeError::Config(e.to_string()))
    }

    /// Let the environment override the configured API key.
    ///
    /// `lookup` is `std::env::var(..).ok()` in practice; it is a parameter so
    /// tests do not have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());
        if let Some(key) = from_env {
            self.summary.api_key = Some(key);
        }
    }
}
