use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracker_core::{ExportOptions, SearchMode};

use crate::ConfigError;

/// User preferences for the shell and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub currency: String,
    pub locale: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub search_mode: SearchMode,
    #[serde(default = "Config::default_export_base_name")]
    pub export_base_name: String,
    #[serde(default = "Config::default_export_title")]
    pub export_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Where `export` writes files when `--dir` is absent. Defaults to the working directory.
    pub export_dir: Option<PathBuf>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            locale: "en-US".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            search_mode: SearchMode::default(),
            export_base_name: Self::default_export_base_name(),
            export_title: Self::default_export_title(),
            export_dir: None,
            backup_retention: Self::default_backup_retention(),
        }
    }
}

impl Config {
    /// Keys accepted by [`Config::set`] and [`Config::get`], in display order.
    pub const KEYS: [&'static str; 8] = [
        "currency",
        "locale",
        "ui_color_enabled",
        "search_mode",
        "export_base_name",
        "export_title",
        "export_dir",
        "backup_retention",
    ];

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_export_base_name() -> String {
        "expenses".into()
    }

    pub fn default_export_title() -> String {
        "Expense Report".into()
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    /// Current value of `key` rendered as text.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "currency" => self.currency.clone(),
            "locale" => self.locale.clone(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "search_mode" => self.search_mode.to_string(),
            "export_base_name" => self.export_base_name.clone(),
            "export_title" => self.export_title.clone(),
            "export_dir" => self
                .export_dir
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| "(current directory)".into()),
            "backup_retention" => self.backup_retention.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parses `value` for `key` and stores it. Leaves `self` untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "currency" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(invalid(key, "expected a three-letter currency code"));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "locale" => self.locale = non_empty(key, value)?,
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid(key, "expected true or false")),
                }
            }
            "search_mode" => {
                self.search_mode = value.parse().map_err(|reason| invalid(key, reason))?;
            }
            "export_base_name" => self.export_base_name = non_empty(key, value)?,
            "export_title" => self.export_title = non_empty(key, value)?,
            "export_dir" => {
                self.export_dir = match value {
                    "" | "none" | "-" => None,
                    path => Some(PathBuf::from(path)),
                }
            }
            "backup_retention" => {
                self.backup_retention = match value.parse::<usize>() {
                    Ok(count) if count >= 1 => count,
                    _ => return Err(invalid(key, "expected a whole number of at least 1")),
                }
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Export presentation derived from these preferences.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            base_name: self.export_base_name.clone(),
            title: self.export_title.clone(),
            currency: self.currency.clone(),
        }
    }

    pub fn resolve_export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        Err(invalid(key, "value cannot be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}
