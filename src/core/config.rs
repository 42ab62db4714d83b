//! Import configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default upper bound for an uploaded file (5 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Default file name for the downloadable template
pub const DEFAULT_TEMPLATE_FILE_NAME: &str = "template-users.csv";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

// comma-separated text and workbooks only; the tokenizer has no other delimiter
const KNOWN_EXTENSIONS: [&str; 6] = ["csv", "txt", "xlsx", "xls", "xlsm", "ods"];

/// Main import configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Treat the first non-blank row as a header row
    pub has_header: bool,
    pub max_file_size_bytes: u64,
    /// Lower-case extensions without the dot
    pub allowed_extensions: Vec<String>,
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
    pub template_file_name: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            has_header: true,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["csv".to_string(), "xlsx".to_string(), "xls".to_string()],
            log_level: "info".to_string(),
            template_file_name: DEFAULT_TEMPLATE_FILE_NAME.to_string(),
        }
    }
}

impl ImportConfig {
    /// Load configuration from file, creating default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ImportConfig =
                serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

            tracing::info!("Loaded configuration from: {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load from disk, falling back to defaults when the file is unreadable or invalid
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(err) => {
                    tracing::warn!(
                        "Invalid configuration detected ({}), falling back to defaults",
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(
                    "Failed to load configuration from disk: {}. Using defaults",
                    err
                );
                Self::default()
            }
        }
    }

    /// Save configuration to the platform config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = self.export()?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved configuration to: {:?}", config_path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("ir", "asll", "user-import")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Parse and validate configuration from a JSON string
    pub fn import(json: &str) -> Result<Self> {
        let config: ImportConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse imported configuration")?;

        config
            .validate()
            .with_context(|| "Imported configuration is invalid")?;

        Ok(config)
    }

    /// Whether `extension` (any case, no dot) is accepted
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.allowed_extensions.iter().any(|ext| *ext == extension)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size_bytes == 0 {
            anyhow::bail!("Max file size must be greater than 0");
        }

        if self.allowed_extensions.is_empty() {
            anyhow::bail!("At least one file extension must be allowed");
        }

        for ext in &self.allowed_extensions {
            if !KNOWN_EXTENSIONS.contains(&ext.as_str()) {
                anyhow::bail!("Unsupported file extension in configuration: {}", ext);
            }
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        if self.template_file_name.trim().is_empty() {
            anyhow::bail!("Template file name must not be empty");
        }

        Ok(())
    }
}
