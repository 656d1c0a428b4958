use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analytics::AnalyticsConfig;
use crate::error::LiftLogError;
use crate::locale::Locale;
use crate::logging::LogConfig;

/// Environment variable that overrides the configured database path
pub const DATABASE_ENV: &str = "LIFTLOG_DATABASE";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Analytics thresholds
    pub analytics: AnalyticsConfig,

    /// Logging setup
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Language of recommendations, chart labels and default goal units
    pub locale: Locale,

    /// How the CLI prints results
    pub output_format: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            database_path: default_data_dir().join("liftlog.db"),
            locale: Locale::default(),
            output_format: OutputFormat::Table,
        }
    }
}

/// CLI output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// Pretty-printed JSON with the wire field names
    Json,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".liftlog")
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata::default(),
            settings: AppSettings::default(),
            analytics: AnalyticsConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Load `path` (or the default location), falling back to defaults when no file exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else if path.is_some() {
            anyhow::bail!("Config file not found: {}", config_path.display())
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }

    /// Database path after applying the `LIFTLOG_DATABASE` override
    pub fn database_path(&self) -> PathBuf {
        match std::env::var_os(DATABASE_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => self.settings.database_path.clone(),
        }
    }

    /// Reject threshold combinations the analytics engine cannot work with
    pub fn validate(&self) -> std::result::Result<(), LiftLogError> {
        let analytics = &self.analytics;

        if analytics.program_weeks == 0 {
            return Err(LiftLogError::Configuration(
                "analytics.program_weeks must be at least 1".to_string(),
            ));
        }
        if analytics.underweight_bmi >= analytics.overweight_bmi {
            return Err(LiftLogError::Configuration(format!(
                "analytics.underweight_bmi ({}) must be below analytics.overweight_bmi ({})",
                analytics.underweight_bmi, analytics.overweight_bmi
            )));
        }
        if analytics.lagging_group_ratio <= Decimal::ZERO || analytics.lagging_group_ratio > Decimal::ONE {
            return Err(LiftLogError::Configuration(format!(
                "analytics.lagging_group_ratio must be in (0, 1], got {}",
                analytics.lagging_group_ratio
            )));
        }

        Ok(())
    }
}
