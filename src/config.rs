//! Wizard configuration loading.
//!
//! Provides two loading methods:
//! - `default_config()` - Loads the configuration compiled into the binary
//! - `load_config(path)` - Loads a custom configuration from a file path

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

/// Default configuration embedded in the binary at compile time.
/// Loaded from `config/wizard.toml`.
const DEFAULT_CONFIG: &str = include_str!("../config/wizard.toml");

/// Directory name used under the platform data directory.
const APP_DIR_NAME: &str = "body-assessment";

/// Root configuration loaded from wizard.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    pub storage: StorageConfig,
    pub photos: PhotoRules,
    pub analysis: AnalysisConfig,
    pub banner: BannerConfig,
}

/// Where and under which key namespace progress is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Prefix prepended to every persisted key
    pub prefix: String,
    /// SQLite file name inside the data directory
    pub database_file: String,
}

/// Constraints a captured photo file must satisfy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PhotoRules {
    pub max_size_bytes: u64,
    pub allowed_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Simulated processing delay in milliseconds
    pub delay_ms: u64,
}

/// Auto-clear durations for status banner messages.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct BannerConfig {
    pub success_ms: u64,
    pub error_ms: u64,
    pub multi_error_ms: u64,
}

impl Default for PhotoRules {
    fn default() -> Self {
        Self {
            max_size_bytes: 5 * 1024 * 1024,
            allowed_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            success_ms: 3000,
            error_ms: 5000,
            multi_error_ms: 7000,
        }
    }
}

impl AnalysisConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl WizardConfig {
    /// Full path of the SQLite store, inside the platform data directory.
    ///
    /// Falls back to the current directory when the platform exposes no
    /// data directory.
    pub fn database_path(&self) -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(&self.storage.database_file)
    }
}

/// Load configuration from a TOML file at the given path.
///
/// # Returns
/// * `Ok(WizardConfig)` - Parsed configuration
/// * `Err` - If the file cannot be read or the TOML is invalid
pub fn load_config(path: &Path) -> Result<WizardConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: WizardConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Get the default configuration embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_config() -> WizardConfig {
    toml::from_str(DEFAULT_CONFIG).expect("embedded wizard.toml must be valid TOML")
}
