//! Deployment configuration.
//!
//! An optional TOML file at `<config dir>/didun-order/config.toml` plus
//! environment overrides, resolved as: env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use order_core::{export::CaptureOptions, store::StoreConfig};
use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "didun-order";

pub const ENV_VENDOR_PHONE: &str = "DIDUN_VENDOR_PHONE";
pub const ENV_STORE_BACKEND: &str = "DIDUN_STORE_BACKEND";
pub const ENV_STORE_LOCATION: &str = "DIDUN_STORE_LOCATION";
pub const ENV_DOWNLOAD_DIR: &str = "DIDUN_DOWNLOAD_DIR";
pub const ENV_LOG: &str = "DIDUN_LOG";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DB_FILE: &str = "order-form.db";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub vendor: VendorSection,
    pub store: StoreSection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorSection {
    /// Vendor WhatsApp number, any formatting.
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub download_dir: Option<PathBuf>,
    pub pixel_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Where the default SQLite database lives.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Reads `path`; a missing file is not an error.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Raw vendor number; validated when a message is sent.
    pub vendor_phone: Option<String>,
    pub store: StoreConfig,
    /// `None` means the platform download directory.
    pub download_dir: Option<PathBuf>,
    pub capture: CaptureOptions,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Loads `path` (or the default config location) and applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        let file = load_config_file(&path)?;
        Ok(Self::resolve(file.unwrap_or_default(), |key| {
            std::env::var(key).ok()
        }))
    }

    /// Resolution chain: env var > config file > default.
    ///
    /// Empty environment values count as unset.
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let vendor_phone = env(ENV_VENDOR_PHONE).or(file.vendor.phone);

        let backend = env(ENV_STORE_BACKEND)
            .or(file.store.backend)
            .unwrap_or_else(|| "sqlite".to_string())
            .to_lowercase();
        let location = env(ENV_STORE_LOCATION)
            .or(file.store.location)
            .unwrap_or_else(|| default_location(&backend));

        let download_dir = env(ENV_DOWNLOAD_DIR)
            .map(PathBuf::from)
            .or(file.export.download_dir);

        let capture = match file.export.pixel_ratio {
            Some(ratio) => CaptureOptions::default().with_pixel_ratio(ratio),
            None => CaptureOptions::default(),
        };

        let log_level = env(ENV_LOG)
            .or(file.logging.level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self {
            vendor_phone,
            store: StoreConfig { backend, location },
            download_dir,
            capture,
            log_level,
            log_file: file.logging.file,
        }
    }
}

fn default_location(backend: &str) -> String {
    match backend {
        "sqlite" => data_dir().join(DEFAULT_DB_FILE).to_string_lossy().into_owned(),
        _ => String::new(),
    }
}
