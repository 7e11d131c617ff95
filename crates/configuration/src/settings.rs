use crate::error::ConfigError;
use core_types::PanelLimits;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetSettings,
    pub display: DisplaySettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

/// Where the order file lives and how it is delimited.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub path: PathBuf,
    /// A single ASCII character, e.g. "," or "\t".
    pub delimiter: String,
}

/// Row limits and chart sizing for the dashboard panels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub top_regions: usize,
    pub top_products: usize,
    pub top_categories: usize,
    pub rfm_top: usize,
    pub table_preview: usize,
    /// Width in characters of the longest bar in terminal charts.
    pub chart_width: usize,
}

/// Bind address for the JSON dashboard API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("main_data.csv"),
            delimiter: ",".to_string(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let limits = PanelLimits::default();
        Self {
            top_regions: limits.top_regions,
            top_products: limits.top_products,
            top_categories: limits.top_categories,
            rfm_top: limits.rfm_top,
            table_preview: limits.table_preview,
            chart_width: 40,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Checks the values serde cannot: non-empty paths, non-zero limits, a usable delimiter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "dataset.path must not be empty".to_string(),
            ));
        }
        self.dataset.delimiter_byte()?;

        let display = &self.display;
        let limits = [
            ("display.top_regions", display.top_regions),
            ("display.top_products", display.top_products),
            ("display.top_categories", display.top_categories),
            ("display.rfm_top", display.rfm_top),
            ("display.table_preview", display.table_preview),
            ("display.chart_width", display.chart_width),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be greater than zero"
            )));
        }

        self.server.socket_addr()?;
        Ok(())
    }
}

impl DatasetSettings {
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ConfigError::ValidationError(format!(
                "dataset.delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}

impl DisplaySettings {
    pub fn limits(&self) -> PanelLimits {
        PanelLimits {
            top_regions: self.top_regions,
            top_products: self.top_products,
            top_categories: self.top_categories,
            rfm_top: self.rfm_top,
            table_preview: self.table_preview,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "server.host '{}' is not an IP address",
                self.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
