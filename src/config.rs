use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Local inference service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub model: String,
    pub probe_timeout_ms: u64,
    pub completion_timeout_secs: u64,
    pub analysis_temperature: f32,
    pub extraction_temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            probe_timeout_ms: 2000,
            completion_timeout_secs: 120,
            analysis_temperature: 0.3,
            extraction_temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub use_ai: bool,
    pub deep: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            use_ai: true,
            deep: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub gates: bool,
    pub quantum: bool,
    pub dimensions: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            gates: true,
            quantum: true,
            dimensions: true,
        }
    }
}

impl From<&ExtractionConfig> for crate::insight::ExtractionOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            gates: config.gates,
            quantum: config.quantum,
            dimensions: config.dimensions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.local/share/paper".to_string(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).as_ref())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.apply_env();

        Ok(config)
    }

    /// Load configuration from default location or return defaults
    pub fn load() -> Result<Self> {
        let default_paths = [
            PathBuf::from("config/settings.toml"),
            PathBuf::from("./config/settings.toml"),
            PathBuf::from(shellexpand::tilde("~/.config/paper/settings.toml").as_ref()),
        ];

        for path in &default_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// `PAPER_ENDPOINT` overrides the configured gateway endpoint
    fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("PAPER_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.gateway.endpoint = endpoint.trim().to_string();
            }
        }
    }
}
