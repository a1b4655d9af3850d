use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub directory: DirectorySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Radii and result caps used by the HTTP handlers
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_emergency_radius_km")]
    pub emergency_radius_km: f64,
    #[serde(default = "default_service_radius_km")]
    pub default_service_radius_km: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_incoming_requests_limit")]
    pub incoming_requests_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            emergency_radius_km: default_emergency_radius_km(),
            default_service_radius_km: default_service_radius_km(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            incoming_requests_limit: default_incoming_requests_limit(),
        }
    }
}

impl MatchingSettings {
    /// Requested limit, defaulted and capped
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

fn default_emergency_radius_km() -> f64 { 25.0 }
fn default_service_radius_km() -> f64 { 10.0 }
fn default_limit() -> usize { 10 }
fn default_max_limit() -> usize { 50 }
fn default_incoming_requests_limit() -> usize { 10 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorySettings {
    /// JSON seed file loaded at startup
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with BLOODBRIDGE__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., BLOODBRIDGE__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("BLOODBRIDGE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
