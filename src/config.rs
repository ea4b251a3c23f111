use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub players: String,
    pub profile_images: String,
    #[serde(default = "default_roster_limit")]
    pub roster_limit: u32,
}

fn default_roster_limit() -> u32 { 5000 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            country: default_country(),
            timeout_secs: default_geocoding_timeout(),
        }
    }
}

fn default_geocoding_url() -> String { "https://api.zippopotam.us".to_string() }
fn default_country() -> String { "us".to_string() }
fn default_geocoding_timeout() -> u64 { 10 }

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
    /// 3. Environment variables (prefixed with RALLY_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local development overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., RALLY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RALLY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_appwrite_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RALLY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Appwrite credentials may also come from `RALLY_APPWRITE__*` variables
/// (single underscore after the prefix), as deployment secrets are named
fn apply_appwrite_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("RALLY_APPWRITE__ENDPOINT", "appwrite.endpoint"),
        ("RALLY_APPWRITE__API_KEY", "appwrite.api_key"),
        ("RALLY_APPWRITE__PROJECT_ID", "appwrite.project_id"),
        ("RALLY_APPWRITE__DATABASE_ID", "appwrite.database_id"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
