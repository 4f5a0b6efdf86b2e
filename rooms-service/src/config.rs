use crate::utils::errors::{Result, RoomsServiceError};
use serde::Deserialize;

/// Upper bound for `rooms.default_validity_days` (one hundred years)
pub const MAX_VALIDITY_DAYS: i64 = 36_500;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rooms: RoomsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoomsConfig {
    /// Values accepted in the `api-version` query parameter
    pub supported_api_versions: Vec<String>,
    /// Length of the validity window when a create request omits `validUntil`
    pub default_validity_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            rooms: RoomsConfig {
                supported_api_versions: vec![
                    "2022-02-01-preview".to_string(),
                    "2023-03-31-preview".to_string(),
                ],
                default_validity_days: 180,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // TOML file first, defaults when it does not exist
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "/etc/rooms-service/config.toml".to_string());

        let mut config = if std::path::Path::new(&config_path).exists() {
            let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
                RoomsServiceError::Configuration(format!("Failed to read config file {}: {}", config_path, e))
            })?;
            Self::from_toml(&config_str)?
        } else {
            AppConfig::default()
        };

        // Environment variables override the file
        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| RoomsServiceError::Configuration(format!("Invalid port: {}", e)))?;
        }
        if let Ok(days) = std::env::var("ROOMS_DEFAULT_VALIDITY_DAYS") {
            config.rooms.default_validity_days = days.parse().map_err(|e| {
                RoomsServiceError::Configuration(format!("Invalid default validity: {}", e))
            })?;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        toml::from_str::<AppConfig>(config_str)
            .map_err(|e| RoomsServiceError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.rooms.supported_api_versions.is_empty() {
            return Err(RoomsServiceError::Configuration(
                "At least one api-version must be supported".to_string(),
            ));
        }
        if !(1..=MAX_VALIDITY_DAYS).contains(&self.rooms.default_validity_days) {
            return Err(RoomsServiceError::Configuration(format!(
                "default_validity_days must be between 1 and {}, got {}",
                MAX_VALIDITY_DAYS, self.rooms.default_validity_days
            )));
        }
        Ok(())
    }
}
