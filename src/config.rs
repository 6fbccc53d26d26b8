use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Where uploaded spreadsheet exports live; relative `file_path` values in
/// sync requests are resolved against this directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub files_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Currency used for KPI cards when the data itself carries none.
    pub default_currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/shipping_settlement".to_string()),
            },
            storage: StorageConfig {
                files_dir: PathBuf::from("./files"),
            },
            report: ReportConfig {
                default_currency: "USD".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/shipping_settlement".to_string()),
            },
            storage: StorageConfig {
                files_dir: std::env::var("FILES_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./files")),
            },
            report: ReportConfig {
                default_currency: std::env::var("DEFAULT_CURRENCY")
                    .unwrap_or_else(|_| "USD".to_string()),
            },
        }
    }
}
