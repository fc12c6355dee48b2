//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development.

use serde::{Deserialize, Serialize};
use std::env;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret shared with the identity provider that issues tokens
    pub jwt_secret: String,

    /// Whether recording a sale also decrements each line's product stock.
    ///
    /// Off by default: many shops track stock with manual adjustments and
    /// only want the sales ledger. Turn on per deployment when the shelf
    /// count should follow the register.
    pub deduct_stock_on_sale: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("DUKAN_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DUKAN_PORT".to_string()))?,

            database_path: env::var("DUKAN_DATABASE_PATH")
                .unwrap_or_else(|_| "dukan.db".to_string()),

            jwt_secret: env::var("DUKAN_JWT_SECRET").unwrap_or_else(|_| {
                // In production this MUST be set via environment variable
                "dukan-dev-secret-change-in-production".to_string()
            }),

            deduct_stock_on_sale: env::var("DUKAN_DEDUCT_STOCK")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DUKAN_DEDUCT_STOCK".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
