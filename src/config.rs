use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub zoom: ZoomConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Identity of the single administrator account this deployment serves.
/// Storage stays keyed by `username`, so the data model remains multi-admin
/// even though only one admin is configured at a time.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoomConfig {
    pub account_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Email of the Zoom user meetings are created under.
    pub host_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Allowed requests per second (per IP) for public scheduling endpoints
    pub public_per_second: u32,
    /// Burst size for public scheduling endpoints
    pub public_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/scheduler.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME")
                    .map_err(|_| ConfigError::MissingEnv("ADMIN_USERNAME".to_string()))?,
                api_token: env::var("ADMIN_API_TOKEN")
                    .map_err(|_| ConfigError::MissingEnv("ADMIN_API_TOKEN".to_string()))?,
            },
            zoom: ZoomConfig {
                account_id: env::var("ZOOM_ACCOUNT_ID").ok(),
                client_id: env::var("ZOOM_CLIENT_ID").ok(),
                client_secret: env::var("ZOOM_CLIENT_SECRET").ok(),
                host_email: env::var("ZOOM_HOST_EMAIL").ok(),
            },
            rate_limit: RateLimitConfig {
                public_per_second: env::var("RATE_LIMIT_PUBLIC_PER_SECOND")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                public_burst: env::var("RATE_LIMIT_PUBLIC_BURST")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                frontend_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://data/scheduler.db".to_string(),
                max_connections: 5,
            },
            admin: AdminConfig {
                username: String::new(),
                api_token: String::new(),
            },
            zoom: ZoomConfig {
                account_id: None,
                client_id: None,
                client_secret: None,
                host_email: None,
            },
            rate_limit: RateLimitConfig {
                public_per_second: 10,
                public_burst: 30,
            },
        }
    }
}
