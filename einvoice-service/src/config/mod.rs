use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEV_JWT_SECRET: &str = "einvoice-dev-secret";

#[derive(Debug, Clone, Deserialize)]
pub struct EInvoiceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
    /// Set when `JWT_SECRET` was absent outside production.
    #[serde(default)]
    pub dev_secret: bool,
}

impl EInvoiceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "postgres://{}:{}@{}:{}/{}",
                get_env("DB_USER", Some("postgres"), is_prod)?,
                get_env("DB_PASSWORD", Some("root"), is_prod)?,
                get_env("DB_HOST", Some("localhost"), is_prod)?,
                get_env("DB_PORT", Some("5432"), is_prod)?,
                get_env("DB_NAME", Some("einvoice"), is_prod)?,
            ),
        };

        let (jwt_secret, dev_secret) = match env::var("JWT_SECRET") {
            Ok(secret) => (secret, false),
            Err(_) if !is_prod => (DEV_JWT_SECRET.to_string(), true),
            Err(_) => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET is required in production but not set"
                )))
            }
        };

        Ok(EInvoiceConfig {
            common: common_config,
            database: DatabaseConfig {
                url: Secret::new(url),
                max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env("DB_MIN_CONNECTIONS", 1)?,
            },
            auth: AuthConfig {
                jwt_secret: Secret::new(jwt_secret),
                dev_secret,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env(key: &str, default: u32) -> Result<u32, AppError> {
    match env::var(key) {
        Ok(val) => val.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} must be a number: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}
