use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct SalesConfig {
    pub common: core_config::Config,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub defaults: OrderDefaults,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// When unset, the service runs against the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Secret<String>,
}

/// Defaults filled into a sales order before submission when the draft
/// leaves them blank.
#[derive(Debug, Clone)]
pub struct OrderDefaults {
    pub company: String,
    pub naming_series: String,
    pub order_type: String,
}

impl SalesConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(SalesConfig {
            common,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok(),
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
                min_connections: get_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?
                    .parse()
                    .unwrap_or(1),
            },
            session: SessionConfig {
                secret: Secret::new(get_env("SESSION_SECRET", Some("dev-session-secret"), is_prod)?),
            },
            defaults: OrderDefaults {
                company: get_env("DEFAULT_COMPANY", Some("Demo Company"), is_prod)?,
                naming_series: get_env("ORDER_NAMING_SERIES", Some("SO-"), is_prod)?,
                order_type: get_env("ORDER_TYPE", Some("Sales"), is_prod)?,
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
