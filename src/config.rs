use std::env;
use std::time::Duration;

use crate::domain::models::session::Role;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub role: Role,
    pub request_timeout: Duration,
    pub refresh_interval: Duration,
    pub log_dir: String,
    /// `EnvFilter` directive for the JSON log file.
    pub log_filter: String,
}

pub const DEFAULT_LOG_FILTER: &str = "info,journee_proches=debug";

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let api_base_url = env::var("JDP_API_URL")
            .map_err(|_| AppError::Config("JDP_API_URL must be set".into()))?;

        let role = match env::var("JDP_ROLE") {
            Ok(raw) => raw.parse()?,
            Err(_) => Role::Agent,
        };

        Ok(Self {
            api_base_url,
            api_token: env::var("JDP_API_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            role,
            request_timeout: Duration::from_secs(secs_var("JDP_REQUEST_TIMEOUT_SECS", 15)?),
            refresh_interval: Duration::from_secs(secs_var("JDP_REFRESH_INTERVAL_SECS", 30)?),
            log_dir: env::var("JDP_LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
            log_filter: env::var("JDP_LOG_FILTER").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Config pointing at `api_base_url` with every other value defaulted.
    pub fn for_api(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_token: None,
            role: Role::Agent,
            request_timeout: Duration::from_secs(15),
            refresh_interval: Duration::from_secs(30),
            log_dir: "./logs".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn secs_var(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| AppError::Config(format!("{} must be a positive number of seconds", name))),
        Err(_) => Ok(default),
    }
}
