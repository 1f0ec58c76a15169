use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_timeout_ms: u64,
    pub llm_retries: u32,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("FEEDBACK_PORT", "8000"),
            database_path: try_load("FEEDBACK_DB_PATH", "feedback.db"),
            jwt_secret: try_load("JWT_SECRET", "change_me"),
            llm_url: try_load("LLM_URL", "http://localhost:11434"),
            llm_model: try_load("LLM_MODEL", "deepseek-r1:7b"),
            llm_timeout_ms: try_load("LLM_TIMEOUT_MS", "30000"),
            llm_retries: try_load("LLM_RETRIES", "2"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
