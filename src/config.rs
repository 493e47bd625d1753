use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub backend_api_url: String,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub cors_proxy_url: String,
    pub allowed_origins: Vec<String>,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: String,
    pub api_rps: u32,
    pub ai_rps: u32,
    pub default_test_minutes: u32,
    pub report_max_attempts: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            backend_api_url: get_env("BACKEND_API_URL")?,
            gemini_api_key: get_env("GEMINI_API_KEY")?,
            gemini_api_url: get_env_or(
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            cors_proxy_url: get_env_or("CORS_PROXY_URL", "https://api.allorigins.win/raw?url="),
            allowed_origins: get_env_or("ALLOWED_ORIGINS", "")
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            email_api_url: env::var("EMAIL_API_URL").ok().filter(|v| !v.is_empty()),
            email_api_key: env::var("EMAIL_API_KEY").ok().filter(|v| !v.is_empty()),
            email_from: get_env_or("EMAIL_FROM", "no-reply@ficct-talent.edu.bo"),
            api_rps: get_env_parse_or("API_RPS", 100)?,
            ai_rps: get_env_parse_or("AI_RPS", 5)?,
            default_test_minutes: get_env_parse_or("DEFAULT_TEST_MINUTES", 30)?,
            report_max_attempts: get_env_parse_or("REPORT_MAX_ATTEMPTS", 3)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
