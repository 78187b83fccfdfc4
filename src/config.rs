use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

/// Process configuration, built once in `main` and handed to each component
/// constructor. No global access.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub jwt_secret: String,
    pub openai_api_key: String,
    pub email_gateway_url: String,
    pub email_gateway_token: String,
    pub email_from: String,
    pub calendar_api_url: String,
    pub calendar_api_token: String,
    pub base_url: String,
    pub uploads_dir: String,
    pub min_score_threshold: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Self {
            server_address: get_env("SERVER_ADDRESS")?,
            jwt_secret: get_env("JWT_SECRET")?,
            openai_api_key: get_env("OPENAI_API_KEY")?,
            email_gateway_url: get_env("EMAIL_GATEWAY_URL")?,
            email_gateway_token: get_env("EMAIL_GATEWAY_TOKEN")?,
            email_from: get_env_or("EMAIL_FROM", "hr@example.com"),
            calendar_api_url: get_env("CALENDAR_API_URL")?,
            calendar_api_token: get_env("CALENDAR_API_TOKEN")?,
            base_url: get_env("BASE_URL")?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads/resumes"),
            min_score_threshold: get_env_parse_or("MIN_SCORE_THRESHOLD", 0.7)?,
        };

        if config.jwt_secret.trim().is_empty() {
            return Err(Error::Config("JWT_SECRET must not be empty".to_string()));
        }

        Ok(config)
    }
}

/// Requirements for the open position, loaded once and shared read-only by
/// the eligibility evaluator.
#[derive(Debug, Clone)]
pub struct JobRequirements {
    pub must_have_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub min_experience: String,
    pub min_must_have_count: usize,
    pub min_score_threshold: f64,
    pub education_threshold: f64,
}

impl JobRequirements {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_score_threshold: config.min_score_threshold,
            ..Self::default()
        }
    }
}

impl Default for JobRequirements {
    fn default() -> Self {
        Self {
            must_have_skills: vec!["Python".to_string(), "SQL".to_string()],
            preferred_skills: vec![
                "JavaScript".to_string(),
                "Docker".to_string(),
                "AWS".to_string(),
            ],
            min_experience: "3+ years".to_string(),
            min_must_have_count: 2,
            min_score_threshold: 0.7,
            education_threshold: 0.6,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
