use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::session::SessionScope;

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Application configuration loaded from environment variables.
/// Startup fails if no API key is set (`ANTHROPIC_API_KEY`, or the legacy
/// `CLAUDE_API_KEY`) or any value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub llm_request_timeout: Duration,
    pub llm_max_retries: u32,
    /// Upper bound on one generation call, retries included.
    pub generation_deadline: Duration,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Defaults to `Session` when origins are listed, `Process` otherwise.
    pub session_scope: SessionScope,
    /// Idle lifetime of a session cookie, and how long generated documents are kept.
    pub session_ttl: Duration,
    pub prompt_template_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::load()
    }

    /// Reads the process environment without touching `.env`.
    pub fn load() -> Result<Self> {
        let llm_temperature: f32 = parse_env("LLM_TEMPERATURE", 0.1)?;
        if !(0.0..=1.0).contains(&llm_temperature) {
            bail!("LLM_TEMPERATURE must be between 0.0 and 1.0, got {llm_temperature}");
        }

        let llm_max_retries: u32 = parse_env("LLM_MAX_RETRIES", 3)?;
        if llm_max_retries == 0 {
            bail!("LLM_MAX_RETRIES must be at least 1");
        }

        let session_ttl = Duration::from_secs(parse_env("SESSION_TTL_SECS", 24 * 60 * 60)?);
        if session_ttl.is_zero() {
            bail!("SESSION_TTL_SECS must be at least 1");
        }

        // Cookie sessions need credentialed CORS, which a wildcard origin cannot have.
        let cors_allowed_origins = parse_origins(optional_env("CORS_ALLOWED_ORIGINS"));
        let default_scope = match cors_allowed_origins {
            Some(_) => SessionScope::Session,
            None => SessionScope::Process,
        };
        let session_scope = parse_env("SESSION_SCOPE", default_scope)?;
        if session_scope == SessionScope::Session && cors_allowed_origins.is_none() {
            bail!(
                "SESSION_SCOPE=session requires CORS_ALLOWED_ORIGINS to list the frontend \
                 origin(s); browsers drop the session cookie under a wildcard origin"
            );
        }

        Ok(Config {
            anthropic_api_key: require_any_env(&["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"])?,
            anthropic_api_url: optional_env("ANTHROPIC_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            host: optional_env("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_env("PORT", 5000)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", 1000)?,
            llm_temperature,
            llm_request_timeout: Duration::from_secs(parse_env("LLM_REQUEST_TIMEOUT_SECS", 120)?),
            llm_max_retries,
            generation_deadline: Duration::from_secs(parse_env("GENERATION_DEADLINE_SECS", 180)?),
            cors_allowed_origins,
            session_scope,
            session_ttl,
            prompt_template_path: optional_env("PROMPT_TEMPLATE_PATH").map(PathBuf::from),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

/// First of `keys` that is set, in order.
fn require_any_env(keys: &[&str]) -> Result<String> {
    keys.iter().find_map(|key| optional_env(key)).with_context(|| {
        format!(
            "Required environment variable '{}' is not set",
            keys.join("' or '")
        )
    })
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}

fn parse_origins(raw: Option<String>) -> Option<Vec<String>> {
    let raw = raw?;
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        None
    } else {
        Some(origins)
    }
}
