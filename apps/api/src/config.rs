use std::str::FromStr;

use anyhow::{Context, Result};

/// Text-to-speech settings sent with every new agent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettings {
    pub provider: String,
    pub voice_id: String,
    pub model: String,
    pub stability: f32,
    pub similarity_boost: f32,
}

/// Speech-recognition settings sent with every new agent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriberSettings {
    pub provider: String,
    pub model: String,
    pub language: String,
}

/// Conversational model that drives the interviewer persona.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatModelSettings {
    pub provider: String,
    pub model: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required keys are missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub vapi_api_key: String,
    pub vapi_public_key: String,
    pub vapi_base_url: String,
    pub voice: VoiceSettings,
    pub transcriber: TranscriberSettings,
    pub chat_model: ChatModelSettings,
    pub max_call_duration_secs: u32,
    pub delete_replaced_agents: bool,
    pub http_timeout_secs: u64,
    pub feedback_poll_interval_secs: u64,
    pub feedback_poll_max_attempts: u32,
    pub max_upload_bytes: usize,
    /// When set, every `/api/v1` route requires the `x-access-password` header.
    pub app_password: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        Ok(Config {
            gemini_api_key: env.require("GEMINI_API_KEY")?,
            gemini_model: env.or("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_base_url: env.or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            vapi_api_key: env.require("VAPI_API_KEY")?,
            vapi_public_key: env.require("VAPI_PUBLIC_KEY")?,
            vapi_base_url: env.or("VAPI_BASE_URL", "https://api.vapi.ai"),
            voice: VoiceSettings {
                provider: env.or("VOICE_PROVIDER", "11labs"),
                voice_id: env.or("VOICE_ID", "xZp4zaaBzoWhWxxrcAij"),
                model: env.or("VOICE_MODEL", "eleven_multilingual_v2"),
                stability: env.parse_or("VOICE_STABILITY", 0.5)?,
                similarity_boost: env.parse_or("VOICE_SIMILARITY_BOOST", 0.75)?,
            },
            transcriber: TranscriberSettings {
                provider: env.or("TRANSCRIBER_PROVIDER", "deepgram"),
                model: env.or("TRANSCRIBER_MODEL", "nova-2"),
                language: env.or("TRANSCRIBER_LANGUAGE", "en"),
            },
            chat_model: ChatModelSettings {
                provider: env.or("CHAT_MODEL_PROVIDER", "openai"),
                model: env.or("CHAT_MODEL", "gpt-4o-mini"),
            },
            max_call_duration_secs: env.parse_or("MAX_CALL_DURATION_SECS", 2400)?,
            delete_replaced_agents: env.parse_or("DELETE_REPLACED_AGENTS", false)?,
            http_timeout_secs: env.parse_or("HTTP_TIMEOUT_SECS", 120)?,
            feedback_poll_interval_secs: env.parse_or("FEEDBACK_POLL_INTERVAL_SECS", 10)?,
            feedback_poll_max_attempts: env.parse_or("FEEDBACK_POLL_MAX_ATTEMPTS", 30)?,
            max_upload_bytes: env
                .parse_or::<usize>("MAX_UPLOAD_MB", 20)?
                .checked_mul(1024 * 1024)
                .context("MAX_UPLOAD_MB is too large")?,
            app_password: env.optional("APP_PASSWORD"),
            port: env.parse_or("PORT", 8080)?,
            rust_log: env.or("RUST_LOG", "info"),
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.optional(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value '{raw}'")),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    let vars = std::collections::HashMap::from([
        ("GEMINI_API_KEY", "gemini-test-key"),
        ("VAPI_API_KEY", "vapi-test-key"),
        ("VAPI_PUBLIC_KEY", "vapi-public-key"),
        ("FEEDBACK_POLL_INTERVAL_SECS", "0"),
        ("FEEDBACK_POLL_MAX_ATTEMPTS", "3"),
    ]);
    Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
        .expect("test config must be valid")
}
