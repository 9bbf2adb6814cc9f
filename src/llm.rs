use std::{fmt, str::FromStr, time::Duration};
use reqwest::blocking::{Client, Response};
use serde::{Serialize, Deserialize};
use crate::{
    config::Config,
    error::{Error, UpstreamError},
    gemini::GeminiClient,
    message::Message,
    openai::OpenAiClient,
};

/// A hosted text-generation endpoint. Each call is one blocking
/// request/response exchange carrying the whole context.
pub trait ModelClient {
    fn generate(&self, system_prompt: &str, context: &[Message], user_text: &str) -> Result<String, UpstreamError>;
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[serde(alias = "google")]
    Gemini,
    #[serde(rename = "openai", alias = "openai-compatible")]
    OpenAi,
}

impl Provider {
    pub fn default_api_addr(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        })
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" | "openai-compatible" => Ok(Provider::OpenAi),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Builds the client for the configured provider. Only called once a
/// credential has been resolved.
pub fn connect(config: &Config, api_key: &str) -> Result<Box<dyn ModelClient>, Error> {
    let http = http_client(config)?;
    let api_addr = config.api_addr().to_string();
    log::info!("Using {} model '{}' at {}", config.provider, config.model, api_addr);
    let client: Box<dyn ModelClient> = match config.provider {
        Provider::Gemini => Box::new(GeminiClient::new(http, api_addr, api_key.to_string(), config.model.clone())),
        Provider::OpenAi => Box::new(OpenAiClient::new(http, api_addr, api_key.to_string(), config.model.clone())),
    };
    Ok(client)
}

fn http_client(config: &Config) -> Result<Client, Error> {
    let timeout = match config.request_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Configuration(format!("failed to create HTTP client: {}", e)))
}

/// Trailing slice of `history` that fits in `window` messages, cut on a turn
/// boundary so the context never opens with an orphaned assistant reply.
pub fn context_window(history: &[Message], window: usize) -> &[Message] {
    if window == 0 || history.len() <= window {
        return history;
    }
    let keep = window - window % 2;
    &history[history.len() - keep..]
}

/// Turns a non-2xx response into an `UpstreamError::Status`, pulling the
/// provider's `error.message` out of the body when there is one.
pub fn check_status(res: Response) -> Result<Response, UpstreamError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| match status.as_u16() {
            401 | 403 => "Invalid API key or authentication failed".to_string(),
            404 => "API endpoint not found".to_string(),
            429 => "Rate limit or quota exceeded".to_string(),
            _ => body,
        });
    Err(UpstreamError::Status { status: status.as_u16(), message })
}
