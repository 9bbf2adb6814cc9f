use reqwest::blocking::Client;
use serde::Serialize;
use crate::{
    error::UpstreamError,
    llm::{check_status, ModelClient},
    message::Message,
};

/// Any server speaking the OpenAI `/chat/completions` dialect.
pub struct OpenAiClient {
    http: Client,
    api_addr: String,
    api_key: String,
    model: String,
}

#[derive(Serialize, Debug)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl OpenAiClient {
    pub fn new(http: Client, api_addr: String, api_key: String, model: String) -> Self {
        Self { http, api_addr, api_key, model }
    }
}

fn wire_messages<'a>(system_prompt: &'a str, context: &'a [Message], user_text: &'a str) -> Vec<WireMessage<'a>> {
    std::iter::once(WireMessage { role: "system", content: system_prompt })
        .chain(context.iter().map(|m| WireMessage { role: m.role().as_str(), content: m.text() }))
        .chain(std::iter::once(WireMessage { role: "user", content: user_text }))
        .collect()
}

impl ModelClient for OpenAiClient {
    fn generate(&self, system_prompt: &str, context: &[Message], user_text: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/chat/completions", self.api_addr);
        let conversation = wire_messages(system_prompt, context, user_text);

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("[API request]\n{}", serde_json::to_string_pretty(&conversation)?);
        }

        let res = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "model": &self.model, "messages": conversation }))
            .send()?;
        let res = check_status(res)?;

        let json: serde_json::Value = serde_json::from_str(&res.text()?)?;
        let content = json["choices"][0]["message"]["content"].as_str().unwrap_or("").to_string();
        if content.trim().is_empty() {
            return Err(UpstreamError::EmptyReply);
        }
        Ok(content)
    }
}
