use reqwest::blocking::Client;
use serde::{Serialize, Deserialize};
use crate::{
    error::UpstreamError,
    llm::{check_status, ModelClient},
    message::{Message, Role},
};

pub struct GeminiClient {
    http: Client,
    api_addr: String,
    api_key: String,
    model: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(http: Client, api_addr: String, api_key: String, model: String) -> Self {
        Self { http, api_addr, api_key, model }
    }

    fn url(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.api_addr, model)
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn build_request<'a>(system_prompt: &'a str, context: &'a [Message], user_text: &'a str) -> GenerateRequest<'a> {
    let contents = context
        .iter()
        .map(|m| Content { role: Some(role_name(m.role())), parts: vec![Part { text: m.text() }] })
        .chain(std::iter::once(Content { role: Some("user"), parts: vec![Part { text: user_text }] }))
        .collect();
    GenerateRequest {
        system_instruction: Content { role: None, parts: vec![Part { text: system_prompt }] },
        contents,
    }
}

fn extract_reply(res: GenerateResponse) -> Result<String, UpstreamError> {
    let text: String = res
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(UpstreamError::EmptyReply);
    }
    Ok(text)
}

impl ModelClient for GeminiClient {
    fn generate(&self, system_prompt: &str, context: &[Message], user_text: &str) -> Result<String, UpstreamError> {
        let body = build_request(system_prompt, context, user_text);
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("[API request]\n{}", serde_json::to_string_pretty(&body)?);
        }

        let res = self
            .http
            .post(self.url())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;
        let res = check_status(res)?;
        let text = res.text()?;
        extract_reply(serde_json::from_str(&text)?)
    }
}
