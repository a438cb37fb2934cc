use crate::CompleteError;
use crate::http::{default_agent, post_json};
use crate::types::CompletionRequest;
use serde::Deserialize;
use serde_json::json;

use super::CompletionProvider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI-compatible chat completions client.
pub struct OpenAiProvider {
    model: String,
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl OpenAiProvider {
    pub fn new(model: Option<&str>, api_key: Option<&str>) -> Result<Self, CompleteError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CompleteError::Failed("OpenAI API key not set".into()))?
            .to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Ok(Self {
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            agent: default_agent(),
        })
    }

    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_output_tokens,
        })
    }

    fn parse_response(body: &str) -> Result<String, CompleteError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| CompleteError::InvalidResponse(e.to_string()))?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompleteError::InvalidResponse("no choices".into()))?;
        Ok(choice
            .message
            .content
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&mut self, request: &CompletionRequest) -> Result<String, CompleteError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(request);
        tracing::debug!(model = %self.model, max_tokens = request.max_output_tokens, "openai request");
        let raw = post_json(&self.agent, &url, Some(&self.api_key), &body)?;
        Self::parse_response(raw.trim())
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
