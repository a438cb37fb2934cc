use crate::CompleteError;
use crate::http::{default_agent, post_json};
use crate::types::CompletionRequest;
use serde::Deserialize;
use serde_json::json;

use super::CompletionProvider;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaProvider {
    model: String,
    base_url: String,
    agent: ureq::Agent,
}

impl OllamaProvider {
    pub fn new(model: &str) -> Result<Self, CompleteError> {
        let base_url = std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: default_agent(),
        })
    }

    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "system": request.system_prompt,
            "prompt": request.user_prompt,
            "stream": true,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_output_tokens,
            },
        })
    }

    /// Concatenate the `response` fields of a streamed NDJSON body.
    fn collect_stream(raw: &str) -> Result<String, CompleteError> {
        let mut full_text = String::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let chunk: OllamaChunk = serde_json::from_str(line)
                .map_err(|e| CompleteError::InvalidResponse(e.to_string()))?;
            if let Some(error) = chunk.error {
                return Err(CompleteError::Failed(error));
            }
            if let Some(token) = chunk.response {
                full_text.push_str(&token);
            }
            if chunk.done.unwrap_or(false) {
                break;
            }
        }
        Ok(full_text.trim().to_string())
    }
}

impl CompletionProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&mut self, request: &CompletionRequest) -> Result<String, CompleteError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = self.build_request_body(request);
        tracing::debug!(model = %self.model, num_predict = request.max_output_tokens, "ollama request");
        let raw = post_json(&self.agent, &url, None, &body)?;
        Self::collect_stream(&raw)
    }
}

#[derive(Deserialize)]
struct OllamaChunk {
    response: Option<String>,
    done: Option<bool>,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_stream_joins_tokens_until_done() {
        let raw = concat!(
            "{\"response\":\"犬種\",\"done\":false}\n",
            "\n",
            "{\"response\":\"です\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true}\n",
            "{\"response\":\"ignored\",\"done\":false}\n",
        );
        assert_eq!(OllamaProvider::collect_stream(raw).unwrap(), "犬種です");
    }

    #[test]
    fn collect_stream_surfaces_server_error() {
        let raw = "{\"error\":\"model not found\"}\n";
        let err = OllamaProvider::collect_stream(raw).unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn collect_stream_rejects_invalid_json() {
        let err = OllamaProvider::collect_stream("not json\n").unwrap_err();
        assert!(matches!(err, CompleteError::InvalidResponse(_)));
    }

    #[test]
    fn build_request_body_sets_options() {
        let provider = OllamaProvider {
            model: "m".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            agent: default_agent(),
        };
        let request = CompletionRequest {
            system_prompt: "s".to_string(),
            user_prompt: "u".to_string(),
            temperature: 0.25,
            max_output_tokens: 60,
        };
        let body = provider.build_request_body(&request);
        assert_eq!(body["system"], "s");
        assert_eq!(body["prompt"], "u");
        assert_eq!(body["options"]["num_predict"], 60);
        assert_eq!(body["options"]["temperature"], 0.25);
    }
}
