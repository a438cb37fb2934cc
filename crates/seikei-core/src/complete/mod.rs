pub mod ollama;
pub mod openai;

use crate::CompleteError;
use crate::types::CompletionRequest;

const DEFAULT_OLLAMA_MODEL: &str = "qwen3:8b";

/// A language-model service that turns one prompt into text.
///
/// Calls may be slow and may fail; callers own the provider instance and
/// decide how to surface failures.
pub trait CompletionProvider: Send {
    fn name(&self) -> &'static str;
    fn model(&self) -> &str;
    fn complete(&mut self, request: &CompletionRequest) -> Result<String, CompleteError>;
}

/// Create a completion provider by name.
///
/// - `"openai"` requires an API key; `model` defaults to `gpt-3.5-turbo`.
/// - `"ollama"` talks to a local server; `model` defaults to `qwen3:8b`.
pub fn create_completion_provider(
    provider: &str,
    model: Option<&str>,
    api_key: Option<&str>,
) -> Result<Box<dyn CompletionProvider>, CompleteError> {
    match provider {
        "openai" => Ok(Box::new(openai::OpenAiProvider::new(model, api_key)?)),
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            model.unwrap_or(DEFAULT_OLLAMA_MODEL),
        )?)),
        other => Err(CompleteError::Failed(format!(
            "unknown completion provider: {other}"
        ))),
    }
}
