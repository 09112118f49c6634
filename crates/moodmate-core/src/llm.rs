use std::future::Future;

use crate::config::{resolve_api_key, LlmConfig};
use crate::error::{GenerationError, MoodmateError, Result};

/// Outcome of one remote generation attempt.
pub type GenerationResult = std::result::Result<String, GenerationError>;

/// Anything that can turn a prompt into generated text.
///
/// Implementations make exactly one attempt per call; retries are not the
/// caller's expectation.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = GenerationResult> + Send;
}

/// LLM text generation over HTTP (Gemini, Ollama, OpenAI, Anthropic).
pub struct LlmService {
    provider: LlmProvider,
    config: LlmConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for LlmService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmService")
            .field("provider", &self.provider)
            .field("model", &self.config.model)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LlmProvider {
    Gemini,
    Ollama,
    OpenAI,
    Anthropic,
}

impl LlmProvider {
    fn label(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }
}

impl LlmService {
    /// Create an LLM service from configuration. Fails when the provider is
    /// unknown or its API key cannot be found.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let provider = match config.provider.as_str() {
            "gemini" => LlmProvider::Gemini,
            "ollama" => LlmProvider::Ollama,
            "openai" => LlmProvider::OpenAI,
            "anthropic" | "claude" => LlmProvider::Anthropic,
            other => {
                return Err(MoodmateError::Config(format!(
                    "unknown LLM provider: '{other}' (expected 'gemini', 'ollama', 'openai', or 'anthropic')"
                )));
            }
        };

        if config.model.trim().is_empty() {
            return Err(MoodmateError::Config("llm.model must not be empty".into()));
        }

        let api_key = match provider {
            LlmProvider::Gemini => Some(resolve_api_key(config, "GEMINI_API_KEY")?),
            LlmProvider::OpenAI => Some(resolve_api_key(config, "OPENAI_API_KEY")?),
            LlmProvider::Anthropic => Some(resolve_api_key(config, "ANTHROPIC_API_KEY")?),
            LlmProvider::Ollama => None,
        };

        tracing::debug!(provider = provider.label(), model = %config.model, "LLM service configured");

        Ok(Self {
            provider,
            config: config.clone(),
            api_key,
            client: reqwest::Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.label()
    }

    fn base_url(&self, default: &'static str) -> String {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    fn key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Send the request once and decode a JSON body, classifying failures.
    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<serde_json::Value, GenerationError> {
        let label = self.provider.label();

        let resp = request.send().await.map_err(|e| {
            GenerationError::Network(format!("{label} request failed: {}", e.without_url()))
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(status, text));
        }

        resp.json::<serde_json::Value>().await.map_err(|e| {
            GenerationError::Malformed(format!("{label} response parse error: {}", e.without_url()))
        })
    }

    /// Gemini: POST {base_url}/v1beta/models/{model}:generateContent
    async fn generate_gemini(&self, prompt: &str) -> GenerationResult {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url("https://generativelanguage.googleapis.com"),
            self.config.model,
        );

        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
            }
        });

        let json = self
            .send_json(
                self.client
                    .post(&url)
                    .header("x-goog-api-key", self.key())
                    .json(&body),
            )
            .await?;

        extract_text(&json["candidates"][0]["content"]["parts"][0]["text"], "Gemini")
    }

    /// Ollama: POST {base_url}/api/generate
    async fn generate_ollama(&self, prompt: &str) -> GenerationResult {
        let url = format!("{}/api/generate", self.base_url("http://localhost:11434"));

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "num_predict": self.config.max_tokens,
            }
        });

        let json = self.send_json(self.client.post(&url).json(&body)).await?;
        extract_text(&json["response"], "Ollama")
    }

    /// OpenAI: POST {base_url}/v1/chat/completions
    async fn generate_openai(&self, prompt: &str) -> GenerationResult {
        let url = format!("{}/v1/chat/completions", self.base_url("https://api.openai.com"));

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.config.max_tokens,
        });

        let json = self
            .send_json(
                self.client
                    .post(&url)
                    .header("Authorization", format!("Bearer {}", self.key()))
                    .json(&body),
            )
            .await?;

        extract_text(&json["choices"][0]["message"]["content"], "OpenAI")
    }

    /// Anthropic: POST {base_url}/v1/messages
    async fn generate_anthropic(&self, prompt: &str) -> GenerationResult {
        let url = format!("{}/v1/messages", self.base_url("https://api.anthropic.com"));

        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let json = self
            .send_json(
                self.client
                    .post(&url)
                    .header("x-api-key", self.key())
                    .header("anthropic-version", "2023-06-01")
                    .json(&body),
            )
            .await?;

        // {"content": [{"type": "text", "text": "..."}]}
        extract_text(&json["content"][0]["text"], "Anthropic")
    }
}

impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str) -> GenerationResult {
        match self.provider {
            LlmProvider::Gemini => self.generate_gemini(prompt).await,
            LlmProvider::Ollama => self.generate_ollama(prompt).await,
            LlmProvider::OpenAI => self.generate_openai(prompt).await,
            LlmProvider::Anthropic => self.generate_anthropic(prompt).await,
        }
    }
}

fn extract_text(value: &serde_json::Value, label: &str) -> GenerationResult {
    match value.as_str() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(GenerationError::Malformed(format!(
            "{label} response contained empty text"
        ))),
        None => Err(GenerationError::Malformed(format!(
            "{label} response missing text content"
        ))),
    }
}
