use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::services::memory::{Role, Turn};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to model service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("model service returned no completion text")]
    EmptyCompletion,
}

/// External chat-completion capability.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Submit a system instruction plus ordered turns; returns the generated
    /// text verbatim.
    async fn complete(&self, system: &str, turns: &[Turn]) -> Result<String, ProviderError>;
}

/// Gemini `generateContent` client.
///
/// Holds one reqwest client for the process lifetime; timeout and retry
/// budget come from [`Config`] and live entirely inside this type.
pub struct GeminiChat {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    max_retries: u32,
}

impl GeminiChat {
    pub fn new(cfg: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.gemini_base_url.trim_end_matches('/').to_string(),
            model: cfg.gemini_model.clone(),
            api_key: cfg.gemini_api_key.clone(),
            temperature: cfg.temperature,
            max_output_tokens: cfg.max_output_tokens,
            max_retries: cfg.max_retries,
        })
    }

    fn request_body(&self, system: &str, turns: &[Turn]) -> GenerateContentRequest {
        let contents = turns
            .iter()
            .map(|t| Content {
                role: match t.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                }
                .to_string(),
                parts: vec![Part {
                    text: t.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn send_once(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        self.http.post(url).json(body).send().await
    }
}

#[async_trait]
impl ChatProvider for GeminiChat {
    async fn complete(&self, system: &str, turns: &[Turn]) -> Result<String, ProviderError> {
        let body = self.request_body(system, turns);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.send_once(&body).await;

            // Transport failures and 429/5xx are worth another attempt.
            let retryable = match &result {
                Ok(res) => res.status().is_server_error() || res.status().as_u16() == 429,
                Err(_) => true,
            };
            if retryable && attempt <= self.max_retries {
                tracing::warn!("model call attempt {attempt} failed, retrying");
                continue;
            }

            let res = result?;
            let status = res.status();
            if !status.is_success() {
                let message = res
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                    .unwrap_or_else(|| status.to_string());
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse = res.json().await?;
            return parsed.text().ok_or(ProviderError::EmptyCompletion);
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().map(|p| p.text.as_str()).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
