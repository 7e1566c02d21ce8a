//! Gemini `generateContent` client.

use super::{Completion, GenerationError, Generator};
use crate::config::GeneratorConfig;
use crate::error::{Result, TbgenError};
use crate::prompt::Prompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest service error body carried into an error message.
const MAX_ERROR_BODY: usize = 500;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking client for the Gemini API.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    timeout_seconds: Option<u64>,
}

impl GeminiClient {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        // The blocking client defaults to a 30s timeout; only bound calls when configured.
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout_seconds.map(Duration::from_secs))
            .build()
            .map_err(|e| {
                TbgenError::UserError(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// The key is read per call so a missing key fails every unit, not the run.
    fn api_key(&self) -> std::result::Result<String, GenerationError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(GenerationError::Auth(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }
}

impl Generator for GeminiClient {
    fn generate(&mut self, prompt: &Prompt) -> std::result::Result<Completion, GenerationError> {
        let key = self.api_key()?;
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt.text }],
            }],
        };

        tracing::debug!(
            unit = %prompt.unit,
            model = %self.model,
            prompt_chars = prompt.text.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&request)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(GenerationError::Service {
                status: status.as_u16(),
                message: service_message(&body),
            });
        }

        parse_response(&body)
    }
}

impl GeminiClient {
    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout()
            && let Some(secs) = self.timeout_seconds
        {
            return GenerationError::Timeout(secs);
        }
        GenerationError::Transport(e.to_string())
    }
}

/// Extract the first candidate's text from a response body.
fn parse_response(body: &str) -> std::result::Result<Completion, GenerationError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        tracing::warn!(reason = %reason, "prompt was blocked");
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(Completion::Empty);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        tracing::debug!(finish_reason = ?candidate.finish_reason, "candidate has no text");
    }
    Ok(Completion::from_text(text))
}

fn service_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
