// src/backend/adapter/gemini_adapter.rs
use crate::adapter::http_outcall::{send, OutcallRequest};
use crate::error::VaultError;
use crate::models::config::AppConfig;
use crate::services::ports::TextEnhancer;
use serde::Deserialize;
use serde_json::json;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Debug, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug, Default)]
struct Part {
    #[serde(default)]
    text: String,
}

pub struct GeminiEnhancer {
    api_key: String,
    model: String,
}

impl GeminiEnhancer {
    pub fn from_config(config: &AppConfig) -> Result<Self, VaultError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| VaultError::NotConfigured("AI service not configured".to_string()))?;
        Ok(Self {
            api_key,
            model: config.effective_model(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

/// Zero temperature keeps replica answers as close as the model allows.
pub fn generate_request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": { "temperature": 0 }
    })
}

fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl TextEnhancer for GeminiEnhancer {
    async fn generate(&self, prompt: &str) -> Result<String, VaultError> {
        let body = serde_json::to_vec(&generate_request_body(prompt))
            .map_err(|e| VaultError::SerializationError(format!("Failed to serialize Gemini request: {}", e)))?;
        let request = OutcallRequest::post(self.endpoint(), "application/json", body)
            .header("x-goog-api-key", self.api_key.clone())
            .keep_keys(&["candidates"]);

        let response = send(request).await?.ensure_success("Gemini")?;
        let parsed: GenerateContentResponse = response.json("Gemini")?;
        first_candidate_text(parsed)
            .ok_or_else(|| VaultError::HttpError("Gemini returned no candidates".to_string()))
    }
}
