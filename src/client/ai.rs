//! AI-assisted link metadata.
//!
//! Two independent prompts per link: a one-line description and a category
//! pick from the user's categories. Both go out at once; a failure in one does
//! not discard the other.

use serde_json::{Value, json};
use thiserror::Error;

use crate::model::{AiConfig, AiProvider, Category};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("no API key configured for the AI provider")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider response had no text")]
    EmptyResponse,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiSuggestion {
    pub description: Option<String>,
    pub category_id: Option<String>,
}

pub struct AiAssistant {
    http: reqwest::Client,
    config: AiConfig,
}

impl AiAssistant {
    pub fn new(http: reqwest::Client, config: AiConfig) -> Self {
        Self { http, config }
    }

    /// Runs both prompts concurrently and keeps whatever succeeded.
    pub async fn assist(&self, title: &str, url: &str, categories: &[Category]) -> Result<AiSuggestion, AiError> {
        if self.config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }

        let (description, category) = tokio::join!(
            self.generate_description(title, url),
            self.suggest_category(title, url, categories),
        );

        let description = description
            .inspect_err(|e| tracing::warn!("description generation failed: {}", e))
            .ok();
        let category_id = category
            .inspect_err(|e| tracing::warn!("category suggestion failed: {}", e))
            .ok()
            .flatten();

        Ok(AiSuggestion {
            description,
            category_id,
        })
    }

    pub async fn generate_description(&self, title: &str, url: &str) -> Result<String, AiError> {
        let prompt = format!(
            "Write a concise one-sentence description (under 30 words) of the website \"{}\" at {}. \
             Reply with the description only.",
            title, url
        );
        let text = self.complete(&prompt).await?;
        Ok(text.trim().trim_matches('"').to_string())
    }

    /// The id of the best matching category, if the model picked one that exists.
    pub async fn suggest_category(
        &self,
        title: &str,
        url: &str,
        categories: &[Category],
    ) -> Result<Option<String>, AiError> {
        if categories.is_empty() {
            return Ok(None);
        }
        let listing = categories
            .iter()
            .map(|c| format!("- {}: {}", c.id, c.name))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Pick the best category for the website \"{}\" at {}.\nCategories (id: name):\n{}\n\
             Reply with the category id only.",
            title, url, listing
        );
        let text = self.complete(&prompt).await?;
        Ok(match_category(&text, categories))
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        if self.config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }
        match self.config.provider {
            AiProvider::Gemini => self.complete_gemini(prompt).await,
            AiProvider::Openai => self.complete_openai(prompt).await,
        }
    }

    fn base_url(&self, fallback: &str) -> String {
        let base = self.config.base_url.trim();
        let base = if base.is_empty() { fallback } else { base };
        base.trim_end_matches('/').to_string()
    }

    fn model(&self, fallback: &str) -> String {
        let model = self.config.model.trim();
        let model = if model.is_empty() { fallback } else { model };
        model.to_string()
    }

    async fn complete_gemini(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url(GEMINI_BASE_URL),
            self.model(crate::defaults::DEFAULT_AI_MODEL)
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let value = read_json(response).await?;
        extract_gemini_text(&value).ok_or(AiError::EmptyResponse)
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url(OPENAI_BASE_URL));
        let body = json!({
            "model": self.model(DEFAULT_OPENAI_MODEL),
            "messages": [{ "role": "user", "content": prompt }],
        });
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let value = read_json(response).await?;
        extract_openai_text(&value).ok_or(AiError::EmptyResponse)
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, AiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

fn extract_gemini_text(value: &Value) -> Option<String> {
    value
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn extract_openai_text(value: &Value) -> Option<String> {
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Matches a model reply against category ids, then names.
fn match_category(reply: &str, categories: &[Category]) -> Option<String> {
    let answer = reply
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
        .trim();
    categories
        .iter()
        .find(|c| c.id.eq_ignore_ascii_case(answer))
        .or_else(|| categories.iter().find(|c| c.name == answer))
        .map(|c| c.id.clone())
}
