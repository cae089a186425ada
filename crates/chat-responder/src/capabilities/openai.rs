//! OpenAI text generator
//!
//! Blocking client for the chat completions endpoint. The core treats
//! generation as a slow synchronous call; timeouts surface as `CallFailed`.

use super::TextGenerator;
use crate::config::GenerationParams;
use crate::error::CapabilityError;
use crate::types::Capability;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default OpenAI model
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "Tu es un assistant de FAQ. Continue la conversation par une \
                             réponse courte et polie, en une ou deux phrases.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Generation backend calling the OpenAI API
pub struct OpenAiGenerator {
    api_key: String,
    client: reqwest::blocking::Client,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String) -> Result<Self> {
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::with_model(api_key, &model)
    }

    pub fn with_model(api_key: String, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            api_key,
            client,
            model: model.to_string(),
        })
    }

    /// Create from `OPENAI_API_KEY` (and optional `OPENAI_MODEL`)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    fn call_api(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<String>> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_length,
            "n": params.num_variants,
        });

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("OpenAI API error {}: {}", status, body));
        }

        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let api_response: ApiResponse = response.json()?;
        debug!("OpenAI returned {} choices", api_response.choices.len());
        Ok(api_response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect())
    }
}

impl TextGenerator for OpenAiGenerator {
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<String>, CapabilityError> {
        self.call_api(prompt, params)
            .map_err(|e| CapabilityError::call_failed(Capability::Generate, e.to_string()))
    }
}
