//! HTTP client for the Gemini generateContent API.

use super::{Oracle, OracleError};
use crate::models::OracleConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Reasoning-oracle client backed by the Gemini REST API.
///
/// Requests ask for temperature 0.0 and a JSON response mime type so the
/// validators can parse the reply as an issue array. A single transport-level
/// retry is applied here; it is independent of the pipeline's semantic retry
/// loop.
pub struct GeminiOracle {
    client: reqwest::Client,
    model: String,
    api_base: String,
    api_key: String,
    temperature: f32,
}

impl GeminiOracle {
    /// Build a client from config, reading the API key from the configured
    /// environment variable.
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("oracle API key not set in ${}", config.api_key_env))?;

        Ok(Self {
            client: reqwest::Client::new(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            temperature: config.temperature,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json"
            }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OracleError::Transport(format!(
                "HTTP {} from oracle endpoint",
                response.status()
            )));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        let text = extract_text(&value);
        if text.is_empty() {
            return Err(OracleError::Malformed(
                "response contained no text parts".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(value: &serde_json::Value) -> String {
    let mut text = String::new();
    if let Some(parts) = value
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        for part in parts {
            if let Some(part_text) = part.get("text").and_then(|t| t.as_str()) {
                text.push_str(part_text);
            }
        }
    }
    text
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn evaluate(&self, prompt: &str) -> Result<String, OracleError> {
        match self.generate(prompt).await {
            Ok(text) => Ok(text),
            // retry transport failures once; malformed responses are final
            Err(OracleError::Transport(_)) => self.generate(prompt).await,
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let value = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "[{\"severity\""}, {"text": ": \"MINOR\"}]"}]}
            }]
        });
        assert_eq!(extract_text(&value), "[{\"severity\": \"MINOR\"}]");
    }

    #[test]
    fn test_extract_text_empty_on_unexpected_shape() {
        let value = serde_json::json!({"error": {"message": "quota"}});
        assert_eq!(extract_text(&value), "");
    }
}
