//! Thin client for an external LibreTranslate-compatible service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the translation pass-through.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// No `TRANSLATE_API_URL` was configured.
    #[error("translation service is not configured")]
    NotConfigured,

    /// The upstream request failed or returned an unexpected body.
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Forwards text to the configured translation endpoint.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl TranslationClient {
    /// Creates a client; `endpoint` of `None` disables translation.
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Translates `text` into `target_language` via the remote service.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NotConfigured`] when no endpoint is set,
    /// or [`TranslationError::Request`] on transport and decode failures.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(TranslationError::NotConfigured)?;

        let body = TranslateRequest {
            q: text,
            target: target_language,
            format: "text",
        };
        let response: TranslateResponse = self
            .http
            .post(endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.translated_text)
    }
}
