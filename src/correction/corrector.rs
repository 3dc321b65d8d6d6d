//! `SentenceCorrector` trait and the Gemini-backed implementation.
//!
//! `GeminiCorrector` calls the Gemini `generateContent` REST endpoint.
//! Connection details (`api_key`, `model`, `base_url`) come from
//! [`CorrectionConfig`]; nothing is hardcoded.

use crate::config::CorrectionConfig;
use crate::protocol::VerdictStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while obtaining a grammar verdict.
///
/// These never reach the relay hub; the correction worker folds them into
/// an `error` verdict for the requesting viewer.
#[derive(Debug, Error)]
pub enum CorrectionError {
    /// HTTP transport or connection error.
    #[error("correction request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("correction request timed out")]
    Timeout,

    /// The provider answered but the payload was not usable.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// No JSON object could be found in the provider's raw output.
    #[error("no JSON found in provider response")]
    NoJson,

    /// No API key configured for the provider.
    #[error("no API key configured")]
    MissingApiKey,
}

impl From<reqwest::Error> for CorrectionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CorrectionError::Timeout
        } else {
            CorrectionError::Request(e.to_string())
        }
    }
}

/// Grammar-check outcome for one sentence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionVerdict {
    pub status: VerdictStatus,

    /// Fixed version of the sentence when `status` is `bad`
    pub corrected: Option<String>,

    /// Diagnostic message when `status` is `error`
    pub error: Option<String>,
}

impl CorrectionVerdict {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Error,
            corrected: None,
            error: Some(message.into()),
        }
    }
}

/// Async boundary to the external grammar-check collaborator.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn SentenceCorrector>`. Calls have unbounded latency; the worker
/// dispatches each one as its own task so the hub is never blocked.
#[async_trait]
pub trait SentenceCorrector: Send + Sync {
    async fn correct(&self, sentence: &str) -> Result<CorrectionVerdict, CorrectionError>;
}

/// The two JSON shapes the provider is instructed to answer with
#[derive(Debug, Deserialize)]
struct ProviderVerdict {
    status: VerdictStatus,
    #[allow(dead_code)]
    original: Option<String>,
    corrected: Option<String>,
}

/// Calls the Gemini `generateContent` REST endpoint for grammar verdicts.
pub struct GeminiCorrector {
    client: reqwest::Client,
    config: CorrectionConfig,
}

impl GeminiCorrector {
    /// Build a corrector from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is the fallback if the
    /// builder fails.
    pub fn from_config(config: &CorrectionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn build_prompt(sentence: &str) -> String {
        format!(
            r#"You are an Multiple-Language grammar checker. Analyze the following sentence and determine if it needs correction.

Sentence: "{sentence}"

Rules:
1. If the sentence is grammatically correct and natural, respond with: {{"status": "good", "original": "{sentence}"}}
2. If the sentence has grammar errors or can be improved, respond with: {{"status": "bad", "original": "{sentence}", "corrected": "[corrected version]"}}

Respond ONLY with valid JSON, no additional text."#
        )
    }
}

#[async_trait]
impl SentenceCorrector for GeminiCorrector {
    async fn correct(&self, sentence: &str) -> Result<CorrectionVerdict, CorrectionError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CorrectionError::MissingApiKey)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": Self::build_prompt(sentence) } ] }
            ],
            "generationConfig": { "temperature": self.config.temperature }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CorrectionError::Parse(e.to_string()))?;

        let content = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| CorrectionError::Parse("no text in provider response".into()))?;

        parse_verdict(content)
    }
}

/// Extract and parse the first well-formed JSON object from raw model
/// output, which may be wrapped in prose or code fences.
pub(crate) fn parse_verdict(raw: &str) -> Result<CorrectionVerdict, CorrectionError> {
    let object = extract_json_object(raw).ok_or(CorrectionError::NoJson)?;

    let verdict: ProviderVerdict =
        serde_json::from_str(object).map_err(|e| CorrectionError::Parse(e.to_string()))?;

    Ok(CorrectionVerdict {
        status: verdict.status,
        corrected: verdict.corrected,
        error: None,
    })
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_good_verdict() {
        let verdict = parse_verdict(r#"{"status": "good", "original": "Hello."}"#).unwrap();
        assert_eq!(verdict.status, VerdictStatus::Good);
        assert!(verdict.corrected.is_none());
    }

    #[test]
    fn parses_bad_verdict_with_surrounding_prose() {
        let raw = r#"Sure! Here is the analysis:
{"status": "bad", "original": "He go to school.", "corrected": "He goes to school."}
Hope that helps."#;
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.status, VerdictStatus::Bad);
        assert_eq!(verdict.corrected.as_deref(), Some("He goes to school."));
    }

    #[test]
    fn rejects_output_without_json() {
        let err = parse_verdict("the sentence looks fine to me").unwrap_err();
        assert!(matches!(err, CorrectionError::NoJson));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_verdict(r#"{"status": "maybe"}"#).unwrap_err();
        assert!(matches!(err, CorrectionError::Parse(_)));
    }

    #[test]
    fn prompt_embeds_the_sentence() {
        let prompt = GeminiCorrector::build_prompt("He go to school.");
        assert!(prompt.contains("Sentence: \"He go to school.\""));
        assert!(prompt.contains("Respond ONLY with valid JSON"));
    }
}
