use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::error::{CookbookError, Result};
use super::TranslationGateway;

/// `q` is either a single string or a batch of strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Query {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub q: Query,
    pub source: String,
    pub target: String,
    pub format: String,
    pub alternatives: u32,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: Option<Query>,
    pub error: Option<String>,
}

/// Client for a LibreTranslate compatible `/translate` endpoint.
///
/// One request per call, no retry. Every failure, including an `error`
/// field in an otherwise successful response, hands back the input.
pub struct LibreTranslateGateway {
    client: Client,
    config: GatewayConfig,
    source_language: String,
}

impl LibreTranslateGateway {
    pub fn new(config: GatewayConfig, source_language: &str) -> Self {
        Self {
            client: Client::new(),
            config,
            source_language: source_language.to_string(),
        }
    }

    async fn request(&self, q: Query, target_language: &str) -> Result<Query> {
        let request = TranslateRequest {
            q,
            source: self.source_language.clone(),
            target: target_language.to_string(),
            format: "text".to_string(),
            alternatives: self.config.alternatives,
            api_key: self.config.api_key.clone(),
        };

        let url = format!("{}/translate", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CookbookError::Gateway(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await
            .map_err(|e| CookbookError::Gateway(format!("Failed to read response: {}", e)))?;

        // LibreTranslate reports rate limiting with a non-2xx status and an
        // `error` body, so look at the body before the status.
        let parsed: TranslateResponse = serde_json::from_str(&body)
            .map_err(|e| CookbookError::Gateway(format!(
                "Malformed response ({}): {}", status, e
            )))?;

        if let Some(error) = parsed.error {
            if is_rate_limit(&error) {
                info!("Translation endpoint rate limited, keeping original text");
            }
            return Err(CookbookError::Gateway(error));
        }

        if !status.is_success() {
            return Err(CookbookError::Gateway(format!("Unexpected status {}", status)));
        }

        parsed.translated_text
            .ok_or_else(|| CookbookError::Gateway("Response has no translatedText".to_string()))
    }

    async fn try_translate(&self, text: &str, target_language: &str) -> Result<String> {
        match self.request(Query::One(text.to_string()), target_language).await? {
            Query::One(translated) if !translated.trim().is_empty() => Ok(translated),
            Query::One(_) => Err(CookbookError::Gateway("Empty translation received".to_string())),
            Query::Many(_) => Err(CookbookError::Gateway("Expected a single translation".to_string())),
        }
    }

    async fn try_translate_batch(&self, texts: &[String], target_language: &str) -> Result<Vec<String>> {
        match self.request(Query::Many(texts.to_vec()), target_language).await? {
            Query::Many(translated) if translated.len() == texts.len() => Ok(translated),
            Query::Many(translated) => Err(CookbookError::Gateway(format!(
                "Expected {} translations, got {}", texts.len(), translated.len()
            ))),
            Query::One(_) => Err(CookbookError::Gateway("Expected a list of translations".to_string())),
        }
    }
}

fn is_rate_limit(error: &str) -> bool {
    let lower = error.to_lowercase();
    lower.contains("rate") || lower.contains("slowdown") || lower.contains("too many")
}

#[async_trait]
impl TranslationGateway for LibreTranslateGateway {
    async fn translate(&self, text: &str, target_language: &str) -> String {
        match self.try_translate(text, target_language).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation to {} failed, using original text: {}", target_language, e);
                text.to_string()
            }
        }
    }

    async fn translate_batch(&self, texts: &[String], target_language: &str) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self.try_translate_batch(texts, target_language).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Batch translation of {} texts to {} failed: {}", texts.len(), target_language, e);
                texts.to_vec()
            }
        }
    }
}

/// Gateway that never leaves the process and always answers with its input
pub struct OfflineGateway;

#[async_trait]
impl TranslationGateway for OfflineGateway {
    async fn translate(&self, text: &str, _target_language: &str) -> String {
        text.to_string()
    }

    async fn translate_batch(&self, texts: &[String], _target_language: &str) -> Vec<String> {
        texts.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_single_and_batch_queries() {
        let single = TranslateRequest {
            q: Query::One("Soups".to_string()),
            source: "en".to_string(),
            target: "fr".to_string(),
            format: "text".to_string(),
            alternatives: 1,
            api_key: String::new(),
        };
        let value = serde_json::to_value(&single).unwrap();
        assert_eq!(value["q"], "Soups");
        assert_eq!(value["format"], "text");
        assert_eq!(value["api_key"], "");

        let batch = TranslateRequest { q: Query::Many(vec!["a".into(), "b".into()]), ..single };
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["q"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_response_shapes() {
        let ok: TranslateResponse = serde_json::from_str(r#"{"translatedText":"Soupes"}"#).unwrap();
        assert_eq!(ok.translated_text, Some(Query::One("Soupes".to_string())));

        let many: TranslateResponse = serde_json::from_str(r#"{"translatedText":["a","b"]}"#).unwrap();
        assert_eq!(many.translated_text, Some(Query::Many(vec!["a".into(), "b".into()])));

        let err: TranslateResponse = serde_json::from_str(r#"{"error":"Slowdown: 20 per 1 minute"}"#).unwrap();
        assert!(err.translated_text.is_none());
        assert!(is_rate_limit(err.error.as_deref().unwrap()));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_input() {
        let gateway = LibreTranslateGateway::new(
            GatewayConfig {
                enabled: true,
                endpoint: "http://127.0.0.1:9".to_string(),
                api_key: String::new(),
                alternatives: 1,
            },
            "en",
        );
        assert_eq!(gateway.translate("Banana Bread", "fr").await, "Banana Bread");
        let batch = vec!["a".to_string(), "b".to_string()];
        assert_eq!(gateway.translate_batch(&batch, "fr").await, batch);
    }

    #[tokio::test]
    async fn test_offline_gateway_echoes() {
        assert_eq!(OfflineGateway.translate("Soups", "de").await, "Soups");
    }
}
