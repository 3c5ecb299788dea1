// Translation pipeline
//
// Text resolves through a fixed fallback chain:
// - Store: in-memory cache keyed by (text, language)
// - Dictionary: static per-language tables, optionally overridden from disk
// - Gateway: remote LibreTranslate compatible endpoint
// - Original text when every step above comes back empty handed
//
// The content module reuses the same store to translate a whole content
// document in one batch.

pub mod content;
pub mod dictionary;
pub mod gateway;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;

pub use content::{flatten_strings, translate_content, PathSegment};
pub use dictionary::Dictionary;
pub use gateway::{LibreTranslateGateway, OfflineGateway};
pub use store::TranslationStore;

use crate::config::GatewayConfig;

/// Boundary to the remote translation service.
///
/// Implementations never fail: any error degrades to returning the input.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    /// Translate one string
    async fn translate(&self, text: &str, target_language: &str) -> String;

    /// Translate many strings in one round trip. The result is parallel to
    /// `texts`; a result identical to the input means the batch failed.
    async fn translate_batch(&self, texts: &[String], target_language: &str) -> Vec<String>;
}

/// Factory for creating gateway instances
pub struct GatewayFactory;

impl GatewayFactory {
    /// Live gateway when enabled, otherwise the offline echo
    pub fn create(config: &GatewayConfig, source_language: &str) -> Arc<dyn TranslationGateway> {
        if config.enabled {
            Arc::new(LibreTranslateGateway::new(config.clone(), source_language))
        } else {
            Arc::new(OfflineGateway)
        }
    }

    pub fn offline() -> Arc<dyn TranslationGateway> {
        Arc::new(OfflineGateway)
    }
}
