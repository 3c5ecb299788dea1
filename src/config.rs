use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, CookbookError};

fn default_source_language() -> String {
    "en".to_string()
}

fn default_alternatives() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory that contains the `data/` folder with content documents
    pub content_root: PathBuf,
    /// Base URL to fetch content from instead of the local content root
    #[serde(default)]
    pub content_url: Option<String>,
    /// Where rendered pages are written
    pub output_dir: PathBuf,
    /// Language the content documents are authored in
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Languages rendered by `build` when none are given on the command line
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Set to false to render with dictionaries only
    pub enabled: bool,
    /// LibreTranslate compatible endpoint, without the `/translate` suffix
    pub endpoint: String,
    /// API key sent with every request (empty for public instances)
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_alternatives")]
    pub alternatives: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the key-value store
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                content_root: PathBuf::from("."),
                content_url: None,
                output_dir: PathBuf::from("public"),
                source_language: default_source_language(),
                languages: vec![
                    "en".to_string(),
                    "fr".to_string(),
                    "es".to_string(),
                ],
            },
            gateway: GatewayConfig {
                enabled: true,
                endpoint: "https://libretranslate.com".to_string(),
                api_key: String::new(),
                alternatives: default_alternatives(),
            },
            storage: StorageConfig {
                path: PathBuf::from(".cookbook/storage.json"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CookbookError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| CookbookError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CookbookError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CookbookError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.gateway.enabled = false;
        config.site.languages = vec!["de".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(!loaded.gateway.enabled);
        assert_eq!(loaded.site.languages, vec!["de".to_string()]);
        assert_eq!(loaded.site.source_language, "en");
    }

    #[test]
    fn test_optional_fields_take_defaults() {
        let toml = r#"
            [site]
            content_root = "site"
            output_dir = "out"
            languages = ["fr"]

            [gateway]
            enabled = true
            endpoint = "http://localhost:5000"

            [storage]
            path = "store.json"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.source_language, "en");
        assert!(config.site.content_url.is_none());
        assert_eq!(config.gateway.alternatives, 1);
        assert!(config.gateway.api_key.is_empty());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/cookbook.toml").unwrap_err();
        assert!(matches!(err, CookbookError::Config(_)));
    }
}
