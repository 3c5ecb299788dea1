use thiserror::Error;

#[derive(Error, Debug)]
pub enum CookbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content load failure: {0}")]
    ResourceLoad(String),

    #[error("Translation gateway failure: {0}")]
    Gateway(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

pub type Result<T> = std::result::Result<T, CookbookError>;
