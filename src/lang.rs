use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CookbookError, Result};

/// Key under which the chosen language is persisted
pub const LANGUAGE_PREFERENCE_KEY: &str = "cookbook-language";

/// Supported languages and the name shown for each in its own language
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("fr", "Français"),
    ("es", "Español"),
    ("de", "Deutsch"),
    ("it", "Italiano"),
    ("pt", "Português"),
    ("nl", "Nederlands"),
    ("ru", "Русский"),
    ("zh", "中文"),
    ("ja", "日本語"),
    ("ko", "한국어"),
];

static LANGUAGE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,3}$").expect("static regex"));

pub fn native_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

pub fn is_supported(code: &str) -> bool {
    native_name(code).is_some()
}

/// Normalise a language code and reject anything outside the supported table
pub fn validate(code: &str) -> Result<String> {
    let code = code.trim().to_lowercase();
    if is_supported(&code) {
        Ok(code)
    } else {
        Err(CookbookError::UnsupportedLanguage(code))
    }
}

/// Parse a comma-separated list such as `"fr, es"`
pub fn parse_language_list(list: &str) -> Result<Vec<String>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(validate)
        .collect()
}

/// True for text that is nothing but a bare 2-3 letter code like `fr` or `ENG`
pub fn looks_like_language_code(text: &str) -> bool {
    LANGUAGE_CODE.is_match(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_names() {
        assert_eq!(native_name("fr"), Some("Français"));
        assert_eq!(native_name("JA"), Some("日本語"));
        assert_eq!(native_name("xx"), None);
    }

    #[test]
    fn test_parse_language_list() {
        assert_eq!(
            parse_language_list(" fr, ES ,,de").unwrap(),
            vec!["fr".to_string(), "es".to_string(), "de".to_string()]
        );
        assert!(matches!(
            parse_language_list("fr,klingon"),
            Err(CookbookError::UnsupportedLanguage(code)) if code == "klingon"
        ));
    }

    #[test]
    fn test_language_code_shape() {
        assert!(looks_like_language_code("en"));
        assert!(looks_like_language_code(" deu "));
        assert!(!looks_like_language_code("Soup"));
        assert!(!looks_like_language_code("e"));
        assert!(!looks_like_language_code("n2"));
    }
}
