use serde_json::Value;
use tracing::{info, warn};

use super::TranslationStore;

/// Keys whose values are identifiers or paths rather than prose
const NON_TEXT_KEYS: &[&str] = &["id", "file", "image", "tags", "href"];

/// One step into a JSON document: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Flatten every translatable string in `value` into `(path, text)` pairs,
/// in document order.
pub fn flatten_strings(value: &Value) -> Vec<(Vec<PathSegment>, String)> {
    let mut flat = Vec::new();
    collect(value, &mut Vec::new(), &mut flat);
    flat
}

fn collect(value: &Value, path: &mut Vec<PathSegment>, flat: &mut Vec<(Vec<PathSegment>, String)>) {
    match value {
        Value::String(text) if !text.trim().is_empty() => flat.push((path.clone(), text.clone())),
        Value::Object(map) => {
            for (key, child) in map {
                if NON_TEXT_KEYS.contains(&key.as_str()) {
                    continue;
                }
                path.push(PathSegment::Key(key.clone()));
                collect(child, path, flat);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                collect(child, path, flat);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Write `text` at a path produced by [`flatten_strings`]
fn set_path(value: &mut Value, path: &[PathSegment], text: String) {
    let mut current = value;
    for segment in path {
        let next = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
            (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return,
        }
    }
    *current = Value::String(text);
}

/// Translate a whole content document in one batch.
///
/// Structure, identifiers and paths are kept; only prose changes. If the
/// batch fails (the gateway echoes its input) the original document comes
/// back untouched.
pub async fn translate_content(store: &TranslationStore, content: &Value, target_language: &str) -> Value {
    if target_language == store.source_language() {
        return content.clone();
    }

    let flat = flatten_strings(content);
    if flat.is_empty() {
        return content.clone();
    }

    let texts: Vec<String> = flat.iter().map(|(_, text)| text.clone()).collect();
    let translated = store.resolve_batch(&texts, target_language).await;

    if translated == texts {
        warn!("Content translation to {} changed nothing, using original content", target_language);
        return content.clone();
    }

    let mut result = content.clone();
    for ((path, _), text) in flat.iter().zip(translated) {
        set_path(&mut result, path, text);
    }
    info!("Translated {} content strings to {}", flat.len(), target_language);
    result
}
