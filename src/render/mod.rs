// Page rendering
//
// - Renderer: translates eligible elements of a document in place
// - Watcher: feeds elements inserted after the first pass back to the renderer
// - Site: builds the index and recipe pages from a content model

pub mod site;
pub mod watcher;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use watcher::MutationWatcher;

use crate::content::UiStrings;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::lang::looks_like_language_code;
use crate::switcher::TranslationPipeline;
use crate::translate::TranslationStore;

pub const TRANSLATED_ATTR: &str = "data-translated";
pub const ORIGINAL_TEXT_ATTR: &str = "data-original-text";
pub const I18N_ATTR: &str = "data-i18n";

const TRANSLATABLE_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "li", "a", "button", "label",
];
const PLACEHOLDER_TAGS: &[&str] = &["input", "textarea"];
const EXCLUDED_TAGS: &[&str] = &["script", "style", "code", "pre"];
const EXCLUDED_CLASSES: &[&str] = &[
    "language-switcher",
    "language-menu",
    "lang-option",
    "language-toggle",
    "current-lang",
    "toggle-icon",
];
const EXCLUDED_IDS: &[&str] = &["language-toggle", "language-menu"];

/// Counter shared by everything rendering one page. Advancing it makes
/// translations started under an older value drop their results.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub struct Renderer {
    store: Arc<TranslationStore>,
    language: RwLock<String>,
    generation: Generation,
}

impl Renderer {
    pub fn new(store: Arc<TranslationStore>, language: &str) -> Self {
        Self {
            store,
            language: RwLock::new(language.to_string()),
            generation: Generation::default(),
        }
    }

    pub async fn language(&self) -> String {
        self.language.read().await.clone()
    }

    pub fn generation(&self) -> Generation {
        self.generation.clone()
    }

    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.store
    }

    fn uses_placeholder(doc: &Document, node: NodeId) -> bool {
        doc.tag(node).is_some_and(|tag| PLACEHOLDER_TAGS.contains(&tag))
    }

    fn is_excluded(doc: &Document, node: NodeId) -> bool {
        doc.tag(node).is_some_and(|tag| EXCLUDED_TAGS.contains(&tag))
            || EXCLUDED_CLASSES.iter().any(|class| doc.has_class(node, class))
            || doc.attr(node, "id").is_some_and(|id| EXCLUDED_IDS.contains(&id))
    }

    /// Text the element would be translated from: its placeholder for form
    /// fields, its text otherwise.
    fn source_text(doc: &Document, node: NodeId) -> Option<String> {
        if Self::uses_placeholder(doc, node) {
            doc.attr(node, "placeholder").map(str::to_string)
        } else {
            Some(doc.text_content(node))
        }
    }

    pub fn is_translatable(doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };

        let eligible_tag = TRANSLATABLE_TAGS.contains(&tag)
            || (PLACEHOLDER_TAGS.contains(&tag) && doc.has_attr(node, "placeholder"));
        if !eligible_tag || doc.has_attr(node, TRANSLATED_ATTR) {
            return false;
        }

        if doc.closest(node, Self::is_excluded).is_some() {
            return false;
        }

        // Mixed content is left to the descendants so markup survives
        if !Self::uses_placeholder(doc, node) && doc.has_element_children(node) {
            return false;
        }

        let Some(text) = Self::source_text(doc, node) else {
            return false;
        };
        let text = text.trim();
        !text.is_empty()
            && text.chars().any(char::is_alphanumeric)
            && !looks_like_language_code(text)
    }

    /// Translate a single element. Returns true when the element was rewritten.
    pub async fn render_one(&self, doc: &mut Document, node: NodeId) -> bool {
        if !Self::is_translatable(doc, node) {
            return false;
        }
        let Some(original) = Self::source_text(doc, node) else {
            return false;
        };

        let language = self.language().await;
        let generation = self.generation.current();
        let translated = self.store.resolve(original.trim(), &language).await;

        if self.generation.current() != generation {
            debug!("Dropping stale translation of {:?}", original);
            return false;
        }
        if translated == original.trim() {
            return false;
        }

        if Self::uses_placeholder(doc, node) {
            doc.set_attr(node, "placeholder", &translated);
        } else {
            doc.set_text_content(node, &translated);
        }
        doc.set_attr(node, TRANSLATED_ATTR, "true");
        doc.set_attr(node, ORIGINAL_TEXT_ATTR, &original);
        true
    }

    /// Translate every eligible element under `root`. Returns how many were rewritten.
    pub async fn render_all(&self, doc: &mut Document, root: NodeId) -> usize {
        let mut rewritten = 0;
        for node in doc.elements(root) {
            if self.render_one(doc, node).await {
                rewritten += 1;
            }
        }
        debug!("Rendered {} elements", rewritten);
        rewritten
    }

    /// Entry point for elements inserted after the first pass
    pub async fn on_node_added(&self, doc: &mut Document, node: NodeId) -> usize {
        self.render_all(doc, node).await
    }

    /// Restore original text and remove translation marks everywhere.
    /// Returns how many elements were reverted.
    pub fn clear_marks(doc: &mut Document) -> usize {
        let marked = doc.elements_with_attr(TRANSLATED_ATTR);
        for node in &marked {
            if let Some(original) = doc.remove_attr(*node, ORIGINAL_TEXT_ATTR) {
                if Self::uses_placeholder(doc, *node) {
                    doc.set_attr(*node, "placeholder", &original);
                } else {
                    doc.set_text_content(*node, &original);
                }
            }
            doc.remove_attr(*node, TRANSLATED_ATTR);
        }
        marked.len()
    }

    /// Switch language: invalidate in-flight work, swap the cache for the
    /// persisted map of `language`, revert every translated element, then
    /// translate the page again.
    pub async fn change_language(&self, doc: &mut Document, language: &str) -> usize {
        self.generation.advance();
        self.store.clear().await;
        if language != self.store.source_language() {
            if let Err(e) = self.store.warm_from_storage(language).await {
                warn!("Ignoring persisted translations for {}: {}", language, e);
            }
        }
        let reverted = Self::clear_marks(doc);
        *self.language.write().await = language.to_string();

        let root = doc.root();
        let rewritten = self.render_all(doc, root).await;
        info!(
            "Language changed to {}: reverted {} elements, translated {}",
            language, reverted, rewritten
        );
        rewritten
    }
}

#[async_trait]
impl TranslationPipeline for Renderer {
    async fn change_language(&self, doc: &mut Document, language: &str) -> Result<()> {
        Renderer::change_language(self, doc, language).await;
        Ok(())
    }
}

/// Fill elements carrying `data-i18n` keys from the content model's labels.
/// Returns how many elements were filled.
pub fn apply_labels(doc: &mut Document, ui: &UiStrings) -> usize {
    let mut filled = 0;
    for node in doc.elements_with_attr(I18N_ATTR) {
        let Some(key) = doc.attr(node, I18N_ATTR).map(str::to_string) else {
            continue;
        };
        let label = match key.as_str() {
            "my_recipe_journal" => ui.label("title"),
            other => ui.label(other),
        };
        let Some(label) = label.map(str::to_string) else {
            continue;
        };

        if Renderer::uses_placeholder(doc, node) {
            doc.set_attr(node, "placeholder", &label);
        } else {
            doc.set_text_content(node, &label);
        }
        filled += 1;
    }
    filled
}
