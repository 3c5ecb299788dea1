use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::content::RecipeRecord;
use crate::error::Result;
use crate::storage::{translation_cache_key, KeyValueStore};
use super::{Dictionary, TranslationGateway};

type CacheKey = (String, String);

/// Resolves text into a target language through cache, dictionary and gateway.
///
/// `resolve` never fails. The cache is shared by every caller and only
/// shrinks through [`TranslationStore::clear`].
pub struct TranslationStore {
    source_language: String,
    dictionary: Dictionary,
    gateway: Arc<dyn TranslationGateway>,
    storage: Option<Arc<dyn KeyValueStore>>,
    cache: RwLock<HashMap<CacheKey, String>>,
}

impl TranslationStore {
    pub fn new(
        source_language: &str,
        dictionary: Dictionary,
        gateway: Arc<dyn TranslationGateway>,
    ) -> Self {
        Self {
            source_language: source_language.to_string(),
            dictionary,
            gateway,
            storage: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Attach the key-value store used for persisted per-language caches
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub async fn resolve(&self, text: &str, target_language: &str) -> String {
        if target_language == self.source_language {
            return text.to_string();
        }

        let key = (text.to_string(), target_language.to_string());
        if let Some(hit) = self.cache.read().await.get(&key) {
            return hit.clone();
        }

        if let Some(entry) = self.dictionary.lookup(text, target_language) {
            let entry = entry.to_string();
            self.cache.write().await.insert(key, entry.clone());
            return entry;
        }

        let translated = self.gateway.translate(text, target_language).await;
        debug!("Gateway resolved {:?} -> {:?} ({})", text, translated, target_language);
        self.cache.write().await.insert(key, translated.clone());
        translated
    }

    /// Resolve many texts, sending every cache and dictionary miss to the
    /// gateway in a single batch.
    ///
    /// A gateway answer identical to the misses it was sent is a failed
    /// batch: the misses come back unchanged and nothing is cached for them.
    pub async fn resolve_batch(&self, texts: &[String], target_language: &str) -> Vec<String> {
        if target_language == self.source_language {
            return texts.to_vec();
        }

        let mut resolved: Vec<Option<String>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<String> = Vec::new();
        {
            let mut cache = self.cache.write().await;
            for text in texts {
                let key = (text.clone(), target_language.to_string());
                if let Some(hit) = cache.get(&key) {
                    resolved.push(Some(hit.clone()));
                } else if let Some(entry) = self.dictionary.lookup(text, target_language) {
                    cache.insert(key, entry.to_string());
                    resolved.push(Some(entry.to_string()));
                } else {
                    if !misses.contains(text) {
                        misses.push(text.clone());
                    }
                    resolved.push(None);
                }
            }
        }

        let mut fetched: HashMap<&str, String> = HashMap::new();
        if !misses.is_empty() {
            let translated = self.gateway.translate_batch(&misses, target_language).await;
            if translated == misses || translated.len() != misses.len() {
                warn!(
                    "Batch translation to {} returned its input, keeping {} original texts",
                    target_language,
                    misses.len()
                );
            } else {
                let mut cache = self.cache.write().await;
                for (source, target) in misses.iter().zip(translated) {
                    cache.insert((source.clone(), target_language.to_string()), target.clone());
                    fetched.insert(source.as_str(), target);
                }
            }
        }

        texts
            .iter()
            .zip(resolved)
            .map(|(text, hit)| {
                hit.or_else(|| fetched.get(text.as_str()).cloned())
                    .unwrap_or_else(|| text.clone())
            })
            .collect()
    }

    /// Drop every cached entry for every language
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let count = cache.len();
        cache.clear();
        debug!("Cleared {} cached translations", count);
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    pub async fn cached(&self, text: &str, target_language: &str) -> Option<String> {
        self.cache
            .read()
            .await
            .get(&(text.to_string(), target_language.to_string()))
            .cloned()
    }

    /// Load the persisted map for `target_language` into the cache.
    /// Returns how many entries were loaded.
    pub async fn warm_from_storage(&self, target_language: &str) -> Result<usize> {
        let Some(storage) = &self.storage else {
            return Ok(0);
        };
        let Some(raw) = storage.get(&translation_cache_key(target_language))? else {
            return Ok(0);
        };

        let entries: HashMap<String, String> = serde_json::from_str(&raw)?;
        let count = entries.len();
        let mut cache = self.cache.write().await;
        for (source, translated) in entries {
            cache.insert((source, target_language.to_string()), translated);
        }
        debug!("Warmed {} cached translations for {}", count, target_language);
        Ok(count)
    }

    /// Merge the real translations cached for `target_language` into the
    /// persisted map. Entries that fell back to their source text are left
    /// out so a later run asks the gateway again. Returns the size of the
    /// stored map.
    pub async fn persist(&self, target_language: &str) -> Result<usize> {
        let Some(storage) = &self.storage else {
            return Ok(0);
        };

        let key = translation_cache_key(target_language);
        let mut entries: HashMap<String, String> = match storage.get(&key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Replacing unreadable persisted translations for {}: {}", target_language, e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        let before = entries.len();
        for ((source, language), translated) in self.cache.read().await.iter() {
            if language == target_language && source != translated {
                entries.insert(source.clone(), translated.clone());
            }
        }

        storage.set(&key, &serde_json::to_string(&entries)?)?;
        info!(
            "Persisted {} translations for {} ({} new)",
            entries.len(),
            target_language,
            entries.len() - before
        );
        Ok(entries.len())
    }

    /// Bulk-translate `texts`, reading the persisted map first and writing it
    /// back when anything new had to be fetched.
    pub async fn prefetch(&self, texts: &[String], target_language: &str) -> Vec<String> {
        if target_language == self.source_language {
            return texts.to_vec();
        }

        let warmed = match self.warm_from_storage(target_language).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Ignoring persisted translations for {}: {}", target_language, e);
                0
            }
        };

        let before = self.len().await;
        let resolved = self.resolve_batch(texts, target_language).await;

        if warmed == 0 || self.len().await > before {
            if let Err(e) = self.persist(target_language).await {
                warn!("Failed to persist translations for {}: {}", target_language, e);
            }
        }
        resolved
    }

    /// Translate the human-readable fields of a recipe
    pub async fn translate_recipe(&self, recipe: &RecipeRecord, target_language: &str) -> RecipeRecord {
        let mut translated = recipe.clone();
        if target_language == self.source_language {
            return translated;
        }

        translated.title = self.resolve(&recipe.title, target_language).await;
        if !recipe.description.is_empty() {
            translated.description = self.resolve(&recipe.description, target_language).await;
        }
        for (slot, ingredient) in translated.ingredients.iter_mut().zip(&recipe.ingredients) {
            *slot = self.resolve(ingredient, target_language).await;
        }
        for (slot, step) in translated.instructions.iter_mut().zip(&recipe.instructions) {
            *slot = self.resolve(step, target_language).await;
        }
        translated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::translate::{MockTranslationGateway, OfflineGateway};

    fn store_with(gateway: MockTranslationGateway) -> TranslationStore {
        TranslationStore::new("en", Dictionary::embedded(), Arc::new(gateway))
    }

    #[tokio::test]
    async fn test_source_language_is_returned_unchanged() {
        let mut gateway = MockTranslationGateway::new();
        gateway.expect_translate().never();

        let store = store_with(gateway);
        assert_eq!(store.resolve("Banana Bread", "en").await, "Banana Bread");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_dictionary_hit_is_cached_and_stable() {
        let mut gateway = MockTranslationGateway::new();
        gateway.expect_translate().never();

        let store = store_with(gateway);
        assert_eq!(store.resolve("Banana Bread", "fr").await, "Pain aux Bananes");
        assert_eq!(store.resolve("Banana Bread", "fr").await, "Pain aux Bananes");
        assert_eq!(store.cached("Banana Bread", "fr").await.as_deref(), Some("Pain aux Bananes"));
    }

    #[tokio::test]
    async fn test_gateway_called_once_per_key() {
        let mut gateway = MockTranslationGateway::new();
        gateway
            .expect_translate()
            .times(1)
            .returning(|_, _| "Gâteau".to_string());

        let store = store_with(gateway);
        assert_eq!(store.resolve("Cake", "fr").await, "Gâteau");
        assert_eq!(store.resolve("Cake", "fr").await, "Gâteau");
    }

    #[tokio::test]
    async fn test_gateway_failure_degrades_to_original_and_is_cached() {
        let mut gateway = MockTranslationGateway::new();
        gateway
            .expect_translate()
            .times(1)
            .returning(|text, _| text.to_string());

        let store = store_with(gateway);
        assert_eq!(store.resolve("Cake", "ja").await, "Cake");
        assert_eq!(store.resolve("Cake", "ja").await, "Cake");
    }

    #[tokio::test]
    async fn test_clear_empties_every_language() {
        let store = TranslationStore::new("en", Dictionary::embedded(), Arc::new(OfflineGateway));
        store.resolve("Soups", "fr").await;
        store.resolve("Soups", "es").await;
        assert_eq!(store.len().await, 2);

        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_batch_sends_only_misses() {
        let mut gateway = MockTranslationGateway::new();
        gateway
            .expect_translate_batch()
            .times(1)
            .returning(|texts, _| {
                assert_eq!(texts, ["Cake".to_string(), "Pie".to_string()]);
                vec!["Gâteau".to_string(), "Tarte".to_string()]
            });

        let store = store_with(gateway);
        let texts = vec![
            "Soups".to_string(),
            "Cake".to_string(),
            "Pie".to_string(),
            "Cake".to_string(),
        ];
        assert_eq!(
            store.resolve_batch(&texts, "fr").await,
            vec!["Soupes", "Gâteau", "Tarte", "Gâteau"]
        );
        assert_eq!(store.cached("Pie", "fr").await.as_deref(), Some("Tarte"));
    }

    #[tokio::test]
    async fn test_echoed_batch_is_not_cached() {
        let mut gateway = MockTranslationGateway::new();
        gateway
            .expect_translate_batch()
            .returning(|texts, _| texts.to_vec());

        let store = store_with(gateway);
        let texts = vec!["Cake".to_string(), "Pie".to_string()];
        assert_eq!(store.resolve_batch(&texts, "fr").await, texts);
        assert!(store.cached("Cake", "fr").await.is_none());
    }

    #[tokio::test]
    async fn test_prefetch_persists_then_reuses_storage() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut gateway = MockTranslationGateway::new();
        gateway
            .expect_translate_batch()
            .times(1)
            .returning(|_, _| vec!["Gâteau".to_string()]);
        let first = store_with(gateway).with_storage(storage.clone());
        let texts = vec!["Cake".to_string()];
        assert_eq!(first.prefetch(&texts, "fr").await, vec!["Gâteau"]);
        assert!(storage.get("translations_fr").unwrap().unwrap().contains("Gâteau"));

        let mut gateway = MockTranslationGateway::new();
        gateway.expect_translate_batch().never();
        let second = store_with(gateway).with_storage(storage);
        assert_eq!(second.prefetch(&texts, "fr").await, vec!["Gâteau"]);
    }

    #[tokio::test]
    async fn test_persist_merges_into_stored_map() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        storage.set("translations_fr", r#"{"Moist": "Moelleux"}"#).unwrap();

        let store = TranslationStore::new("en", Dictionary::embedded(), Arc::new(OfflineGateway))
            .with_storage(storage.clone());
        store.resolve("Soups", "fr").await;
        store.resolve("Cake", "fr").await;
        assert_eq!(store.persist("fr").await.unwrap(), 2);

        let stored: HashMap<String, String> =
            serde_json::from_str(&storage.get("translations_fr").unwrap().unwrap()).unwrap();
        assert_eq!(stored.get("Moist").map(String::as_str), Some("Moelleux"));
        assert_eq!(stored.get("Soups").map(String::as_str), Some("Soupes"));
        assert!(!stored.contains_key("Cake"));
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_entry() {
        let mut gateway = MockTranslationGateway::new();
        gateway
            .expect_translate()
            .returning(|_, _| "Gâteau".to_string());
        let store = Arc::new(store_with(gateway));

        let (first, second, third) = tokio::join!(
            store.resolve("Cake", "fr"),
            store.resolve("Cake", "fr"),
            store.resolve("Cake", "fr"),
        );

        assert_eq!(first, "Gâteau");
        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.cached("Cake", "fr").await.as_deref(), Some("Gâteau"));
    }

    #[tokio::test]
    async fn test_concurrent_resolves_across_tasks() {
        let mut gateway = MockTranslationGateway::new();
        gateway
            .expect_translate()
            .returning(|_, _| "Gâteau".to_string());
        let store = Arc::new(store_with(gateway));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.resolve("Cake", "fr").await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), "Gâteau");
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_translate_recipe_fields() {
        let store = TranslationStore::new("en", Dictionary::embedded(), Arc::new(OfflineGateway));
        let recipe = RecipeRecord {
            id: "banana_bread".to_string(),
            title: "Banana Bread".to_string(),
            description: "Moist".to_string(),
            ingredients: vec!["Bananas".to_string()],
            ..Default::default()
        };

        let translated = store.translate_recipe(&recipe, "es").await;
        assert_eq!(translated.id, "banana_bread");
        assert_eq!(translated.title, "Pan de Plátano");
        assert_eq!(translated.description, "Moist");
        assert_eq!(translated.ingredients, vec!["Bananas"]);
    }
}
