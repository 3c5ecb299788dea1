use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::content::{ContentLoader, ContentModel, ContentSourceFactory, RecipeRecord};
use crate::dom::Document;
use crate::error::Result;
use crate::filter::{apply_visibility, compute_visibility, sync_buttons, FilterState};
use crate::lang::{self, LANGUAGE_PREFERENCE_KEY, SUPPORTED_LANGUAGES};
use crate::render::site::{append_recipe_sections, build_index, build_recipe_page, set_head_title};
use crate::render::{apply_labels, MutationWatcher, Renderer};
use crate::storage::{translation_cache_key, FileStore, KeyValueStore, TRANSLATION_CACHE_PREFIX};
use crate::switcher::{CommitOutcome, LanguageSwitcher, SwitchEvent};
use crate::translate::{translate_content, Dictionary, GatewayFactory, TranslationGateway, TranslationStore};

/// Outcome of building one language
#[derive(Debug, Clone, Serialize)]
pub struct LanguageBuild {
    pub language: String,
    /// True when a document authored in this language was found
    pub pretranslated: bool,
    pub recipes: usize,
    pub translated_elements: usize,
    pub index: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub built_at: DateTime<Utc>,
    pub languages: Vec<LanguageBuild>,
}

/// A supported language and whether a content document exists for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStatus {
    pub code: String,
    pub name: String,
    pub has_document: bool,
}

/// A persisted per-language translation cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub language: String,
    pub entries: usize,
}

struct RenderedPage {
    document: Document,
    renderer: Renderer,
    switcher: LanguageSwitcher,
    translated: usize,
}

/// Wires the translation store, content loader and page pipeline together
pub struct Cookbook {
    config: Config,
    storage: Arc<dyn KeyValueStore>,
    store: Arc<TranslationStore>,
    loader: ContentLoader,
}

impl Cookbook {
    pub fn new(
        config: Config,
        storage: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn TranslationGateway>,
    ) -> Self {
        let source_language = config.site.source_language.clone();
        let dictionary = Dictionary::load_or_embedded(&config.site.content_root);
        let store = TranslationStore::new(&source_language, dictionary, gateway)
            .with_storage(storage.clone());
        let loader = ContentLoader::new(ContentSourceFactory::create(&config.site), &source_language);

        Self {
            config,
            storage,
            store: Arc::new(store),
            loader,
        }
    }

    /// File-backed storage and the configured gateway, or the offline echo
    /// when `offline` is set
    pub fn from_config(config: Config, offline: bool) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.path)?);
        let gateway = if offline {
            GatewayFactory::offline()
        } else {
            GatewayFactory::create(&config.gateway, &config.site.source_language)
        };
        Ok(Self::new(config, storage, gateway))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.store
    }

    fn source_language(&self) -> &str {
        &self.config.site.source_language
    }

    /// Persisted language preference, or the source language
    pub fn current_language(&self) -> String {
        match self.storage.get(LANGUAGE_PREFERENCE_KEY) {
            Ok(Some(code)) => match lang::validate(&code) {
                Ok(code) => code,
                Err(e) => {
                    warn!("Ignoring stored language preference: {}", e);
                    self.source_language().to_string()
                }
            },
            Ok(None) => self.source_language().to_string(),
            Err(e) => {
                warn!("Failed to read language preference: {}", e);
                self.source_language().to_string()
            }
        }
    }

    /// Content for `language`. A document authored in that language is used
    /// as is; otherwise the source document is loaded and translated live.
    /// Returns the model and whether it is already in `language`.
    async fn content_for(&self, language: &str) -> (ContentModel, bool) {
        if language != self.source_language() {
            match self.loader.try_load(language).await {
                Ok(model) => {
                    info!("Using {} document for {}", self.loader.document_path(language), language);
                    return (model, true);
                }
                Err(e) => debug!("No {} document, translating source content: {}", language, e),
            }
        }
        (self.loader.load(self.source_language()).await, false)
    }

    /// Start a fresh language run: drop the cache and load what was
    /// persisted for `language`
    async fn prepare_store(&self, language: &str) {
        self.store.clear().await;
        if let Err(e) = self.store.warm_from_storage(language).await {
            warn!("Ignoring persisted translations for {}: {}", language, e);
        }
    }

    /// Build the index page for `model`, translated into `render_language`,
    /// with the switcher showing `page_language`
    async fn render_index(
        &self,
        model: &ContentModel,
        render_language: &str,
        page_language: &str,
    ) -> RenderedPage {
        let renderer = Renderer::new(self.store.clone(), render_language);
        let page = build_index(model, page_language);
        let mut document = page.document;

        let switcher = LanguageSwitcher::new(page_language);
        switcher.try_install(&mut document);

        let mut watcher = MutationWatcher::attach(&mut document);
        let root = document.root();
        let mut translated = renderer.render_all(&mut document, root).await;
        watcher.take_pending();

        append_recipe_sections(&mut document, page.recipes_container, model);
        translated += watcher.flush(&mut document, &renderer).await;

        let title = self.store.resolve(&model.ui.title, render_language).await;
        set_head_title(&mut document, &title);

        let state = FilterState::default();
        let visible = compute_visibility(&model.recipes, &state);
        apply_visibility(&mut document, &visible);
        sync_buttons(&mut document, &state);

        RenderedPage {
            document,
            renderer,
            switcher,
            translated,
        }
    }

    /// Render every language into `output_dir/<lang>/`
    pub async fn build_site(&self, languages: &[String], output_dir: &Path) -> Result<BuildReport> {
        let mut builds = Vec::new();
        for language in languages {
            let language = lang::validate(language)?;
            builds.push(self.build_language(&language, output_dir).await?);
        }

        let report = BuildReport {
            built_at: Utc::now(),
            languages: builds,
        };
        fs::create_dir_all(output_dir).await?;
        let report_path = output_dir.join("build-report.json");
        fs::write(&report_path, serde_json::to_string_pretty(&report)?).await?;
        info!("Build report written to {}", display_path(&report_path));
        Ok(report)
    }

    async fn build_language(&self, language: &str, output_dir: &Path) -> Result<LanguageBuild> {
        info!("Building site for {}", language);
        self.prepare_store(language).await;

        let (model, pretranslated) = self.content_for(language).await;
        let render_language = if pretranslated { self.source_language() } else { language };

        let page = self.render_index(&model, render_language, language).await;
        let language_dir = output_dir.join(language);
        let recipes_dir = language_dir.join("recipes");
        let data_dir = language_dir.join("data");
        fs::create_dir_all(&recipes_dir).await?;
        fs::create_dir_all(&data_dir).await?;

        let index = language_dir.join("index.html");
        fs::write(&index, page.document.to_html()).await?;

        let site_title = self.store.resolve(&model.ui.title, render_language).await;
        let progress = ProgressBar::new(model.recipes.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        let renderer = Renderer::new(self.store.clone(), render_language);
        for recipe in &model.recipes {
            progress.set_message(recipe.id.clone());
            let mut document = build_recipe_page(recipe, &site_title, language);
            apply_labels(&mut document, &model.ui);
            let root = document.root();
            renderer.render_all(&mut document, root).await;

            let title = self.store.resolve(&recipe.title, render_language).await;
            set_head_title(&mut document, &format!("{} - {}", title, site_title));
            fs::write(recipes_dir.join(format!("{}.html", recipe.id)), document.to_html()).await?;
            progress.inc(1);
        }
        progress.finish_and_clear();

        let content = serde_json::to_value(&model)?;
        let content = translate_content(&self.store, &content, render_language).await;
        fs::write(
            data_dir.join("cookbook-data.json"),
            serde_json::to_string_pretty(&content)?,
        ).await?;

        if render_language != self.source_language() {
            if let Err(e) = self.store.persist(render_language).await {
                warn!("Failed to persist translations for {}: {}", language, e);
            }
        }

        info!(
            "Built {} with {} recipes ({} elements translated)",
            display_path(&index),
            model.recipes.len(),
            page.translated
        );
        Ok(LanguageBuild {
            language: language.to_string(),
            pretranslated,
            recipes: model.recipes.len(),
            translated_elements: page.translated,
            index,
        })
    }

    /// Translate a single string through the full fallback chain
    pub async fn translate_text(&self, text: &str, language: &str) -> Result<String> {
        let language = lang::validate(language)?;
        if let Err(e) = self.store.warm_from_storage(&language).await {
            warn!("Ignoring persisted translations for {}: {}", language, e);
        }

        let translated = self.store.resolve(text, &language).await;
        if translated != text && language != self.source_language() {
            self.store.persist(&language).await?;
        }
        Ok(translated)
    }

    /// Recipes visible under `state`, with their titles in `language`
    pub async fn search(&self, language: &str, state: &FilterState) -> Result<Vec<RecipeRecord>> {
        let language = lang::validate(language)?;
        self.prepare_store(&language).await;
        let (model, pretranslated) = self.content_for(&language).await;
        let render_language = if pretranslated { self.source_language() } else { language.as_str() };

        let visible = compute_visibility(&model.recipes, state);
        let mut results = Vec::new();
        for recipe in model.recipes.iter().filter(|r| visible.contains(&r.id)) {
            results.push(self.store.translate_recipe(recipe, render_language).await);
        }
        debug!("Search matched {} of {} recipes", results.len(), model.recipes.len());
        Ok(results)
    }

    /// Render the index in the current language, then pick `language` from
    /// the switcher menu and write the re-rendered page to
    /// `output_dir/index.html`
    pub async fn switch_language(&self, language: &str, output_dir: &Path) -> Result<PathBuf> {
        let target = lang::validate(language)?;
        let current = self.current_language();
        self.prepare_store(&current).await;

        let model = self.loader.load(self.source_language()).await;
        let mut page = self.render_index(&model, &current, &current).await;

        page.switcher.handle(SwitchEvent::Toggle);
        page.switcher.sync_dom(&mut page.document);
        let selected = page
            .switcher
            .handle(SwitchEvent::Select(target))
            .unwrap_or_else(|| current.clone());

        let outcome = page
            .switcher
            .commit(&selected, &mut page.document, self.storage.as_ref(), Some(&page.renderer))
            .await?;

        let document = match outcome {
            CommitOutcome::Rerendered => {
                let mut document = page.document;
                let title = self.store.resolve(&model.ui.title, &selected).await;
                set_head_title(&mut document, &title);
                document
            }
            CommitOutcome::ReloadRequired { language } => {
                self.render_index(&model, &language, &language).await.document
            }
        };
        if let Err(e) = self.store.persist(&selected).await {
            warn!("Failed to persist translations for {}: {}", selected, e);
        }

        fs::create_dir_all(output_dir).await?;
        let index = output_dir.join("index.html");
        fs::write(&index, document.to_html()).await?;
        info!("Switched from {} to {}, wrote {}", current, selected, display_path(&index));
        Ok(index)
    }

    /// Supported languages, flagging those with a content document under
    /// the local content root
    pub fn languages(&self) -> Vec<LanguageStatus> {
        let data_dir = self.config.site.content_root.join("data");
        let mut documents = Vec::new();
        for entry in WalkDir::new(&data_dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if name == "cookbook-data.json" {
                documents.push(self.source_language().to_string());
            } else if let Some(code) = name
                .strip_prefix("cookbook-data-")
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                documents.push(code.to_lowercase());
            }
        }

        SUPPORTED_LANGUAGES
            .iter()
            .map(|(code, name)| LanguageStatus {
                code: code.to_string(),
                name: name.to_string(),
                has_document: documents.iter().any(|d| d == code),
            })
            .collect()
    }

    /// Persisted per-language translation caches
    pub fn list_cache(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        for key in self.storage.keys()? {
            let Some(language) = key.strip_prefix(TRANSLATION_CACHE_PREFIX) else {
                continue;
            };
            let count = match self.storage.get(&key)? {
                Some(raw) => serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&raw)
                    .map(|map| map.len())
                    .unwrap_or(0),
                None => 0,
            };
            entries.push(CacheEntry {
                language: language.to_string(),
                entries: count,
            });
        }
        Ok(entries)
    }

    /// Remove every persisted translation cache. Returns how many were removed.
    pub fn clear_cache(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in self.list_cache()? {
            if self.storage.remove(&translation_cache_key(&entry.language))? {
                removed += 1;
            }
        }
        info!("Cleared {} persisted translation caches", removed);
        Ok(removed)
    }
}

/// `path` relative to the working directory when possible
pub fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
