// Content model loading
//
// A content document is fetched from a source (local files or HTTP) for the
// requested language. Anything that goes wrong on the way is logged and
// replaced by a small embedded document so the site stays navigable.

pub mod model;

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

pub use model::{Category, ContentModel, RecipeRecord, UiStrings, ALL_FILTER};

use crate::config::SiteConfig;
use crate::error::{CookbookError, Result};

/// Where content documents come from
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a document by its site-relative path, e.g. `data/cookbook-data.json`
    async fn fetch(&self, path: &str) -> Result<String>;

    /// Human readable location for log lines
    fn describe(&self) -> String;
}

/// Reads documents from a directory on disk
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full_path = self.root.join(path);
        tokio::fs::read_to_string(&full_path).await.map_err(|e| {
            CookbookError::ResourceLoad(format!("{}: {}", full_path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Fetches documents over HTTP relative to a base URL
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Fetching content from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CookbookError::ResourceLoad(format!(
                "HTTP {}: {}", status.as_u16(), url
            )));
        }
        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Factory for creating content sources
pub struct ContentSourceFactory;

impl ContentSourceFactory {
    /// HTTP when a content URL is configured, the local content root otherwise
    pub fn create(config: &SiteConfig) -> Box<dyn ContentSource> {
        match &config.content_url {
            Some(url) => Box::new(HttpSource::new(url)),
            None => Box::new(FsSource::new(config.content_root.clone())),
        }
    }
}

pub struct ContentLoader {
    source: Box<dyn ContentSource>,
    source_language: String,
}

impl ContentLoader {
    pub fn new(source: Box<dyn ContentSource>, source_language: &str) -> Self {
        Self {
            source,
            source_language: source_language.to_string(),
        }
    }

    /// `data/cookbook-data.json` for the source language,
    /// `data/cookbook-data-<lang>.json` for any other
    pub fn document_path(&self, language: &str) -> String {
        if language == self.source_language {
            "data/cookbook-data.json".to_string()
        } else {
            format!("data/cookbook-data-{}.json", language)
        }
    }

    /// Fetch and parse the document for `language`, without fallback
    pub async fn try_load(&self, language: &str) -> Result<ContentModel> {
        let path = self.document_path(language);
        let raw = self.source.fetch(&path).await?;
        ContentModel::from_json(&raw)
            .map_err(|e| CookbookError::ResourceLoad(format!("{}: {}", path, e)))
    }

    /// Load content for `language`, substituting the embedded fallback on
    /// any failure. One attempt per call.
    pub async fn load(&self, language: &str) -> ContentModel {
        match self.try_load(language).await {
            Ok(model) => {
                info!(
                    "Loaded {} recipes for {} from {}",
                    model.recipes.len(),
                    language,
                    self.source.describe()
                );
                model
            }
            Err(e) => {
                warn!("Using fallback content for {}: {}", language, e);
                fallback_content()
            }
        }
    }
}

fn recipe(id: &str, title: &str, description: &str) -> RecipeRecord {
    RecipeRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        file: Some(format!("{}.html", id)),
        image: Some(format!("{}.webp", id)),
        ..Default::default()
    }
}

/// Minimal document used whenever the real one cannot be loaded
pub fn fallback_content() -> ContentModel {
    let mut ui = UiStrings {
        title: "My Recipe Journal".to_string(),
        search_placeholder: "Search recipes...".to_string(),
        ..Default::default()
    };
    ui.section_headers.insert("dish_types".to_string(), "Dish Types".to_string());
    ui.section_headers.insert("dietary_options".to_string(), "Dietary Options".to_string());
    for (id, label) in [
        (ALL_FILTER, "All Recipes"),
        ("main-courses", "Main Courses"),
        ("desserts", "Desserts"),
        ("soups", "Soups"),
        ("quick", "Quick Recipes"),
    ] {
        ui.categories.insert(id.to_string(), label.to_string());
    }
    ui.dietary_filters.insert("vegetarian".to_string(), "Vegetarian".to_string());

    let mut model = ContentModel {
        ui,
        ..Default::default()
    };
    model.categories.insert("main-courses".to_string(), Category {
        name: "Main Courses".to_string(),
        recipes: vec![
            recipe("bourguignon", "Seitan Bourguignon", "A hearty vegetarian version of the classic French dish"),
            recipe("lentils_soup", "Lentils Soup", "Warm and nutritious lentil soup"),
            recipe("moussaka", "Moussaka", "Layered eggplant and potato casserole"),
        ],
    });
    model.categories.insert("desserts".to_string(), Category {
        name: "Desserts".to_string(),
        recipes: vec![
            recipe("banana_bread", "Banana Bread", "Moist and delicious banana bread"),
            recipe("chocolate_truffles", "Chocolate Truffles", "Rich and creamy chocolate truffles"),
            recipe("rice_pudding", "Rice Pudding", "Creamy and comforting rice pudding"),
        ],
    });
    model.normalize();
    model
}
