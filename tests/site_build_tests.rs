use std::sync::Arc;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use tokio_test::assert_ok;

use cookbook::app::Cookbook;
use cookbook::config::Config;
use cookbook::lang::LANGUAGE_PREFERENCE_KEY;
use cookbook::storage::{KeyValueStore, MemoryStore};
use cookbook::translate::OfflineGateway;

const SOURCE_DOCUMENT: &str = r#"{
    "ui": {
        "title": "My Recipe Journal",
        "search_placeholder": "Search recipes...",
        "section_headers": { "dish_types": "Dish Types", "dietary_options": "Dietary Options" },
        "categories": { "all": "All Recipes", "desserts": "Desserts", "soups": "Soups" },
        "dietary_filters": { "vegetarian": "Vegetarian" }
    },
    "recipes": [
        { "id": "banana_bread", "title": "Banana Bread", "tags": ["desserts"], "ingredients": ["Bananas"] },
        { "id": "lentils_soup", "title": "Lentils Soup", "tags": ["soups", "vegetarian"] }
    ]
}"#;

const SPANISH_DOCUMENT: &str = r#"{
    "ui": { "title": "Mi Diario", "categories": { "all": "Todas", "postres": "Postres" } },
    "recipes": [ { "id": "pan", "title": "Pan de Plátano", "tags": ["postres"] } ]
}"#;

fn content_root() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("data").create_dir_all().unwrap();
    temp.child("data/cookbook-data.json").write_str(SOURCE_DOCUMENT).unwrap();
    temp.child("data/cookbook-data-es.json").write_str(SPANISH_DOCUMENT).unwrap();
    temp
}

fn cookbook_for(temp: &TempDir, storage: Arc<MemoryStore>) -> Cookbook {
    let mut config = Config::default();
    config.site.content_root = temp.path().to_path_buf();
    config.site.output_dir = temp.path().join("public");
    Cookbook::new(config, storage, Arc::new(OfflineGateway))
}

fn read(temp: &TempDir, relative: &str) -> String {
    let child = temp.child(relative);
    assert!(child.path().exists(), "{} was not written", relative);
    std::fs::read_to_string(child.path()).unwrap()
}

#[tokio::test]
async fn test_build_site_writes_every_language() {
    let temp = content_root();
    let storage = Arc::new(MemoryStore::new());
    let cookbook = cookbook_for(&temp, storage.clone());
    let output = temp.path().join("public");

    let languages = vec!["en".to_string(), "fr".to_string(), "es".to_string()];
    let report = assert_ok!(cookbook.build_site(&languages, &output).await);
    assert_eq!(report.languages.len(), 3);
    assert!(temp.child("public/build-report.json").path().exists());

    let english = read(&temp, "public/en/index.html");
    assert!(english.contains("My Recipe Journal"));
    assert!(!english.contains("data-translated"));
    assert!(english.contains("id=\"desserts-block\""));

    let french = read(&temp, "public/fr/index.html");
    assert!(french.contains("<html lang=\"fr\">"));
    assert!(french.contains("Mon Journal de Recettes"));
    assert!(french.contains("Pain aux Bananes"));
    assert!(french.contains("data-original-text=\"Banana Bread\""));
    assert!(french.contains("placeholder=\"Rechercher des recettes...\""));
    assert!(french.contains("class=\"language-switcher\""));
    assert!(french.contains("style=\"display: list-item\""));
    assert!(report.languages[1].translated_elements > 0);

    assert!(french.contains("<title>Mon Journal de Recettes</title>"));

    let recipe_page = read(&temp, "public/fr/recipes/banana_bread.html");
    assert!(recipe_page.contains("<title>Pain aux Bananes - Mon Journal de Recettes</title>"));
    assert!(recipe_page.contains(">Pain aux Bananes</h1>"));
    assert!(recipe_page.contains(">Ingrédients</h2>"));
    assert!(!recipe_page.contains(">Ingredients</h2>"));
    assert!(recipe_page.contains(">← Retour aux Recettes</a>"));
    assert!(recipe_page.contains("<li>Bananas</li>"));

    let data: serde_json::Value = serde_json::from_str(&read(&temp, "public/fr/data/cookbook-data.json")).unwrap();
    assert_eq!(data["recipes"][0]["id"], "banana_bread");
    assert_eq!(data["recipes"][0]["title"], "Pain aux Bananes");
    assert_eq!(data["ui"]["title"], "Mon Journal de Recettes");

    let spanish = read(&temp, "public/es/index.html");
    assert!(report.languages[2].pretranslated);
    assert!(spanish.contains("Mi Diario"));
    assert!(!spanish.contains("data-translated"));
    assert!(temp.child("public/es/recipes/pan.html").path().exists());

    let caches = cookbook.list_cache().unwrap();
    assert!(caches.iter().any(|c| c.language == "fr" && c.entries > 0));
    assert!(storage.get(LANGUAGE_PREFERENCE_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_build_rejects_unsupported_language() {
    let temp = content_root();
    let cookbook = cookbook_for(&temp, Arc::new(MemoryStore::new()));

    let result = cookbook.build_site(&["tlh".to_string()], &temp.path().join("public")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_switch_language_rerenders_index_and_saves_preference() {
    let temp = content_root();
    let storage = Arc::new(MemoryStore::new());
    let cookbook = cookbook_for(&temp, storage.clone());
    let output = temp.path().join("public");

    assert_ok!(cookbook.switch_language("de", &output).await);
    assert_eq!(cookbook.current_language(), "de");

    let page = read(&temp, "public/index.html");
    assert!(page.contains("Mein Rezeptjournal"));
    assert!(page.contains("Bananenbrot"));
    assert!(page.contains("<span class=\"current-lang\">Deutsch</span>"));
    assert_eq!(storage.get(LANGUAGE_PREFERENCE_KEY).unwrap().as_deref(), Some("de"));
}
