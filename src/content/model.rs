use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CookbookError, Result};

/// The synthetic dish filter that matches every recipe
pub const ALL_FILTER: &str = "all";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentModel {
    #[serde(default)]
    pub ui: UiStrings,
    #[serde(default)]
    pub recipes: Vec<RecipeRecord>,
    /// Alternate document shape with recipes nested under their category
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, Category>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UiStrings {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub search_placeholder: String,
    #[serde(default)]
    pub section_headers: BTreeMap<String, String>,
    /// Dish-type tag id to its display label
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    /// Dietary tag id to its display label
    #[serde(default)]
    pub dietary_filters: BTreeMap<String, String>,
    /// Any other flat label
    #[serde(flatten)]
    pub labels: BTreeMap<String, Value>,
}

impl UiStrings {
    /// Look up a flat label by key, checking the named fields first
    pub fn label(&self, key: &str) -> Option<&str> {
        match key {
            "title" => Some(self.title.as_str()),
            "search_placeholder" => Some(self.search_placeholder.as_str()),
            _ => self.section_headers.get(key).map(String::as_str)
                .or_else(|| self.labels.get(key).and_then(Value::as_str)),
        }
        .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipeRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
}

impl RecipeRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipes: Vec<RecipeRecord>,
}

impl ContentModel {
    pub fn from_json(content: &str) -> Result<Self> {
        let mut model: ContentModel = serde_json::from_str(content)?;
        model.normalize();
        model.validate()?;
        Ok(model)
    }

    /// Fold category-nested recipes into `recipes`, tagging each with its
    /// category id, and register every category label in `ui.categories`.
    pub fn normalize(&mut self) {
        for (category_id, category) in self.categories.iter_mut() {
            self.ui
                .categories
                .entry(category_id.clone())
                .or_insert_with(|| category.name.clone());

            for mut recipe in category.recipes.drain(..) {
                recipe.tags.insert(category_id.clone());
                match self.recipes.iter_mut().find(|r| r.id == recipe.id) {
                    Some(existing) => existing.tags.extend(recipe.tags),
                    None => self.recipes.push(recipe),
                }
            }
        }
    }

    /// Recipe ids must be unique and non-empty
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for recipe in &self.recipes {
            if recipe.id.trim().is_empty() {
                return Err(CookbookError::ResourceLoad(format!(
                    "Recipe '{}' has no id", recipe.title
                )));
            }
            if !seen.insert(recipe.id.as_str()) {
                return Err(CookbookError::ResourceLoad(format!(
                    "Duplicate recipe id '{}'", recipe.id
                )));
            }
        }
        Ok(())
    }

    pub fn recipe(&self, id: &str) -> Option<&RecipeRecord> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Dish-type sections in display order, excluding the synthetic `all`
    /// entry. Sections without recipes are still listed.
    pub fn sections(&self) -> Vec<(&str, &str, Vec<&RecipeRecord>)> {
        self.ui
            .categories
            .iter()
            .filter(|(id, _)| id.as_str() != ALL_FILTER)
            .map(|(id, label)| {
                let members = self.recipes.iter().filter(|r| r.has_tag(id)).collect();
                (id.as_str(), label.as_str(), members)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_document_parses() {
        let model = ContentModel::from_json(r#"{
            "ui": {
                "title": "My Recipe Journal",
                "search_placeholder": "Search recipes...",
                "section_headers": {"dish_types": "Dish Types"},
                "categories": {"all": "All Recipes", "soups": "Soups"},
                "dietary_filters": {"vegan": "Vegan"},
                "footer": "Made with love"
            },
            "recipes": [
                {"id": "lentils_soup", "title": "Lentils Soup", "tags": ["soups", "vegan"]}
            ]
        }"#).unwrap();

        assert_eq!(model.ui.label("title"), Some("My Recipe Journal"));
        assert_eq!(model.ui.label("dish_types"), Some("Dish Types"));
        assert_eq!(model.ui.label("footer"), Some("Made with love"));
        assert_eq!(model.ui.label("missing"), None);
        assert!(model.recipe("lentils_soup").unwrap().has_tag("vegan"));

        let sections = model.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "soups");
        assert_eq!(sections[0].2.len(), 1);
    }

    #[test]
    fn test_nested_categories_are_folded() {
        let model = ContentModel::from_json(r#"{
            "categories": {
                "desserts": {"name": "Desserts", "recipes": [
                    {"id": "banana_bread", "title": "Banana Bread"}
                ]},
                "quick": {"name": "Quick Recipes", "recipes": [
                    {"id": "banana_bread", "title": "Banana Bread"}
                ]}
            }
        }"#).unwrap();

        assert_eq!(model.recipes.len(), 1);
        let tags: Vec<&str> = model.recipes[0].tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["desserts", "quick"]);
        assert_eq!(model.ui.categories.get("quick").map(String::as_str), Some("Quick Recipes"));
        assert!(model.categories["desserts"].recipes.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = ContentModel::from_json(r#"{"recipes": [
            {"id": "a", "title": "One"}, {"id": "a", "title": "Two"}
        ]}"#).unwrap_err();
        assert!(matches!(err, CookbookError::ResourceLoad(_)));
    }
}
