use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;

/// Path, relative to the content root, of the optional dictionary override
pub const DICTIONARY_FILE: &str = "data/translations.json";

const FR: &[(&str, &str)] = &[
    ("← Back to Recipes", "← Retour aux Recettes"),
    ("Ingredients", "Ingrédients"),
    ("Instructions", "Préparation"),
    ("My Recipe Journal", "Mon Journal de Recettes"),
    ("Search recipes...", "Rechercher des recettes..."),
    ("Main Courses", "Plats Principaux"),
    ("Desserts", "Desserts"),
    ("Soups", "Soupes"),
    ("Quick Recipes", "Recettes Rapides"),
    ("Vegetarian", "Végétarien"),
    ("All Recipes", "Toutes les Recettes"),
    ("Seitan Bourguignon", "Seitan Bourguignon"),
    ("Lentils Soup", "Soupe aux Lentilles"),
    ("Moussaka", "Moussaka"),
    ("Banana Bread", "Pain aux Bananes"),
    ("Chocolate Truffles", "Truffes au Chocolat"),
    ("Rice Pudding", "Pudding au Riz"),
];

const ES: &[(&str, &str)] = &[
    ("← Back to Recipes", "← Volver a las Recetas"),
    ("Ingredients", "Ingredientes"),
    ("Instructions", "Instrucciones"),
    ("My Recipe Journal", "Mi Diario de Recetas"),
    ("Search recipes...", "Buscar recetas..."),
    ("Main Courses", "Platos Principales"),
    ("Desserts", "Postres"),
    ("Soups", "Sopas"),
    ("Quick Recipes", "Recetas Rápidas"),
    ("Vegetarian", "Vegetariano"),
    ("All Recipes", "Todas las Recetas"),
    ("Seitan Bourguignon", "Seitan Bourguignon"),
    ("Lentils Soup", "Sopa de Lentejas"),
    ("Moussaka", "Moussaka"),
    ("Banana Bread", "Pan de Plátano"),
    ("Chocolate Truffles", "Trufas de Chocolate"),
    ("Rice Pudding", "Pudín de Arroz"),
];

const DE: &[(&str, &str)] = &[
    ("← Back to Recipes", "← Zurück zu den Rezepten"),
    ("Ingredients", "Zutaten"),
    ("Instructions", "Zubereitung"),
    ("My Recipe Journal", "Mein Rezeptjournal"),
    ("Search recipes...", "Rezepte suchen..."),
    ("Main Courses", "Hauptgerichte"),
    ("Desserts", "Desserts"),
    ("Soups", "Suppen"),
    ("Quick Recipes", "Schnelle Rezepte"),
    ("Vegetarian", "Vegetarisch"),
    ("All Recipes", "Alle Rezepte"),
    ("Seitan Bourguignon", "Seitan Bourguignon"),
    ("Lentils Soup", "Linsensuppe"),
    ("Moussaka", "Moussaka"),
    ("Banana Bread", "Bananenbrot"),
    ("Chocolate Truffles", "Schokoladentrüffel"),
    ("Rice Pudding", "Reispudding"),
];

const IT: &[(&str, &str)] = &[
    ("← Back to Recipes", "← Torna alle Ricette"),
    ("Ingredients", "Ingredienti"),
    ("Instructions", "Istruzioni"),
    ("My Recipe Journal", "Il Mio Diario di Ricette"),
    ("Search recipes...", "Cerca ricette..."),
    ("Main Courses", "Piatti Principali"),
    ("Desserts", "Dolci"),
    ("Soups", "Zuppe"),
    ("Quick Recipes", "Ricette Veloci"),
    ("Vegetarian", "Vegetariano"),
    ("All Recipes", "Tutte le Ricette"),
    ("Seitan Bourguignon", "Seitan Bourguignon"),
    ("Lentils Soup", "Zuppa di Lenticchie"),
    ("Moussaka", "Moussaka"),
    ("Banana Bread", "Pane alle Banane"),
    ("Chocolate Truffles", "Tartufi al Cioccolato"),
    ("Rice Pudding", "Budino di Riso"),
];

const PT: &[(&str, &str)] = &[
    ("← Back to Recipes", "← Voltar às Receitas"),
    ("Ingredients", "Ingredientes"),
    ("Instructions", "Instruções"),
    ("My Recipe Journal", "Meu Diário de Receitas"),
    ("Search recipes...", "Pesquisar receitas..."),
    ("Main Courses", "Pratos Principais"),
    ("Desserts", "Sobremesas"),
    ("Soups", "Sopas"),
    ("Quick Recipes", "Receitas Rápidas"),
    ("Vegetarian", "Vegetariano"),
    ("All Recipes", "Todas as Receitas"),
];

const NL: &[(&str, &str)] = &[
    ("← Back to Recipes", "← Terug naar Recepten"),
    ("Ingredients", "Ingrediënten"),
    ("Instructions", "Bereiding"),
    ("My Recipe Journal", "Mijn Recepten Dagboek"),
    ("Search recipes...", "Recepten zoeken..."),
    ("Main Courses", "Hoofdgerechten"),
    ("Desserts", "Desserts"),
    ("Soups", "Soepen"),
    ("Quick Recipes", "Snelle Recepten"),
    ("Vegetarian", "Vegetarisch"),
    ("All Recipes", "Alle Recepten"),
];

/// Static source-text to translated-text tables, one per language
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    languages: HashMap<String, HashMap<String, String>>,
}

impl Dictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dictionaries compiled into the binary
    pub fn embedded() -> Self {
        let mut dictionary = Self::empty();
        for (language, table) in [("fr", FR), ("es", ES), ("de", DE), ("it", IT), ("pt", PT), ("nl", NL)] {
            for (source, translated) in table {
                dictionary.insert(language, source, translated);
            }
        }
        dictionary
    }

    /// Embedded dictionaries overridden by `data/translations.json` under
    /// `content_root` when that file exists and parses.
    pub fn load_or_embedded<P: AsRef<Path>>(content_root: P) -> Self {
        let path = content_root.as_ref().join(DICTIONARY_FILE);
        if !path.exists() {
            return Self::embedded();
        }

        match Self::from_file(&path) {
            Ok(overrides) => {
                info!("Loaded translation dictionary from {}", path.display());
                let mut dictionary = Self::embedded();
                dictionary.merge(overrides);
                dictionary
            }
            Err(e) => {
                warn!("Failed to load {}, using embedded dictionary: {}", path.display(), e);
                Self::embedded()
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let languages: HashMap<String, HashMap<String, String>> = serde_json::from_str(&content)?;
        Ok(Self { languages })
    }

    pub fn insert(&mut self, language: &str, source: &str, translated: &str) {
        self.languages
            .entry(language.to_string())
            .or_default()
            .insert(source.to_string(), translated.to_string());
    }

    pub fn merge(&mut self, other: Dictionary) {
        for (language, table) in other.languages {
            self.languages.entry(language).or_default().extend(table);
        }
    }

    pub fn lookup(&self, text: &str, language: &str) -> Option<&str> {
        self.languages
            .get(language)
            .and_then(|table| table.get(text))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_lookup() {
        let dictionary = Dictionary::embedded();
        assert_eq!(dictionary.lookup("Banana Bread", "fr"), Some("Pain aux Bananes"));
        assert_eq!(dictionary.lookup("Soups", "nl"), Some("Soepen"));
        assert_eq!(dictionary.lookup("Banana Bread", "pt"), None);
        assert_eq!(dictionary.lookup("Banana Bread", "ja"), None);
    }

    #[test]
    fn test_override_file_merges_over_embedded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(
            dir.path().join(DICTIONARY_FILE),
            r#"{"fr": {"Soups": "Potages"}, "ja": {"Soups": "スープ"}}"#,
        ).unwrap();

        let dictionary = Dictionary::load_or_embedded(dir.path());
        assert_eq!(dictionary.lookup("Soups", "fr"), Some("Potages"));
        assert_eq!(dictionary.lookup("Soups", "ja"), Some("スープ"));
        assert_eq!(dictionary.lookup("Desserts", "es"), Some("Postres"));
    }

    #[test]
    fn test_broken_override_falls_back_to_embedded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join(DICTIONARY_FILE), "{").unwrap();

        let dictionary = Dictionary::load_or_embedded(dir.path());
        assert_eq!(dictionary.lookup("Soups", "fr"), Some("Soupes"));
    }
}
