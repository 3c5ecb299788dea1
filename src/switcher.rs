//! Language menu: a two-state widget that persists the chosen language and
//! re-renders the page through whichever pipeline is registered.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::dom::{Document, NodeId};
use crate::error::{CookbookError, Result};
use crate::lang::{self, LANGUAGE_PREFERENCE_KEY, SUPPORTED_LANGUAGES};
use crate::storage::KeyValueStore;

pub const TOGGLE_ID: &str = "language-toggle";
pub const MENU_ID: &str = "language-menu";
pub const LANG_ATTR: &str = "data-lang";

/// Re-renders a page in a new language
#[async_trait]
pub trait TranslationPipeline: Send + Sync {
    async fn change_language(&self, doc: &mut Document, language: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEvent {
    Toggle,
    OutsideClick,
    Select(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The registered pipeline translated the page in place
    Rerendered,
    /// Nothing could re-render; the page must be rebuilt for `language`
    ReloadRequired { language: String },
}

pub struct LanguageSwitcher {
    state: MenuState,
    current: String,
}

impl LanguageSwitcher {
    pub fn new(current: &str) -> Self {
        Self {
            state: MenuState::Closed,
            current: current.to_string(),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Advance the menu state. Returns the language to commit when an
    /// option was selected.
    pub fn handle(&mut self, event: SwitchEvent) -> Option<String> {
        let (next, selected) = match (self.state, event) {
            (MenuState::Closed, SwitchEvent::Toggle) => (MenuState::Open, None),
            (MenuState::Open, SwitchEvent::Toggle) => (MenuState::Closed, None),
            (_, SwitchEvent::OutsideClick) => (MenuState::Closed, None),
            (_, SwitchEvent::Select(code)) => (MenuState::Closed, Some(code)),
        };
        debug!("Language menu {:?} -> {:?}", self.state, next);
        self.state = next;
        selected
    }

    fn header_container(doc: &Document) -> Option<NodeId> {
        doc.elements(doc.root()).into_iter().find(|node| {
            doc.has_class(*node, "container")
                && doc.closest(*node, |d, n| d.tag(n) == Some("header")).is_some()
        })
    }

    /// Insert the menu markup into `header .container`, replacing any
    /// switcher already present. Returns the switcher element.
    pub fn install(&self, doc: &mut Document) -> Result<NodeId> {
        let Some(header) = Self::header_container(doc) else {
            return Err(CookbookError::ElementNotFound("header .container".to_string()));
        };

        for existing in doc.elements_with_class(doc.root(), "language-switcher") {
            doc.detach(existing);
        }

        let switcher = doc.create_element("div");
        doc.add_class(switcher, "language-switcher");

        let toggle = doc.append_element(switcher, "button", None);
        doc.set_attr(toggle, "id", TOGGLE_ID);
        doc.add_class(toggle, "language-toggle");
        doc.set_attr(toggle, "aria-label", "Change language");
        let name = lang::native_name(&self.current).unwrap_or(self.current.as_str());
        let current = doc.append_element(toggle, "span", Some(name));
        doc.add_class(current, "current-lang");
        let icon = doc.append_element(toggle, "span", Some("🌍"));
        doc.add_class(icon, "toggle-icon");

        let menu = doc.append_element(switcher, "div", None);
        doc.set_attr(menu, "id", MENU_ID);
        doc.add_class(menu, "language-menu");
        for &(code, name) in SUPPORTED_LANGUAGES {
            let option = doc.append_element(menu, "button", Some(name));
            doc.add_class(option, "lang-option");
            doc.set_attr(option, LANG_ATTR, code);
        }

        doc.append_child(header, switcher);
        self.sync_dom(doc);
        debug!("Language switcher installed");
        Ok(switcher)
    }

    /// Like `install`, but a missing header only disables the switcher
    pub fn try_install(&self, doc: &mut Document) -> Option<NodeId> {
        match self.install(doc) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("Language switcher not installed: {}", e);
                None
            }
        }
    }

    /// Translate a click on `target` into a menu event
    pub fn event_for_click(&self, doc: &Document, target: NodeId) -> Option<SwitchEvent> {
        if let Some(option) = doc.closest(target, |d, n| d.has_class(n, "lang-option")) {
            return doc
                .attr(option, LANG_ATTR)
                .map(|code| SwitchEvent::Select(code.to_string()));
        }
        if doc.closest(target, |d, n| d.attr(n, "id") == Some(TOGGLE_ID)).is_some() {
            return Some(SwitchEvent::Toggle);
        }
        if doc.closest(target, |d, n| d.attr(n, "id") == Some(MENU_ID)).is_some() {
            return None;
        }
        Some(SwitchEvent::OutsideClick)
    }

    /// Reflect the menu state and the current language in the markup
    pub fn sync_dom(&self, doc: &mut Document) {
        if let Some(menu) = doc.find_by_id(MENU_ID) {
            match self.state {
                MenuState::Open => doc.add_class(menu, "show"),
                MenuState::Closed => doc.remove_class(menu, "show"),
            }
        }

        for option in doc.elements_with_class(doc.root(), "lang-option") {
            if doc.attr(option, LANG_ATTR) == Some(self.current.as_str()) {
                doc.add_class(option, "active");
            } else {
                doc.remove_class(option, "active");
            }
        }

        let name = lang::native_name(&self.current).unwrap_or(self.current.as_str()).to_string();
        for label in doc.elements_with_class(doc.root(), "current-lang") {
            doc.set_text_content(label, &name);
        }
    }

    /// Persist `language`, then re-render through `pipeline`. Without a
    /// pipeline the caller has to rebuild the page from scratch.
    pub async fn commit(
        &mut self,
        language: &str,
        doc: &mut Document,
        storage: &dyn KeyValueStore,
        pipeline: Option<&dyn TranslationPipeline>,
    ) -> Result<CommitOutcome> {
        let language = lang::validate(language)?;
        storage.set(LANGUAGE_PREFERENCE_KEY, &language)?;
        self.current = language.clone();
        self.sync_dom(doc);

        match pipeline {
            Some(pipeline) => {
                pipeline.change_language(doc, &language).await?;
                info!("Switched page to {}", language);
                Ok(CommitOutcome::Rerendered)
            }
            None => {
                info!("No translation pipeline registered, reload required for {}", language);
                Ok(CommitOutcome::ReloadRequired { language })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::render::Renderer;
    use crate::storage::MemoryStore;
    use crate::translate::{Dictionary, OfflineGateway, TranslationStore};

    fn page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "body", None);
        let header = doc.append_element(body, "header", None);
        let container = doc.append_element(header, "div", None);
        doc.add_class(container, "container");
        doc.append_element(container, "h1", Some("My Recipe Journal"));
        let outside = doc.append_element(body, "p", Some("Soups"));
        (doc, outside)
    }

    #[test]
    fn test_menu_state_machine() {
        let mut switcher = LanguageSwitcher::new("en");
        assert_eq!(switcher.state(), MenuState::Closed);

        assert_eq!(switcher.handle(SwitchEvent::Toggle), None);
        assert_eq!(switcher.state(), MenuState::Open);
        assert_eq!(switcher.handle(SwitchEvent::Toggle), None);
        assert_eq!(switcher.state(), MenuState::Closed);

        switcher.handle(SwitchEvent::Toggle);
        switcher.handle(SwitchEvent::OutsideClick);
        assert_eq!(switcher.state(), MenuState::Closed);
        switcher.handle(SwitchEvent::OutsideClick);
        assert_eq!(switcher.state(), MenuState::Closed);

        switcher.handle(SwitchEvent::Toggle);
        let selected = switcher.handle(SwitchEvent::Select("fr".to_string()));
        assert_eq!(selected.as_deref(), Some("fr"));
        assert_eq!(switcher.state(), MenuState::Closed);
    }

    #[test]
    fn test_install_requires_header_container() {
        let mut doc = Document::new();
        doc.append_element(doc.root(), "body", None);

        let switcher = LanguageSwitcher::new("en");
        let err = switcher.install(&mut doc).unwrap_err();
        assert!(matches!(err, CookbookError::ElementNotFound(_)));
        assert!(switcher.try_install(&mut doc).is_none());
        assert!(doc.find_by_id(MENU_ID).is_none());
    }

    #[test]
    fn test_install_and_click_mapping() {
        let (mut doc, outside) = page();
        let switcher = LanguageSwitcher::new("fr");
        switcher.install(&mut doc).unwrap();
        switcher.install(&mut doc).unwrap();
        assert_eq!(doc.elements_with_class(doc.root(), "language-switcher").len(), 1);

        let options = doc.elements_with_class(doc.root(), "lang-option");
        assert_eq!(options.len(), SUPPORTED_LANGUAGES.len());
        let french = options[1];
        assert!(doc.has_class(french, "active"));

        let label = doc.elements_with_class(doc.root(), "current-lang")[0];
        assert_eq!(doc.text_content(label), "Français");

        let icon = doc.elements_with_class(doc.root(), "toggle-icon")[0];
        let menu = doc.find_by_id(MENU_ID).unwrap();
        assert_eq!(switcher.event_for_click(&doc, icon), Some(SwitchEvent::Toggle));
        assert_eq!(
            switcher.event_for_click(&doc, options[2]),
            Some(SwitchEvent::Select("es".to_string()))
        );
        assert_eq!(switcher.event_for_click(&doc, menu), None);
        assert_eq!(switcher.event_for_click(&doc, outside), Some(SwitchEvent::OutsideClick));
    }

    #[tokio::test]
    async fn test_commit_rerenders_through_pipeline() {
        let (mut doc, outside) = page();
        let storage = MemoryStore::new();
        let store = TranslationStore::new("en", Dictionary::embedded(), Arc::new(OfflineGateway));
        let renderer = Renderer::new(Arc::new(store), "en");

        let mut switcher = LanguageSwitcher::new("en");
        switcher.install(&mut doc).unwrap();
        switcher.handle(SwitchEvent::Toggle);
        switcher.sync_dom(&mut doc);
        let menu = doc.find_by_id(MENU_ID).unwrap();
        assert!(doc.has_class(menu, "show"));

        let selected = switcher.handle(SwitchEvent::Select("fr".to_string())).unwrap();
        let outcome = switcher
            .commit(&selected, &mut doc, &storage, Some(&renderer))
            .await
            .unwrap();

        assert_eq!(outcome, CommitOutcome::Rerendered);
        assert_eq!(storage.get(LANGUAGE_PREFERENCE_KEY).unwrap().as_deref(), Some("fr"));
        assert!(!doc.has_class(menu, "show"));
        assert_eq!(doc.text_content(outside), "Soupes");

        let label = doc.elements_with_class(doc.root(), "current-lang")[0];
        assert_eq!(doc.text_content(label), "Français");
    }

    #[tokio::test]
    async fn test_commit_without_pipeline_requires_reload() {
        let (mut doc, _) = page();
        let storage = MemoryStore::new();
        let mut switcher = LanguageSwitcher::new("en");

        let outcome = switcher.commit("ES", &mut doc, &storage, None).await.unwrap();
        assert_eq!(outcome, CommitOutcome::ReloadRequired { language: "es".to_string() });
        assert_eq!(switcher.current(), "es");
        assert_eq!(storage.get(LANGUAGE_PREFERENCE_KEY).unwrap().as_deref(), Some("es"));

        let err = switcher.commit("xx", &mut doc, &storage, None).await.unwrap_err();
        assert!(matches!(err, CookbookError::UnsupportedLanguage(_)));
    }
}
