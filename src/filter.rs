//! Recipe filtering and search.
//!
//! Dish-type filters combine with OR, dietary filters with AND, and the
//! search term is matched against recipe titles only.

use std::collections::BTreeSet;

use tracing::debug;

use crate::content::{ContentModel, RecipeRecord, ALL_FILTER};
use crate::dom::{Document, NodeId};

pub const FILTER_ATTR: &str = "data-filter";
pub const FILTER_TYPE_ATTR: &str = "data-type";
pub const RECIPE_ID_ATTR: &str = "data-recipe-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub active_dish_tags: BTreeSet<String>,
    pub active_dietary_tags: BTreeSet<String>,
    pub search_term: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active_dish_tags: BTreeSet::from([ALL_FILTER.to_string()]),
            active_dietary_tags: BTreeSet::new(),
            search_term: String::new(),
        }
    }
}

impl FilterState {
    pub fn all_active(&self) -> bool {
        self.active_dish_tags.contains(ALL_FILTER)
    }

    /// `all` clears every other dish filter. A specific tag turns `all` off
    /// and toggles itself; `all` comes back once nothing is left.
    pub fn select_dish(&mut self, tag: &str) {
        if tag == ALL_FILTER {
            self.active_dish_tags.clear();
            self.active_dish_tags.insert(ALL_FILTER.to_string());
            return;
        }

        self.active_dish_tags.remove(ALL_FILTER);
        if !self.active_dish_tags.remove(tag) {
            self.active_dish_tags.insert(tag.to_string());
        }
        if self.active_dish_tags.is_empty() {
            self.active_dish_tags.insert(ALL_FILTER.to_string());
        }
    }

    pub fn toggle_dietary(&mut self, tag: &str) {
        if !self.active_dietary_tags.remove(tag) {
            self.active_dietary_tags.insert(tag.to_string());
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.search_term = term.trim().to_lowercase();
    }

    /// Apply a click on a filter button, using its `data-filter` and
    /// `data-type` attributes. Returns false for anything else.
    pub fn click(&mut self, doc: &Document, button: NodeId) -> bool {
        let Some(filter) = doc.attr(button, FILTER_ATTR) else {
            return false;
        };
        match doc.attr(button, FILTER_TYPE_ATTR) {
            Some("dietary") => self.toggle_dietary(filter),
            _ => self.select_dish(filter),
        }
        true
    }

    pub fn matches(&self, recipe: &RecipeRecord) -> bool {
        let term = self.search_term.trim().to_lowercase();
        let search_match = term.is_empty() || recipe.title.to_lowercase().contains(&term);
        let dish_match = self.all_active()
            || self.active_dish_tags.iter().any(|tag| recipe.has_tag(tag));
        let dietary_match = self.active_dietary_tags.iter().all(|tag| recipe.has_tag(tag));

        search_match && dish_match && dietary_match
    }
}

/// Ids of the recipes that pass the current filters
pub fn compute_visibility(recipes: &[RecipeRecord], state: &FilterState) -> BTreeSet<String> {
    recipes
        .iter()
        .filter(|recipe| state.matches(recipe))
        .map(|recipe| recipe.id.clone())
        .collect()
}

/// Section ids paired with whether any of their recipes is visible
pub fn section_visibility(model: &ContentModel, visible: &BTreeSet<String>) -> Vec<(String, bool)> {
    model
        .sections()
        .into_iter()
        .map(|(id, _, recipes)| {
            let shown = recipes.iter().any(|recipe| visible.contains(&recipe.id));
            (id.to_string(), shown)
        })
        .collect()
}

fn set_display(doc: &mut Document, node: NodeId, value: &str) {
    doc.set_attr(node, "style", &format!("display: {}", value));
}

/// Show or hide every recipe item and every `recipe-block` in the page.
/// Returns how many recipe items are shown.
pub fn apply_visibility(doc: &mut Document, visible: &BTreeSet<String>) -> usize {
    let mut shown = 0;
    for link in doc.elements_with_attr(RECIPE_ID_ATTR) {
        let is_visible = doc
            .attr(link, RECIPE_ID_ATTR)
            .is_some_and(|id| visible.contains(id));
        let item = doc
            .closest(link, |d, n| d.tag(n) == Some("li"))
            .unwrap_or(link);
        set_display(doc, item, if is_visible { "list-item" } else { "none" });
        if is_visible {
            shown += 1;
        }
    }

    for block in doc.elements_with_class(doc.root(), "recipe-block") {
        let any_visible = doc.elements(block).into_iter().any(|node| {
            doc.attr(node, RECIPE_ID_ATTR)
                .is_some_and(|id| visible.contains(id))
        });
        set_display(doc, block, if any_visible { "block" } else { "none" });
    }

    debug!("{} recipes visible", shown);
    shown
}

/// Mark the filter buttons that match the state as `active`
pub fn sync_buttons(doc: &mut Document, state: &FilterState) {
    for button in doc.elements_with_attr(FILTER_ATTR) {
        let active = match (doc.attr(button, FILTER_TYPE_ATTR), doc.attr(button, FILTER_ATTR)) {
            (Some("dietary"), Some(tag)) => state.active_dietary_tags.contains(tag),
            (_, Some(tag)) => state.active_dish_tags.contains(tag),
            _ => false,
        };
        if active {
            doc.add_class(button, "active");
        } else {
            doc.remove_class(button, "active");
        }
    }
}
