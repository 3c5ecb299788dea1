use crate::content::{ContentModel, RecipeRecord, ALL_FILTER};
use crate::dom::{Document, NodeId};
use super::{apply_labels, I18N_ATTR};

/// Handles into an index page built by [`build_index`]
pub struct IndexPage {
    pub document: Document,
    pub body: NodeId,
    /// Element the recipe sections are appended to
    pub recipes_container: NodeId,
}

fn labelled(doc: &mut Document, parent: NodeId, tag: &str, key: &str, fallback: &str) -> NodeId {
    let element = doc.append_element(parent, tag, Some(fallback));
    doc.set_attr(element, I18N_ATTR, key);
    element
}

fn filter_button(doc: &mut Document, parent: NodeId, filter: &str, kind: &str, label: &str) -> NodeId {
    let button = doc.append_element(parent, "button", Some(label));
    doc.add_class(button, "filter-btn");
    doc.set_attr(button, "data-filter", filter);
    doc.set_attr(button, "data-type", kind);
    button
}

/// Page skeleton: header, search bar and filter buttons. Recipe sections
/// are added separately by [`append_recipe_sections`].
pub fn build_index(model: &ContentModel, language: &str) -> IndexPage {
    let mut doc = Document::new();
    let root = doc.root();
    doc.set_attr(root, "lang", language);

    let head = doc.append_element(root, "head", None);
    let meta = doc.append_element(head, "meta", None);
    doc.set_attr(meta, "charset", "utf-8");
    doc.append_element(head, "title", Some(&model.ui.title));

    let body = doc.append_element(root, "body", None);
    let header = doc.append_element(body, "header", None);
    let container = doc.append_element(header, "div", None);
    doc.add_class(container, "container");
    labelled(&mut doc, container, "h1", "my_recipe_journal", "My Recipe Journal");

    let filter_bar = doc.append_element(body, "div", None);
    doc.add_class(filter_bar, "filter-bar");

    let search = doc.append_element(filter_bar, "input", None);
    doc.set_attr(search, "id", "search-bar");
    doc.set_attr(search, "type", "text");
    doc.set_attr(search, I18N_ATTR, "search_placeholder");
    doc.set_attr(search, "placeholder", "Search recipes...");

    labelled(&mut doc, filter_bar, "h3", "dish_types", "Dish Types");
    let dish_buttons = doc.append_element(filter_bar, "div", None);
    doc.add_class(dish_buttons, "filter-buttons");
    let all_label = model
        .ui
        .categories
        .get(ALL_FILTER)
        .map(String::as_str)
        .unwrap_or("All Recipes");
    let all = filter_button(&mut doc, dish_buttons, ALL_FILTER, "dish", all_label);
    doc.add_class(all, "active");
    for (id, label, _) in model.sections() {
        filter_button(&mut doc, dish_buttons, id, "dish", label);
    }

    if !model.ui.dietary_filters.is_empty() {
        labelled(&mut doc, filter_bar, "h3", "dietary_options", "Dietary Options");
        let dietary_buttons = doc.append_element(filter_bar, "div", None);
        doc.add_class(dietary_buttons, "filter-buttons");
        for (id, label) in &model.ui.dietary_filters {
            filter_button(&mut doc, dietary_buttons, id, "dietary", label);
        }
    }

    let recipes_container = doc.append_element(body, "main", None);
    doc.add_class(recipes_container, "recipes-container");

    apply_labels(&mut doc, &model.ui);

    IndexPage {
        document: doc,
        body,
        recipes_container,
    }
}

/// Link target of a recipe's detail page, relative to the index
pub fn recipe_href(recipe: &RecipeRecord) -> String {
    format!("recipes/{}.html", recipe.id)
}

/// Build one `recipe-block` per section that has recipes and insert them
/// into `container` in a single append.
pub fn append_recipe_sections(doc: &mut Document, container: NodeId, model: &ContentModel) -> NodeId {
    let list = doc.create_element("div");
    doc.add_class(list, "recipe-sections");

    for (id, label, recipes) in model.sections() {
        if recipes.is_empty() {
            continue;
        }

        let block = doc.append_element(list, "div", None);
        doc.add_class(block, "recipe-block");
        doc.set_attr(block, "id", &format!("{}-block", id));
        doc.set_attr(block, "data-category", id);
        doc.append_element(block, "h2", Some(label));

        let ul = doc.append_element(block, "ul", None);
        doc.set_attr(ul, "id", &format!("{}-list", id));
        for recipe in recipes {
            let li = doc.append_element(ul, "li", None);
            let link = doc.append_element(li, "a", Some(&recipe.title));
            doc.set_attr(link, "href", &recipe_href(recipe));
            doc.set_attr(link, "data-category", id);
            doc.set_attr(link, "data-recipe-id", &recipe.id);
        }
    }

    doc.append_child(container, list);
    list
}

/// Replace the text of the page's `<title>`. Returns false when the page
/// has none.
pub fn set_head_title(doc: &mut Document, text: &str) -> bool {
    let title = doc
        .elements(doc.root())
        .into_iter()
        .find(|node| doc.tag(*node) == Some("title"));
    match title {
        Some(node) => {
            doc.set_text_content(node, text);
            true
        }
        None => false,
    }
}

/// Detail page for one recipe. Headings carry `data-i18n` keys so a
/// document's own labels can replace them.
pub fn build_recipe_page(recipe: &RecipeRecord, site_title: &str, language: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    doc.set_attr(root, "lang", language);

    let head = doc.append_element(root, "head", None);
    let meta = doc.append_element(head, "meta", None);
    doc.set_attr(meta, "charset", "utf-8");
    doc.append_element(head, "title", Some(&format!("{} - {}", recipe.title, site_title)));

    let body = doc.append_element(root, "body", None);
    let header = doc.append_element(body, "header", None);
    let container = doc.append_element(header, "div", None);
    doc.add_class(container, "container");
    let back = labelled(&mut doc, container, "a", "back_to_recipes", "← Back to Recipes");
    doc.set_attr(back, "href", "../index.html");

    let article = doc.append_element(body, "article", None);
    doc.set_attr(article, "data-recipe-id", &recipe.id);
    doc.append_element(article, "h1", Some(&recipe.title));

    if let Some(image) = &recipe.image {
        let img = doc.append_element(article, "img", None);
        doc.set_attr(img, "src", &format!("../images/{}", image));
        doc.set_attr(img, "alt", &recipe.title);
    }
    if !recipe.description.is_empty() {
        let description = doc.append_element(article, "p", Some(&recipe.description));
        doc.add_class(description, "description");
    }

    if !recipe.ingredients.is_empty() {
        labelled(&mut doc, article, "h2", "ingredients", "Ingredients");
        let list = doc.append_element(article, "ul", None);
        for ingredient in &recipe.ingredients {
            doc.append_element(list, "li", Some(ingredient));
        }
    }
    if !recipe.instructions.is_empty() {
        labelled(&mut doc, article, "h2", "instructions", "Instructions");
        let list = doc.append_element(article, "ol", None);
        for step in &recipe.instructions {
            doc.append_element(list, "li", Some(step));
        }
    }

    doc
}
