//! Minimal mutable document tree.
//!
//! Pages are assembled, translated and filtered in this tree before they are
//! serialised to HTML. Elements carry the attribute vocabulary the renderer,
//! the filter and the language menu share (`data-recipe-id`, `data-filter`,
//! `data-lang`, `data-translated`, ...).

use std::collections::BTreeMap;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

const VOID_ELEMENTS: &[&str] = &["meta", "link", "input", "img", "br", "hr"];

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observer: Option<UnboundedSender<NodeId>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document whose root is an empty `html` element
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element {
                tag: "html".to_string(),
                attributes: BTreeMap::new(),
            },
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            observer: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Subscribe to element insertions. Every element appended under a
    /// parent connected to the root is sent once; its descendants are not
    /// reported separately. A later call replaces the earlier subscriber.
    pub fn observe(&mut self) -> UnboundedReceiver<NodeId> {
        let (tx, rx) = unbounded_channel();
        self.observer = Some(tx);
        rx
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_lowercase(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Move `child` to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);

        if self.is_element(child) && self.is_connected(parent) {
            if let Some(observer) = &self.observer {
                if observer.send(child).is_err() {
                    self.observer = None;
                }
            }
        }
    }

    /// Convenience: create an element, optionally with text, and append it
    pub fn append_element(&mut self, parent: NodeId, tag: &str, text: Option<&str>) -> NodeId {
        let element = self.create_element(tag);
        if let Some(text) = text {
            let text = self.create_text(text);
            self.append_child(element, text);
        }
        self.append_child(parent, element);
        element
    }

    /// Remove `node` from its parent; the subtree stays usable
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element { .. })
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == self.root)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Option<String> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes.remove(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let classes = match self.attr(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", &classes);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(existing) = self.attr(node, "class") else {
            return;
        };
        let remaining: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        let remaining = remaining.join(" ");
        if remaining.is_empty() {
            self.remove_attr(node, "class");
        } else {
            self.set_attr(node, "class", &remaining);
        }
    }

    /// Concatenated text of the node and all its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => self.nodes[node.0]
                .children
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
        }
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(existing) = &mut self.nodes[node.0].kind {
            *existing = text.to_string();
            return;
        }
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text = self.create_text(text);
        self.nodes[text.0].parent = Some(node);
        self.nodes[node.0].children.push(text);
    }

    pub fn has_element_children(&self, node: NodeId) -> bool {
        self.nodes[node.0].children.iter().any(|c| self.is_element(*c))
    }

    /// The node itself followed by its ancestors up to the root
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |n| self.nodes[n.0].parent)
    }

    /// Nearest inclusive ancestor matching `predicate`
    pub fn closest<F>(&self, node: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.ancestors(node).find(|n| predicate(self, *n))
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// Element nodes of the subtree rooted at `node`, in document order,
    /// including `node` itself when it is an element
    pub fn elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.is_element(current) {
                found.push(current);
            }
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        found
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements(self.root).into_iter().find(|n| self.attr(*n, "id") == Some(id))
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.elements(self.root).into_iter().find(|n| self.tag(*n) == Some(tag))
    }

    pub fn elements_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.elements(self.root).into_iter().filter(|n| self.has_attr(*n, name)).collect()
    }

    pub fn elements_with_class(&self, within: NodeId, class: &str) -> Vec<NodeId> {
        self.elements(within).into_iter().filter(|n| self.has_class(*n, class)).collect()
    }

    /// Serialise the whole document, with a doctype
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        self.write_node(self.root, &mut out);
        out.push('\n');
        out
    }

    /// Serialise a single subtree
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &self.nodes[node.0].children {
                    self.write_node(*child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
