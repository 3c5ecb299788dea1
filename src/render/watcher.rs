use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::dom::{Document, NodeId};
use super::Renderer;

/// Hands elements inserted into a document back to the renderer.
///
/// Insertions queue up as they happen; `flush` translates everything queued
/// so far in insertion order. Dropping the watcher stops the subscription.
pub struct MutationWatcher {
    receiver: UnboundedReceiver<NodeId>,
}

impl MutationWatcher {
    pub fn attach(doc: &mut Document) -> Self {
        Self {
            receiver: doc.observe(),
        }
    }

    /// Elements inserted since the last call
    pub fn take_pending(&mut self) -> Vec<NodeId> {
        let mut pending = Vec::new();
        while let Ok(node) = self.receiver.try_recv() {
            pending.push(node);
        }
        pending
    }

    /// Translate every pending insertion. Returns how many elements were rewritten.
    pub async fn flush(&mut self, doc: &mut Document, renderer: &Renderer) -> usize {
        let mut rewritten = 0;
        loop {
            let pending = self.take_pending();
            if pending.is_empty() {
                break;
            }
            debug!("Rendering {} inserted subtrees", pending.len());
            for node in pending {
                // Skip nodes that were detached again before we got to them
                if doc.is_connected(node) {
                    rewritten += renderer.on_node_added(doc, node).await;
                }
            }
        }
        rewritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::render::TRANSLATED_ATTR;
    use crate::translate::{Dictionary, OfflineGateway, TranslationStore};

    #[tokio::test]
    async fn test_inserted_subtree_is_translated() {
        let store = TranslationStore::new("en", Dictionary::embedded(), Arc::new(OfflineGateway));
        let renderer = Renderer::new(Arc::new(store), "de");

        let mut doc = Document::new();
        let mut watcher = MutationWatcher::attach(&mut doc);
        let body = doc.append_element(doc.root(), "body", None);

        let block = doc.create_element("div");
        let heading = doc.append_element(block, "h2", Some("Soups"));
        let list = doc.append_element(block, "ul", None);
        let item = doc.append_element(list, "li", Some("Lentils Soup"));
        doc.append_child(body, block);

        assert_eq!(watcher.flush(&mut doc, &renderer).await, 2);
        assert_eq!(doc.text_content(heading), "Suppen");
        assert_eq!(doc.text_content(item), "Linsensuppe");
        assert!(doc.has_attr(item, TRANSLATED_ATTR));
        assert!(watcher.take_pending().is_empty());
    }

    #[tokio::test]
    async fn test_detached_insertions_are_skipped() {
        let store = TranslationStore::new("en", Dictionary::embedded(), Arc::new(OfflineGateway));
        let renderer = Renderer::new(Arc::new(store), "de");

        let mut doc = Document::new();
        let mut watcher = MutationWatcher::attach(&mut doc);
        let heading = doc.append_element(doc.root(), "h2", Some("Soups"));
        doc.detach(heading);

        assert_eq!(watcher.flush(&mut doc, &renderer).await, 0);
        assert_eq!(doc.text_content(heading), "Soups");
    }
}
