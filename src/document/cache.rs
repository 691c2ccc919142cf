//! Snapshot-keyed cache of text buffers.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::text::{Snapshot, TextBuffer};

/// Thread-safe cache turning `(uri, language id, snapshot)` into a `TextBuffer`.
///
/// A cached buffer is reused while its language id and snapshot are
/// unchanged; any change produces a fresh buffer with the next version.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: DashMap<Url, Arc<TextBuffer>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    pub fn get(&self, uri: &Url, language_id: &str, snapshot: &Snapshot) -> Arc<TextBuffer> {
        let mut entry = self
            .documents
            .entry(uri.clone())
            .or_insert_with(|| {
                Arc::new(TextBuffer::new(uri.clone(), language_id, 0, snapshot.clone()))
            });

        let cached = entry.value();
        if cached.language_id() != language_id || !Arc::ptr_eq(cached.snapshot(), snapshot) {
            let version = cached.version() + 1;
            *entry.value_mut() = Arc::new(TextBuffer::new(
                uri.clone(),
                language_id,
                version,
                snapshot.clone(),
            ));
        }

        Arc::clone(entry.value())
    }

    pub fn remove(&self, uri: &Url) {
        self.documents.remove(uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_snapshot_reuses_buffer() {
        let cache = DocumentCache::new();
        let uri = Url::parse("file:///a.txt").unwrap();
        let snapshot: Snapshot = Arc::from("hello");

        let first = cache.get(&uri, "plaintext", &snapshot);
        let second = cache.get(&uri, "plaintext", &snapshot);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.version(), 0);
    }

    #[test]
    fn new_snapshot_bumps_version() {
        let cache = DocumentCache::new();
        let uri = Url::parse("file:///a.txt").unwrap();

        let first = cache.get(&uri, "plaintext", &Arc::from("hello"));
        // Equal content in a different allocation is a different snapshot.
        let second = cache.get(&uri, "plaintext", &Arc::from("hello"));
        assert_eq!(first.version(), 0);
        assert_eq!(second.version(), 1);

        let third = cache.get(&uri, "markdown", second.snapshot());
        assert_eq!(third.version(), 2);
        assert_eq!(third.language_id(), "markdown");
    }

    #[test]
    fn removed_document_restarts_at_zero() {
        let cache = DocumentCache::new();
        let uri = Url::parse("file:///a.txt").unwrap();
        cache.get(&uri, "plaintext", &Arc::from("a"));
        cache.get(&uri, "plaintext", &Arc::from("b"));
        cache.remove(&uri);
        assert_eq!(cache.get(&uri, "plaintext", &Arc::from("c")).version(), 0);
    }
}
