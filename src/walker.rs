//! Traversal of a source script's tree of generated documents.

use std::sync::Arc;

use tower_lsp::lsp_types::Url;
use tracing::trace;

use crate::dispatch::{Disabled, FeatureContext};
use crate::document::{encode_embedded_uri, SourceScript, VirtualCode};
use crate::projection::DocumentsAndMap;

/// Post-order traversal: every descendant before its ancestor, children in
/// declared order.
#[derive(Debug, Clone)]
pub struct PostOrder<'a> {
    /// Nodes on the current path with the index of their next unvisited child.
    stack: Vec<(&'a Arc<VirtualCode>, usize)>,
}

impl<'a> PostOrder<'a> {
    pub fn new(root: &'a Arc<VirtualCode>) -> Self {
        Self {
            stack: vec![(root, 0)],
        }
    }
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = &'a Arc<VirtualCode>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let code: &'a Arc<VirtualCode> = top.0;
            match code.embedded.get(top.1) {
                Some(child) => {
                    top.1 += 1;
                    self.stack.push((child, 0));
                }
                None => {
                    self.stack.pop();
                    return Some(code);
                }
            }
        }
    }
}

/// Every enabled generated document under `root`, deepest first, paired with
/// the script's source buffer and the document's map.
///
/// A disabled document is skipped on its own; its descendants are still
/// offered unless they are disabled too.
pub fn embedded_documents<'a>(
    context: FeatureContext<'a>,
    script: &'a SourceScript,
    root: &'a Arc<VirtualCode>,
) -> impl Iterator<Item = DocumentsAndMap> + 'a {
    let source = context
        .documents
        .get(&script.uri, &script.language_id, &script.snapshot);

    PostOrder::new(root).filter_map(move |code| {
        let uri = encode_embedded_uri(&script.uri, &code.id);
        if context.disabled.is_embedded_disabled(&uri) {
            trace!(uri = %uri, "embedded document disabled");
            return None;
        }
        let generated = context.documents.get(&uri, &code.language_id, &code.snapshot);
        Some(DocumentsAndMap::new(
            Arc::clone(&source),
            generated,
            Arc::clone(&code.mappings),
        ))
    })
}

/// Breadth-wise view of a tree: level 0 is the root, level `n` the enabled
/// children of every node in level `n - 1`.
///
/// Levels are computed on first request and kept for later requests.
#[derive(Debug)]
pub struct EmbeddedLevels<'a> {
    source_uri: &'a Url,
    disabled: &'a Disabled,
    levels: Vec<Vec<&'a Arc<VirtualCode>>>,
}

impl<'a> EmbeddedLevels<'a> {
    pub fn new(
        script: &'a SourceScript,
        root: &'a Arc<VirtualCode>,
        disabled: &'a Disabled,
    ) -> Self {
        Self {
            source_uri: &script.uri,
            disabled,
            levels: vec![vec![root]],
        }
    }

    pub fn level(&mut self, index: usize) -> &[&'a Arc<VirtualCode>] {
        while self.levels.len() <= index {
            let next = self.next_level();
            self.levels.push(next);
        }
        &self.levels[index]
    }

    /// Number of levels computed so far.
    pub fn computed(&self) -> usize {
        self.levels.len()
    }

    fn next_level(&self) -> Vec<&'a Arc<VirtualCode>> {
        let Some(last) = self.levels.last() else {
            return Vec::new();
        };
        last.iter()
            .flat_map(|code| code.embedded.iter())
            .filter(|child| {
                let uri = encode_embedded_uri(self.source_uri, &child.id);
                !self.disabled.is_embedded_disabled(&uri)
            })
            .collect()
    }
}
