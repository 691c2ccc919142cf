//! Source scripts and their trees of generated (virtual) documents.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;
use tracing::debug;

use super::text::Snapshot;
use crate::mapping::{LinkedMap, Mapper};

const EMBEDDED_FRAGMENT_PREFIX: &str = "embedded=";

/// A generated document produced from a source document by a language plugin.
///
/// `mappings` relate this node's offsets to the root source script, never
/// to the parent node. Children are held through `Arc` and built before
/// their parent, so a tree cannot contain itself.
#[derive(Debug, Clone)]
pub struct VirtualCode {
    pub id: String,
    pub language_id: String,
    pub snapshot: Snapshot,
    pub mappings: Arc<dyn Mapper>,
    pub linked: Option<Arc<dyn LinkedMap>>,
    pub embedded: Vec<Arc<VirtualCode>>,
}

impl VirtualCode {
    pub fn new(
        id: impl Into<String>,
        language_id: impl Into<String>,
        snapshot: Snapshot,
        mappings: impl Mapper + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            language_id: language_id.into(),
            snapshot,
            mappings: Arc::new(mappings),
            linked: None,
            embedded: Vec::new(),
        }
    }

    pub fn with_embedded(mut self, embedded: impl IntoIterator<Item = VirtualCode>) -> Self {
        self.embedded.extend(embedded.into_iter().map(Arc::new));
        self
    }

    pub fn with_linked(mut self, linked: impl LinkedMap + 'static) -> Self {
        self.linked = Some(Arc::new(linked));
        self
    }
}

/// An authored document, optionally compiled into a tree of virtual codes.
#[derive(Debug)]
pub struct SourceScript {
    pub uri: Url,
    pub language_id: String,
    pub snapshot: Snapshot,
    pub generated: Option<Arc<VirtualCode>>,
}

/// The upstream compiler seam: turns authored documents into virtual code trees.
pub trait LanguagePlugin: Send + Sync {
    /// Language id for a document opened without one.
    fn language_id_of(&self, _uri: &Url) -> Option<String> {
        None
    }

    fn create_virtual_code(
        &self,
        uri: &Url,
        language_id: &str,
        snapshot: &Snapshot,
    ) -> Option<VirtualCode>;
}

/// Thread-safe storage for source scripts.
#[derive(Default)]
pub struct ScriptRegistry {
    languages: Vec<Arc<dyn LanguagePlugin>>,
    scripts: DashMap<Url, Arc<SourceScript>>,
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("languages", &self.languages.len())
            .field("scripts", &self.scripts.len())
            .finish()
    }
}

impl ScriptRegistry {
    pub fn new(languages: Vec<Arc<dyn LanguagePlugin>>) -> Self {
        Self {
            languages,
            scripts: DashMap::new(),
        }
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<SourceScript>> {
        self.scripts.get(uri).map(|r| Arc::clone(&r))
    }

    /// Register or update a script.
    ///
    /// The script is recompiled only when its snapshot or language changed.
    /// The first language plugin producing a virtual code owns the script.
    pub fn set(
        &self,
        uri: Url,
        snapshot: Snapshot,
        language_id: Option<&str>,
    ) -> Arc<SourceScript> {
        let language_id = language_id
            .map(str::to_string)
            .or_else(|| self.languages.iter().find_map(|l| l.language_id_of(&uri)))
            .unwrap_or_else(|| "plaintext".to_string());

        if let Some(existing) = self.get(&uri) {
            if existing.language_id == language_id && Arc::ptr_eq(&existing.snapshot, &snapshot) {
                return existing;
            }
        }

        let generated = self
            .languages
            .iter()
            .find_map(|l| l.create_virtual_code(&uri, &language_id, &snapshot))
            .map(Arc::new);
        debug!(
            uri = %uri,
            language_id = %language_id,
            generated = generated.is_some(),
            "source script updated"
        );

        let script = Arc::new(SourceScript {
            uri: uri.clone(),
            language_id,
            snapshot,
            generated,
        });
        self.scripts.insert(uri, Arc::clone(&script));
        script
    }

    pub fn delete(&self, uri: &Url) {
        self.scripts.remove(uri);
    }
}

/// Canonical identity of an embedded document: the source URI with an
/// `embedded=<id>` fragment.
pub fn encode_embedded_uri(source_uri: &Url, embedded_id: &str) -> Url {
    let mut uri = source_uri.clone();
    uri.set_fragment(Some(&format!("{EMBEDDED_FRAGMENT_PREFIX}{embedded_id}")));
    uri
}

/// Split an embedded document identity back into its source URI and code id.
pub fn decode_embedded_uri(uri: &Url) -> Option<(Url, String)> {
    let id = uri.fragment()?.strip_prefix(EMBEDDED_FRAGMENT_PREFIX)?.to_string();
    let mut source = uri.clone();
    source.set_fragment(None);
    Some((source, id))
}
