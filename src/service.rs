//! The host-facing service: documents, plugins and the disabled set.

use std::sync::{Arc, PoisonError, RwLock};

use tower_lsp::lsp_types::{FoldingRange, Hover, Position, Url};
use tracing::{debug, warn};

use crate::dispatch::{CancellationToken, Disabled, FeatureContext, PluginEntry};
use crate::document::{
    decode_embedded_uri, encode_embedded_uri, DocumentCache, LanguagePlugin, ScriptRegistry,
    Snapshot, SourceScript,
};
use crate::linked::linked_positions_of;
use crate::lsp::{self, AutoInsertChange, AutoInsertEdit};
use crate::settings::Settings;
use crate::walker::PostOrder;

/// Owns everything a feature request reads.
///
/// The disabled set is replaced as a whole; a request in flight keeps the
/// snapshot it started with.
#[derive(Debug)]
pub struct LanguageService {
    scripts: ScriptRegistry,
    documents: DocumentCache,
    plugins: Vec<PluginEntry>,
    disabled: RwLock<Arc<Disabled>>,
}

impl LanguageService {
    pub fn new(languages: Vec<Arc<dyn LanguagePlugin>>, plugins: Vec<PluginEntry>) -> Self {
        Self {
            scripts: ScriptRegistry::new(languages),
            documents: DocumentCache::new(),
            plugins,
            disabled: RwLock::new(Arc::new(Disabled::default())),
        }
    }

    pub fn plugins(&self) -> &[PluginEntry] {
        &self.plugins
    }

    pub fn disabled(&self) -> Arc<Disabled> {
        let guard = self.disabled.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    pub fn set_disabled(&self, disabled: Disabled) {
        let mut guard = self.disabled.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(disabled);
    }

    /// Disable every plugin registered under `name`. Returns false when no
    /// plugin has that name.
    pub fn disable_plugin_by_name(&self, name: &str) -> bool {
        let keys: Vec<_> = self
            .plugins
            .iter()
            .filter(|entry| entry.name() == name)
            .map(PluginEntry::key)
            .collect();
        if keys.is_empty() {
            warn!(plugin = %name, "cannot disable unknown plugin");
            return false;
        }

        let mut disabled = (*self.disabled()).clone();
        disabled.plugins.extend(keys);
        self.set_disabled(disabled);
        debug!(plugin = %name, "plugin disabled");
        true
    }

    pub fn apply_settings(&self, settings: &Settings) {
        self.set_disabled(settings.disabled(&self.plugins));
    }

    pub fn update(
        &self,
        uri: Url,
        snapshot: Snapshot,
        language_id: Option<&str>,
    ) -> Arc<SourceScript> {
        self.scripts.set(uri, snapshot, language_id)
    }

    /// Forget `uri` together with the buffers of its generated documents.
    pub fn close(&self, uri: &Url) {
        if let Some(root) = self.scripts.get(uri).and_then(|script| script.generated.clone()) {
            for code in PostOrder::new(&root) {
                self.documents.remove(&encode_embedded_uri(uri, &code.id));
            }
        }
        self.scripts.delete(uri);
        self.documents.remove(uri);
    }

    pub fn script(&self, uri: &Url) -> Option<Arc<SourceScript>> {
        self.scripts.get(uri)
    }

    pub async fn hover(
        &self,
        uri: &Url,
        position: Position,
        token: &CancellationToken,
    ) -> Option<Hover> {
        let disabled = self.disabled();
        lsp::hover(self.context(&disabled), uri, position, token).await
    }

    pub async fn auto_insert(
        &self,
        uri: &Url,
        position: Position,
        last_change: &AutoInsertChange,
        token: &CancellationToken,
    ) -> Option<AutoInsertEdit> {
        let disabled = self.disabled();
        lsp::auto_insert(self.context(&disabled), uri, position, last_change, token).await
    }

    pub async fn folding_ranges(
        &self,
        uri: &Url,
        token: &CancellationToken,
    ) -> Option<Vec<FoldingRange>> {
        let disabled = self.disabled();
        lsp::folding_ranges(self.context(&disabled), uri, token).await
    }

    /// Positions linked to `position` inside the generated document `uri`.
    ///
    /// Empty when `uri` is not an embedded document or the document carries
    /// no linked map.
    pub fn linked_positions(&self, uri: &Url, position: Position) -> Vec<Position> {
        let Some((source_uri, id)) = decode_embedded_uri(uri) else {
            return Vec::new();
        };
        let Some(script) = self.scripts.get(&source_uri) else {
            return Vec::new();
        };
        let Some(root) = &script.generated else {
            return Vec::new();
        };
        let Some(code) = PostOrder::new(root).find(|code| code.id == id) else {
            return Vec::new();
        };
        let Some(linked) = &code.linked else {
            return Vec::new();
        };

        let buffer = self.documents.get(uri, &code.language_id, &code.snapshot);
        linked_positions_of(&buffer, &**linked, position).collect()
    }

    fn context<'a>(&'a self, disabled: &'a Disabled) -> FeatureContext<'a> {
        FeatureContext {
            scripts: &self.scripts,
            documents: &self.documents,
            plugins: &self.plugins,
            disabled,
        }
    }
}
