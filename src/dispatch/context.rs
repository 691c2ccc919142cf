use std::collections::HashSet;

use tower_lsp::lsp_types::Url;

use super::plugin::{PluginEntry, PluginKey};
use crate::document::{DocumentCache, ScriptRegistry};

/// Host-controlled disablement, read-only for the duration of a dispatch.
#[derive(Debug, Clone, Default)]
pub struct Disabled {
    pub plugins: HashSet<PluginKey>,
    /// Encoded embedded document identities (see `encode_embedded_uri`).
    pub embedded: HashSet<Url>,
}

impl Disabled {
    pub fn is_plugin_disabled(&self, entry: &PluginEntry) -> bool {
        self.plugins.contains(&entry.key())
    }

    pub fn is_embedded_disabled(&self, uri: &Url) -> bool {
        self.embedded.contains(uri)
    }
}

/// Everything a single dispatch call reads.
#[derive(Debug, Clone, Copy)]
pub struct FeatureContext<'a> {
    pub scripts: &'a ScriptRegistry,
    pub documents: &'a DocumentCache,
    pub plugins: &'a [PluginEntry],
    pub disabled: &'a Disabled,
}
