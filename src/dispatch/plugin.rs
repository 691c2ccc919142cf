//! Service plugins and the feature capabilities they may expose.
//!
//! A plugin only implements the capabilities it supports. Each capability is
//! reached through an accessor on `ServicePlugin` that returns `None` by
//! default, so a missing capability is an ordinary "no answer".

use std::fmt;
use std::sync::Arc;

use tower_lsp::lsp_types::{FoldingRange, Hover, Position};

use super::cancellation::CancellationToken;
use crate::document::TextBuffer;
use crate::error::PluginResult;
use crate::lsp::{AutoInsertChange, AutoInsertEdit};

#[tower_lsp::async_trait]
pub trait HoverProvider: Send + Sync {
    async fn provide_hover(
        &self,
        document: &TextBuffer,
        position: Position,
        token: &CancellationToken,
    ) -> PluginResult<Option<Hover>>;
}

#[tower_lsp::async_trait]
pub trait AutoInsertProvider: Send + Sync {
    async fn provide_auto_insert(
        &self,
        document: &TextBuffer,
        position: Position,
        last_change: &AutoInsertChange,
        token: &CancellationToken,
    ) -> PluginResult<Option<AutoInsertEdit>>;
}

#[tower_lsp::async_trait]
pub trait FoldingRangeProvider: Send + Sync {
    async fn provide_folding_ranges(
        &self,
        document: &TextBuffer,
        token: &CancellationToken,
    ) -> PluginResult<Option<Vec<FoldingRange>>>;
}

pub trait ServicePlugin: Send + Sync {
    fn hover_provider(&self) -> Option<&dyn HoverProvider> {
        None
    }

    fn auto_insert_provider(&self) -> Option<&dyn AutoInsertProvider> {
        None
    }

    fn folding_range_provider(&self) -> Option<&dyn FoldingRangeProvider> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: String,
}

/// Identity of a plugin instance, used as the disabled-set key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginKey(usize);

impl PluginKey {
    pub fn of(instance: &Arc<dyn ServicePlugin>) -> Self {
        Self(Arc::as_ptr(instance) as *const () as usize)
    }
}

/// A registered plugin: what it is called and the instance answering requests.
#[derive(Clone)]
pub struct PluginEntry {
    pub descriptor: PluginDescriptor,
    pub instance: Arc<dyn ServicePlugin>,
}

impl PluginEntry {
    pub fn new(name: impl Into<String>, instance: impl ServicePlugin + 'static) -> Self {
        Self {
            descriptor: PluginDescriptor { name: name.into() },
            instance: Arc::new(instance),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn key(&self) -> PluginKey {
        PluginKey::of(&self.instance)
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("descriptor", &self.descriptor)
            .field("key", &self.key())
            .finish()
    }
}
