//! Feature dispatch over source documents and their generated documents.
//!
//! A feature request names a source document. The dispatcher walks the
//! document's tree of generated documents (deepest first), projects the
//! request into each one, asks every enabled plugin in registration order,
//! and projects accepted answers back into source coordinates.

mod cancellation;
mod context;
mod plugin;
mod worker;

pub use cancellation::CancellationToken;
pub use context::{Disabled, FeatureContext};
pub use plugin::{
    AutoInsertProvider, FoldingRangeProvider, HoverProvider, PluginDescriptor, PluginEntry,
    PluginKey, ServicePlugin,
};
pub use worker::{document_feature_worker, language_feature_worker};
