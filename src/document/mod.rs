//! Document state management and text utilities.
//!
//! This module provides:
//! - `TextBuffer` for UTF-16 aware offset <-> LSP position conversion
//! - `DocumentCache` for snapshot-keyed buffers
//! - `SourceScript`, `VirtualCode` and `ScriptRegistry` for authored documents
//!   and the generated documents compiled from them

mod cache;
mod script;
mod text;

pub use cache::DocumentCache;
pub use script::{
    decode_embedded_uri, encode_embedded_uri, LanguagePlugin, ScriptRegistry, SourceScript,
    VirtualCode,
};
pub use text::{Snapshot, TextBuffer};
