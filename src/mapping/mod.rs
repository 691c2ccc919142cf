//! Offset mapping between source and generated documents.
//!
//! This module provides:
//! - `CodeInformation` capability flags and the per-feature filters over them
//! - the `Mapper` oracle trait with its segment-based `SourceMap` implementation
//! - `LinkedMap` / `LinkedCodeMap` for same-document equivalence links

mod capabilities;
mod linked;
mod source_map;

pub use capabilities::{
    accept_all, is_auto_insert_enabled, is_completion_enabled, is_diagnostics_enabled,
    is_folding_ranges_enabled, is_formatting_enabled, is_hover_enabled, is_rename_enabled,
    CodeInformation, Filter,
};
pub use linked::{LinkedCodeMap, LinkedMap};
pub use source_map::{MappedOffset, MappedRange, Mapper, Mapping, SourceMap};
