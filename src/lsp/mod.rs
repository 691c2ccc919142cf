//! LSP feature implementations built on the dispatcher.
//!
//! This module provides:
//! - Hover, merged across every plugin and generated document
//! - Auto-insertion, answered by the first plugin with a suggestion
//! - Folding ranges, collected from every generated document with structure

mod auto_insert;
mod folding_range;
mod hover;

pub use auto_insert::{auto_insert, AutoInsertChange, AutoInsertEdit};
pub use folding_range::folding_ranges;
pub use hover::hover;
