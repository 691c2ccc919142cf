//! Same-document links between semantically equivalent offsets.
//!
//! A linked map has no source/generated direction: both sides of every
//! mapping live in one document, and a query from either side yields the
//! other. Whether an offset links to itself is up to the mappings.

use std::fmt;

use super::capabilities::accept_all;
use super::source_map::{Mapper, Mapping, SourceMap};

pub trait LinkedMap: fmt::Debug + Send + Sync {
    fn linked_offsets<'a>(&'a self, offset: usize) -> Box<dyn Iterator<Item = usize> + 'a>;
}

/// A `SourceMap` read in both directions.
#[derive(Debug, Clone, Default)]
pub struct LinkedCodeMap {
    inner: SourceMap,
}

impl LinkedCodeMap {
    pub fn new(mappings: Vec<Mapping>) -> Self {
        Self {
            inner: SourceMap::new(mappings),
        }
    }
}

impl LinkedMap for LinkedCodeMap {
    fn linked_offsets<'a>(&'a self, offset: usize) -> Box<dyn Iterator<Item = usize> + 'a> {
        let forward = self.inner.to_generated_location(offset, &accept_all);
        let backward = self.inner.to_source_location(offset, &accept_all);
        Box::new(forward.chain(backward).map(|mapped| mapped.offset))
    }
}
