//! Position and range projection between a source document and one of its
//! generated documents.

use std::sync::Arc;

use tower_lsp::lsp_types::{Position, Range};

use crate::document::TextBuffer;
use crate::mapping::{Filter, Mapper};

/// A source buffer, one generated buffer and the map relating them.
///
/// This is the unit of context every dispatch step receives for a generated
/// document. All queries are computed afresh on every call.
#[derive(Debug, Clone)]
pub struct DocumentsAndMap {
    pub source: Arc<TextBuffer>,
    pub generated: Arc<TextBuffer>,
    pub map: Arc<dyn Mapper>,
}

impl DocumentsAndMap {
    pub fn new(source: Arc<TextBuffer>, generated: Arc<TextBuffer>, map: Arc<dyn Mapper>) -> Self {
        Self {
            source,
            generated,
            map,
        }
    }

    /// Source ranges corresponding to a range of the generated document.
    pub fn source_ranges_of<'a>(
        &'a self,
        range: Range,
        filter: Filter<'a>,
    ) -> impl Iterator<Item = Range> + 'a {
        let (start, end) = self.generated.offsets_of(range);
        self.map
            .to_source_range(start, end, true, filter)
            .map(move |mapped| self.source.range_at(mapped.start, mapped.end))
    }

    /// Generated ranges corresponding to a range of the source document.
    pub fn generated_ranges_of<'a>(
        &'a self,
        range: Range,
        filter: Filter<'a>,
    ) -> impl Iterator<Item = Range> + 'a {
        let (start, end) = self.source.offsets_of(range);
        self.map
            .to_generated_range(start, end, true, filter)
            .map(move |mapped| self.generated.range_at(mapped.start, mapped.end))
    }

    /// Source positions for a generated position.
    ///
    /// A point on the boundary of two adjacent spans yields one position per
    /// span that passes the filter.
    pub fn source_positions_of<'a>(
        &'a self,
        position: Position,
        filter: Filter<'a>,
    ) -> impl Iterator<Item = Position> + 'a {
        let offset = self.generated.offset_at(position);
        self.map
            .to_source_location(offset, filter)
            .map(move |mapped| self.source.position_at(mapped.offset))
    }

    /// Generated positions for a source position.
    pub fn generated_positions_of<'a>(
        &'a self,
        position: Position,
        filter: Filter<'a>,
    ) -> impl Iterator<Item = Position> + 'a {
        let offset = self.source.offset_at(position);
        self.map
            .to_generated_location(offset, filter)
            .map(move |mapped| self.generated.position_at(mapped.offset))
    }

    pub fn first_source_range(&self, range: Range, filter: Filter<'_>) -> Option<Range> {
        self.source_ranges_of(range, filter).next()
    }

    pub fn first_generated_range(&self, range: Range, filter: Filter<'_>) -> Option<Range> {
        self.generated_ranges_of(range, filter).next()
    }
}
