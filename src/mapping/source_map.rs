//! Segment-based offset mapping between a source and a generated document.
//!
//! A generated document produced from a region of a source document keeps a
//! list of `Mapping`s. Each mapping is a set of parallel segments: segment `i`
//! relates `source_offsets[i]..source_offsets[i] + lengths[i]` in the source
//! to `generated_offsets[i]..generated_offsets[i] + generated_lengths[i]` in
//! the generated document. One source span may appear in several mappings and
//! the other way around, so every query yields a sequence.

use std::fmt;

use super::capabilities::{CodeInformation, Filter};

/// An offset in the destination space and the flags of the mapping that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedOffset {
    pub offset: usize,
    pub data: CodeInformation,
}

/// A range in the destination space and the flags of the mapping that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedRange {
    pub start: usize,
    pub end: usize,
    pub data: CodeInformation,
}

/// Offset mapping oracle between a source and a generated document.
///
/// Every query takes a capability filter; mappings whose flags fail the filter
/// are invisible to that query.
pub trait Mapper: fmt::Debug + Send + Sync {
    fn to_source_range<'a>(
        &'a self,
        start: usize,
        end: usize,
        fallback_to_any_match: bool,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedRange> + 'a>;

    fn to_generated_range<'a>(
        &'a self,
        start: usize,
        end: usize,
        fallback_to_any_match: bool,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedRange> + 'a>;

    fn to_source_location<'a>(
        &'a self,
        offset: usize,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedOffset> + 'a>;

    fn to_generated_location<'a>(
        &'a self,
        offset: usize,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedOffset> + 'a>;

    /// Whether any mapping at all passes the filter.
    fn any_mapping(&self, filter: Filter<'_>) -> bool;
}

/// One capability-tagged correspondence, possibly made of several segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub source_offsets: Vec<usize>,
    pub generated_offsets: Vec<usize>,
    pub lengths: Vec<usize>,
    /// Segment lengths on the generated side when they differ from `lengths`.
    pub generated_lengths: Option<Vec<usize>>,
    pub data: CodeInformation,
}

impl Mapping {
    /// A single segment of equal length on both sides.
    pub fn new(
        source_offset: usize,
        generated_offset: usize,
        length: usize,
        data: CodeInformation,
    ) -> Self {
        Self {
            source_offsets: vec![source_offset],
            generated_offsets: vec![generated_offset],
            lengths: vec![length],
            generated_lengths: None,
            data,
        }
    }

    /// A single segment whose generated length differs from its source length.
    pub fn resized(
        source_offset: usize,
        source_length: usize,
        generated_offset: usize,
        generated_length: usize,
        data: CodeInformation,
    ) -> Self {
        Self {
            source_offsets: vec![source_offset],
            generated_offsets: vec![generated_offset],
            lengths: vec![source_length],
            generated_lengths: Some(vec![generated_length]),
            data,
        }
    }

    fn generated_lengths(&self) -> &[usize] {
        self.generated_lengths.as_deref().unwrap_or(&self.lengths)
    }

    fn sides(&self, from: Side) -> (&[usize], &[usize], &[usize], &[usize]) {
        match from {
            Side::Source => (
                self.source_offsets.as_slice(),
                self.generated_offsets.as_slice(),
                self.lengths.as_slice(),
                self.generated_lengths(),
            ),
            Side::Generated => (
                self.generated_offsets.as_slice(),
                self.source_offsets.as_slice(),
                self.generated_lengths(),
                self.lengths.as_slice(),
            ),
        }
    }

    /// Translate `offset` through the first segment whose closed interval
    /// contains it.
    fn translate(&self, offset: usize, from: Side) -> Option<usize> {
        let (from_offsets, to_offsets, from_lengths, to_lengths) = self.sides(from);
        from_offsets
            .iter()
            .zip(to_offsets)
            .zip(from_lengths.iter().zip(to_lengths))
            .find_map(|((&from_start, &to_start), (&from_len, &to_len))| {
                if offset >= from_start && offset <= from_start + from_len {
                    Some(to_start + (offset - from_start).min(to_len))
                } else {
                    None
                }
            })
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Source,
    Generated,
}

/// The standard `Mapper`: a flat list of mappings scanned in order.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    mappings: Vec<Mapping>,
}

impl SourceMap {
    pub fn new(mappings: Vec<Mapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    fn matching_offsets<'a>(
        &'a self,
        offset: usize,
        from: Side,
        filter: Filter<'a>,
    ) -> impl Iterator<Item = (usize, &'a Mapping)> + 'a {
        self.mappings
            .iter()
            .filter(move |mapping| filter(&mapping.data))
            .filter_map(move |mapping| mapping.translate(offset, from).map(|o| (o, mapping)))
    }

    fn matching_ranges<'a>(
        &'a self,
        start: usize,
        end: usize,
        fallback_to_any_match: bool,
        from: Side,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedRange> + 'a> {
        let starts: Vec<_> = self.matching_offsets(start, from, filter).collect();

        // Pair each start with the end translated through the same mapping.
        let paired: Vec<MappedRange> = starts
            .iter()
            .filter_map(|&(mapped_start, mapping)| {
                mapping.translate(end, from).map(|mapped_end| MappedRange {
                    start: mapped_start,
                    end: mapped_end,
                    data: mapping.data,
                })
            })
            .collect();

        if !paired.is_empty() || !fallback_to_any_match {
            return Box::new(paired.into_iter());
        }

        let ends: Vec<_> = self.matching_offsets(end, from, filter).collect();
        let fallback: Vec<MappedRange> = starts
            .iter()
            .filter_map(|&(mapped_start, start_mapping)| {
                ends.iter()
                    .find(|&&(mapped_end, _)| mapped_end >= mapped_start)
                    .map(|&(mapped_end, _)| MappedRange {
                        start: mapped_start,
                        end: mapped_end,
                        data: start_mapping.data,
                    })
            })
            .collect();
        Box::new(fallback.into_iter())
    }
}

impl Mapper for SourceMap {
    fn to_source_range<'a>(
        &'a self,
        start: usize,
        end: usize,
        fallback_to_any_match: bool,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedRange> + 'a> {
        self.matching_ranges(start, end, fallback_to_any_match, Side::Generated, filter)
    }

    fn to_generated_range<'a>(
        &'a self,
        start: usize,
        end: usize,
        fallback_to_any_match: bool,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedRange> + 'a> {
        self.matching_ranges(start, end, fallback_to_any_match, Side::Source, filter)
    }

    fn to_source_location<'a>(
        &'a self,
        offset: usize,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedOffset> + 'a> {
        Box::new(
            self.matching_offsets(offset, Side::Generated, filter)
                .map(|(offset, mapping)| MappedOffset {
                    offset,
                    data: mapping.data,
                }),
        )
    }

    fn to_generated_location<'a>(
        &'a self,
        offset: usize,
        filter: Filter<'a>,
    ) -> Box<dyn Iterator<Item = MappedOffset> + 'a> {
        Box::new(
            self.matching_offsets(offset, Side::Source, filter)
                .map(|(offset, mapping)| MappedOffset {
                    offset,
                    data: mapping.data,
                }),
        )
    }

    fn any_mapping(&self, filter: Filter<'_>) -> bool {
        self.mappings.iter().any(|mapping| filter(&mapping.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{accept_all, is_hover_enabled};

    fn hover_only() -> CodeInformation {
        CodeInformation {
            semantic: true,
            ..Default::default()
        }
    }

    #[test]
    fn single_segment_offsets() {
        let map = SourceMap::new(vec![Mapping::new(100, 0, 10, CodeInformation::all())]);

        let generated: Vec<_> = map.to_generated_location(105, &accept_all).collect();
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].offset, 5);

        let source: Vec<_> = map.to_source_location(5, &accept_all).collect();
        assert_eq!(source[0].offset, 105);

        assert_eq!(map.to_generated_location(99, &accept_all).count(), 0);
        assert_eq!(map.to_generated_location(111, &accept_all).count(), 0);
    }

    #[test]
    fn closed_interval_includes_segment_end() {
        let map = SourceMap::new(vec![Mapping::new(100, 0, 10, CodeInformation::all())]);
        let generated: Vec<_> = map.to_generated_location(110, &accept_all).collect();
        assert_eq!(generated[0].offset, 10);
    }

    #[test]
    fn resized_segment_clamps_to_destination_length() {
        // Source `{{ x }}` (7 bytes) generates `x` (1 byte).
        let map = SourceMap::new(vec![Mapping::resized(10, 7, 0, 1, CodeInformation::all())]);
        let generated: Vec<_> = map.to_generated_location(14, &accept_all).collect();
        assert_eq!(generated[0].offset, 1);
    }

    #[test]
    fn filter_hides_mappings() {
        let map = SourceMap::new(vec![
            Mapping::new(0, 0, 5, CodeInformation::default()),
            Mapping::new(0, 20, 5, hover_only()),
        ]);
        let all: Vec<_> = map.to_generated_location(2, &accept_all).collect();
        assert_eq!(all.len(), 2);

        let hover: Vec<_> = map.to_generated_location(2, &is_hover_enabled).collect();
        assert_eq!(hover.len(), 1);
        assert_eq!(hover[0].offset, 22);
        assert!(map.any_mapping(&is_hover_enabled));
    }

    #[test]
    fn range_pairs_within_one_mapping() {
        let map = SourceMap::new(vec![
            Mapping::new(0, 50, 10, CodeInformation::all()),
            Mapping::new(0, 80, 10, CodeInformation::all()),
        ]);
        let ranges: Vec<_> = map.to_generated_range(2, 6, false, &accept_all).collect();
        assert_eq!(
            ranges.iter().map(|r| (r.start, r.end)).collect::<Vec<_>>(),
            vec![(52, 56), (82, 86)]
        );
    }

    #[test]
    fn range_across_mappings_needs_fallback() {
        let map = SourceMap::new(vec![
            Mapping::new(0, 0, 5, CodeInformation::all()),
            Mapping::new(10, 8, 5, CodeInformation::all()),
        ]);

        assert_eq!(map.to_source_range(2, 10, false, &accept_all).count(), 0);

        let ranges: Vec<_> = map.to_source_range(2, 10, true, &accept_all).collect();
        assert_eq!(ranges.len(), 1);
        assert_eq!((ranges[0].start, ranges[0].end), (2, 12));
    }
}
