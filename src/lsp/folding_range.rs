//! Folding ranges collected from every generated document.

use tower_lsp::lsp_types::{FoldingRange, Position, Range, Url};

use crate::dispatch::{document_feature_worker, CancellationToken, FeatureContext};
use crate::mapping::is_folding_ranges_enabled;
use crate::projection::DocumentsAndMap;

pub async fn folding_ranges(
    context: FeatureContext<'_>,
    uri: &Url,
    token: &CancellationToken,
) -> Option<Vec<FoldingRange>> {
    document_feature_worker(
        context,
        uri,
        |docs| docs.map.any_mapping(&is_folding_ranges_enabled),
        |plugin, document| {
            let token = token.clone();
            async move {
                if token.is_cancelled() {
                    return Ok(None);
                }
                let Some(provider) = plugin.folding_range_provider() else {
                    return Ok(None);
                };
                provider.provide_folding_ranges(&document, &token).await
            }
        },
        transform_ranges,
        Some(flatten as fn(Vec<Vec<FoldingRange>>) -> Vec<FoldingRange>),
    )
    .await
}

fn transform_ranges(
    ranges: Vec<FoldingRange>,
    docs: Option<&DocumentsAndMap>,
) -> Option<Vec<FoldingRange>> {
    let Some(docs) = docs else {
        return Some(ranges);
    };
    Some(
        ranges
            .into_iter()
            .filter_map(|range| transform_range(range, docs))
            .collect(),
    )
}

/// Map a folding range to the source document; ranges whose ends have no
/// source counterpart are dropped.
fn transform_range(range: FoldingRange, docs: &DocumentsAndMap) -> Option<FoldingRange> {
    let generated = Range::new(
        Position::new(range.start_line, range.start_character.unwrap_or(0)),
        Position::new(range.end_line, range.end_character.unwrap_or(0)),
    );
    let source = docs.first_source_range(generated, &is_folding_ranges_enabled)?;

    Some(FoldingRange {
        start_line: source.start.line,
        start_character: range.start_character.map(|_| source.start.character),
        end_line: source.end.line,
        end_character: range.end_character.map(|_| source.end.character),
        ..range
    })
}

fn flatten(ranges: Vec<Vec<FoldingRange>>) -> Vec<FoldingRange> {
    ranges.into_iter().flatten().collect()
}
