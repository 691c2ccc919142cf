//! Auto-insertion (closing tags, quotes, ...) after an edit.

use serde::Deserialize;
use tower_lsp::lsp_types::{Position, TextEdit, Url};

use crate::dispatch::{language_feature_worker, CancellationToken, FeatureContext};
use crate::mapping::{accept_all, is_auto_insert_enabled};
use crate::projection::DocumentsAndMap;

/// The edit that triggered the request, as the client reported it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoInsertChange {
    pub range_offset: usize,
    pub range_length: usize,
    pub text: String,
}

/// What a plugin wants inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoInsertEdit {
    /// A snippet inserted at the cursor.
    Snippet(String),
    Edit(TextEdit),
}

/// Auto-insert suggestion at `position` of `uri`; the first plugin with an
/// answer wins.
pub async fn auto_insert(
    context: FeatureContext<'_>,
    uri: &Url,
    position: Position,
    last_change: &AutoInsertChange,
    token: &CancellationToken,
) -> Option<AutoInsertEdit> {
    language_feature_worker(
        context,
        uri,
        || (position, last_change.clone()),
        |docs| generated_requests(docs, position, last_change),
        |plugin, document, (position, change)| {
            let token = token.clone();
            async move {
                if token.is_cancelled() {
                    return Ok(None);
                }
                let Some(provider) = plugin.auto_insert_provider() else {
                    return Ok(None);
                };
                provider
                    .provide_auto_insert(&document, position, &change, &token)
                    .await
            }
        },
        transform_edit,
        None,
    )
    .await
}

/// One request per generated position, with the change offset moved into
/// the generated document. Positions whose change cannot be mapped are dropped.
fn generated_requests(
    docs: &DocumentsAndMap,
    position: Position,
    last_change: &AutoInsertChange,
) -> Vec<(Position, AutoInsertChange)> {
    docs.generated_positions_of(position, &is_auto_insert_enabled)
        .filter_map(|generated| {
            let mapped = docs
                .map
                .to_generated_location(last_change.range_offset, &accept_all)
                .next()?;
            Some((
                generated,
                AutoInsertChange {
                    range_offset: mapped.offset,
                    ..last_change.clone()
                },
            ))
        })
        .collect()
}

fn transform_edit(edit: AutoInsertEdit, docs: Option<&DocumentsAndMap>) -> Option<AutoInsertEdit> {
    let Some(docs) = docs else {
        return Some(edit);
    };
    match edit {
        AutoInsertEdit::Snippet(snippet) => Some(AutoInsertEdit::Snippet(snippet)),
        AutoInsertEdit::Edit(edit) => {
            let range = docs.first_source_range(edit.range, &is_auto_insert_enabled)?;
            Some(AutoInsertEdit::Edit(TextEdit {
                range,
                new_text: edit.new_text,
            }))
        }
    }
}
