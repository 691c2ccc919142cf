//! Hover information across generated documents.

use tower_lsp::lsp_types::{
    Hover, HoverContents, MarkedString, MarkupContent, MarkupKind, Position, Url,
};

use crate::dispatch::{language_feature_worker, CancellationToken, FeatureContext};
use crate::mapping::is_hover_enabled;
use crate::projection::DocumentsAndMap;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Hover at `position` of the source document `uri`.
///
/// Every plugin in every generated document containing the position is
/// asked; all answers are merged into one markdown hover.
pub async fn hover(
    context: FeatureContext<'_>,
    uri: &Url,
    position: Position,
    token: &CancellationToken,
) -> Option<Hover> {
    language_feature_worker(
        context,
        uri,
        || position,
        |docs| {
            docs.generated_positions_of(position, &is_hover_enabled)
                .collect::<Vec<_>>()
        },
        |plugin, document, position| {
            let token = token.clone();
            async move {
                if token.is_cancelled() {
                    return Ok(None);
                }
                let Some(provider) = plugin.hover_provider() else {
                    return Ok(None);
                };
                provider.provide_hover(&document, position, &token).await
            }
        },
        transform_hover,
        Some(merge_hovers as fn(Vec<Hover>) -> Hover),
    )
    .await
}

fn transform_hover(mut hover: Hover, docs: Option<&DocumentsAndMap>) -> Option<Hover> {
    if let (Some(docs), Some(range)) = (docs, hover.range) {
        hover.range = docs.first_source_range(range, &is_hover_enabled);
    }
    Some(hover)
}

/// Merge hovers into one markdown block, keeping the first available range.
fn merge_hovers(mut hovers: Vec<Hover>) -> Hover {
    if hovers.len() == 1 {
        if let Some(hover) = hovers.pop() {
            return hover;
        }
    }

    let range = hovers.iter().find_map(|hover| hover.range);
    let value = hovers
        .into_iter()
        .map(|hover| contents_to_markdown(hover.contents))
        .filter(|section| !section.trim().is_empty())
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR);

    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range,
    }
}

fn contents_to_markdown(contents: HoverContents) -> String {
    match contents {
        HoverContents::Scalar(marked) => marked_to_markdown(marked),
        HoverContents::Array(items) => items
            .into_iter()
            .map(marked_to_markdown)
            .collect::<Vec<_>>()
            .join("\n\n"),
        HoverContents::Markup(markup) => markup.value,
    }
}

fn marked_to_markdown(marked: MarkedString) -> String {
    match marked {
        MarkedString::String(text) => text,
        MarkedString::LanguageString(code) => {
            format!("```{}\n{}\n```", code.language, code.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use tower_lsp::lsp_types::{LanguageString, Range};

    use super::*;
    use crate::testing::{
        fixture, markdown, new_log, notes_uri, one_position, page_uri, Behavior, Recorder,
    };

    fn markdown_value(hover: &Hover) -> &str {
        match &hover.contents {
            HoverContents::Markup(markup) => &markup.value,
            _ => "",
        }
    }

    #[tokio::test]
    async fn merges_every_generated_document() {
        let log = new_log();
        let fixture = fixture(vec![Recorder::entry("a", Behavior::Answer, &log)]);

        let hover = hover(fixture.context(), &page_uri(), one_position(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(markdown_value(&hover), "a expr\n\n---\n\na script\n\n---\n\na root");
        // The first hover covered the `1` in the expression document.
        assert_eq!(
            hover.range,
            Some(Range::new(Position::new(0, 17), Position::new(0, 18)))
        );
    }

    #[tokio::test]
    async fn host_document_hover_is_unchanged() {
        let log = new_log();
        let fixture = fixture(vec![Recorder::entry("a", Behavior::Answer, &log)]);

        let position = Position::new(0, 2);
        let hover = hover(fixture.context(), &notes_uri(), position, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(hover.contents, markdown("a source"));
        assert_eq!(
            hover.range,
            Some(Range::new(Position::new(0, 2), Position::new(0, 3)))
        );
    }

    #[tokio::test]
    async fn cancelled_request_asks_no_plugin() {
        let log = new_log();
        let fixture = fixture(vec![Recorder::entry("a", Behavior::Answer, &log)]);
        let token = CancellationToken::new();
        token.cancel();

        assert!(hover(fixture.context(), &page_uri(), one_position(), &token)
            .await
            .is_none());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn merge_renders_marked_strings() {
        let plain = Hover {
            contents: HoverContents::Scalar(MarkedString::String("plain".to_string())),
            range: None,
        };
        let code = Hover {
            contents: HoverContents::Array(vec![MarkedString::LanguageString(LanguageString {
                language: "ts".to_string(),
                value: "let x: number".to_string(),
            })]),
            range: Some(Range::new(Position::new(1, 0), Position::new(1, 1))),
        };

        let merged = merge_hovers(vec![plain, code]);
        assert_eq!(
            markdown_value(&merged),
            "plain\n\n---\n\n```ts\nlet x: number\n```"
        );
        assert_eq!(merged.range, Some(Range::new(Position::new(1, 0), Position::new(1, 1))));
    }
}
