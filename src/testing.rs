//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use tower_lsp::lsp_types::{
    FoldingRange, Hover, HoverContents, MarkupContent, MarkupKind, Position, Range, TextEdit, Url,
};

use crate::dispatch::{
    AutoInsertProvider, CancellationToken, Disabled, FeatureContext, FoldingRangeProvider,
    HoverProvider, PluginEntry, ServicePlugin,
};
use crate::document::{
    decode_embedded_uri, DocumentCache, LanguagePlugin, ScriptRegistry, Snapshot, TextBuffer,
    VirtualCode,
};
use crate::error::{PluginError, PluginResult};
use crate::lsp::{AutoInsertChange, AutoInsertEdit};
use crate::mapping::{CodeInformation, Mapping, SourceMap};

/// `<script>` holds `let x = (1 + 2);` at 8..24, the parenthesised
/// expression `1 + 2` sits at 17..22 and `<style>` holds `.a {}` at 40..45.
pub(crate) const PAGE: &str = "<script>let x = (1 + 2);</script><style>.a {}</style>";

pub(crate) const NOTES: &str = "plain notes";

pub(crate) fn page_uri() -> Url {
    Url::parse("file:///page.html").unwrap()
}

pub(crate) fn notes_uri() -> Url {
    Url::parse("file:///notes.txt").unwrap()
}

/// Source position of the `1` inside the expression.
pub(crate) fn one_position() -> Position {
    Position::new(0, 17)
}

/// Compiles `.html` documents into `root[script[expr], style]`.
pub(crate) struct PageLanguage;

impl LanguagePlugin for PageLanguage {
    fn language_id_of(&self, uri: &Url) -> Option<String> {
        uri.path().ends_with(".html").then(|| "html".to_string())
    }

    fn create_virtual_code(
        &self,
        _uri: &Url,
        language_id: &str,
        snapshot: &Snapshot,
    ) -> Option<VirtualCode> {
        if language_id != "html" {
            return None;
        }
        let all = CodeInformation::all();
        let region = |id: &str, language: &str, start: usize, end: usize| {
            VirtualCode::new(
                id,
                language,
                Arc::from(&snapshot[start..end]),
                SourceMap::new(vec![Mapping::new(start, 0, end - start, all)]),
            )
        };

        let script = region("script", "js", 8, 24).with_embedded([region("expr", "js", 17, 22)]);
        let style = region("style", "css", 40, 45);
        let root = VirtualCode::new(
            "root",
            "html",
            snapshot.clone(),
            SourceMap::new(vec![Mapping::new(0, 0, snapshot.len(), all)]),
        )
        .with_embedded([script, style]);
        Some(root)
    }
}

pub(crate) struct Fixture {
    pub scripts: ScriptRegistry,
    pub documents: DocumentCache,
    pub plugins: Vec<PluginEntry>,
    pub disabled: Disabled,
}

impl Fixture {
    pub fn context(&self) -> FeatureContext<'_> {
        FeatureContext {
            scripts: &self.scripts,
            documents: &self.documents,
            plugins: &self.plugins,
            disabled: &self.disabled,
        }
    }
}

pub(crate) fn fixture(plugins: Vec<PluginEntry>) -> Fixture {
    let scripts = ScriptRegistry::new(vec![Arc::new(PageLanguage)]);
    scripts.set(page_uri(), Arc::from(PAGE), None);
    scripts.set(notes_uri(), Arc::from(NOTES), None);
    Fixture {
        scripts,
        documents: DocumentCache::new(),
        plugins,
        disabled: Disabled::default(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Answer,
    Nothing,
    Fail,
    Panic,
}

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

/// A plugin that records every call as `name@document` and then behaves as told.
pub(crate) struct Recorder {
    pub name: &'static str,
    pub behavior: Behavior,
    pub log: CallLog,
}

impl Recorder {
    pub fn entry(name: &'static str, behavior: Behavior, log: &CallLog) -> PluginEntry {
        PluginEntry::new(
            name,
            Recorder {
                name,
                behavior,
                log: Arc::clone(log),
            },
        )
    }

    fn record(&self, document: &TextBuffer) -> PluginResult<Option<String>> {
        let label = document_label(document.uri());
        self.log.lock().unwrap().push(format!("{}@{}", self.name, label));
        match self.behavior {
            Behavior::Answer => Ok(Some(format!("{} {}", self.name, label))),
            Behavior::Nothing => Ok(None),
            Behavior::Fail => Err(PluginError::failed(format!("{} failed", self.name))),
            Behavior::Panic => panic!("{} exploded", self.name),
        }
    }
}

/// `source` for authored documents, the embedded id otherwise.
pub(crate) fn document_label(uri: &Url) -> String {
    decode_embedded_uri(uri)
        .map(|(_, id)| id)
        .unwrap_or_else(|| "source".to_string())
}

pub(crate) fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub(crate) fn markdown(value: impl Into<String>) -> HoverContents {
    HoverContents::Markup(MarkupContent {
        kind: MarkupKind::Markdown,
        value: value.into(),
    })
}

#[tower_lsp::async_trait]
impl HoverProvider for Recorder {
    async fn provide_hover(
        &self,
        document: &TextBuffer,
        position: Position,
        _token: &CancellationToken,
    ) -> PluginResult<Option<Hover>> {
        self.record(document).map(|text| {
            text.map(|text| Hover {
                contents: markdown(text),
                range: Some(Range::new(
                    position,
                    Position::new(position.line, position.character + 1),
                )),
            })
        })
    }
}

#[tower_lsp::async_trait]
impl FoldingRangeProvider for Recorder {
    async fn provide_folding_ranges(
        &self,
        document: &TextBuffer,
        _token: &CancellationToken,
    ) -> PluginResult<Option<Vec<FoldingRange>>> {
        self.record(document).map(|text| {
            text.map(|_| {
                vec![FoldingRange {
                    start_line: 0,
                    start_character: Some(0),
                    end_line: 0,
                    end_character: Some(1),
                    ..Default::default()
                }]
            })
        })
    }
}

#[tower_lsp::async_trait]
impl AutoInsertProvider for Recorder {
    async fn provide_auto_insert(
        &self,
        document: &TextBuffer,
        position: Position,
        last_change: &AutoInsertChange,
        _token: &CancellationToken,
    ) -> PluginResult<Option<AutoInsertEdit>> {
        self.record(document).map(|text| {
            text.map(|text| {
                AutoInsertEdit::Edit(TextEdit {
                    range: Range::new(position, position),
                    new_text: format!("{text}:{}", last_change.range_offset),
                })
            })
        })
    }
}

impl ServicePlugin for Recorder {
    fn hover_provider(&self) -> Option<&dyn HoverProvider> {
        Some(self)
    }

    fn auto_insert_provider(&self) -> Option<&dyn AutoInsertProvider> {
        Some(self)
    }

    fn folding_range_provider(&self) -> Option<&dyn FoldingRangeProvider> {
        Some(self)
    }
}
