//! Feature dispatch for documents that embed other languages.
//!
//! A source document is compiled by a [`LanguagePlugin`] into a tree of
//! generated documents. Feature requests are projected into each generated
//! document, answered by [`ServicePlugin`]s and mapped back to the source.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};
use tracing::info;

pub mod dispatch;
pub mod document;
pub mod error;
pub mod linked;
pub mod logging;
pub mod lsp;
pub mod mapping;
pub mod projection;
pub mod service;
pub mod settings;
pub mod walker;

#[cfg(test)]
mod testing;

pub use dispatch::{
    document_feature_worker, language_feature_worker, CancellationToken, Disabled, FeatureContext,
    PluginEntry, ServicePlugin,
};
pub use document::{
    decode_embedded_uri, encode_embedded_uri, LanguagePlugin, Snapshot, SourceScript, TextBuffer,
    VirtualCode,
};
pub use error::{PluginError, PluginResult, SettingsError};
pub use lsp::{AutoInsertChange, AutoInsertEdit};
pub use projection::DocumentsAndMap;
pub use service::LanguageService;
pub use settings::{discover_settings, load_settings, Settings};

/// Method name of the auto-insert request, which LSP has no standard request for.
pub const AUTO_INSERT_METHOD: &str = "vdsp/autoInsert";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoInsertParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
    pub last_change: AutoInsertChange,
}

pub struct Backend {
    client: Client,
    service: LanguageService,
    workspace_root: OnceLock<PathBuf>,
}

impl Backend {
    pub(crate) fn new(
        client: Client,
        languages: Vec<Arc<dyn LanguagePlugin>>,
        plugins: Vec<PluginEntry>,
    ) -> Self {
        Self {
            client,
            service: LanguageService::new(languages, plugins),
            workspace_root: OnceLock::new(),
        }
    }

    pub fn service(&self) -> &LanguageService {
        &self.service
    }

    /// Set once `initialize` has seen a workspace folder or root URI.
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.get().map(PathBuf::as_path)
    }

    async fn auto_insert(&self, params: AutoInsertParams) -> Result<Option<AutoInsertResponse>> {
        let edit = self
            .service
            .auto_insert(
                &params.text_document.uri,
                params.position,
                &params.last_change,
                &CancellationToken::new(),
            )
            .await;
        Ok(edit.map(AutoInsertResponse::from))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        match workspace_root {
            Some(root) => {
                let (settings, settings_dir) = settings::discover_settings(&root);
                logging::init_logging(settings.log_level());
                info!(settings_dir = %settings_dir.display(), "settings loaded");
                self.service.apply_settings(&settings);
                let _ = self.workspace_root.set(root);
            }
            None => logging::init_logging(None),
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "embedded document language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.service.update(
            document.uri,
            Arc::from(document.text),
            Some(&document.language_id),
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // FULL sync: exactly one change carrying the whole text
        let Some(change) = params.content_changes.into_iter().next() else {
            return;
        };
        let uri = params.text_document.uri;
        let language_id = self
            .service
            .script(&uri)
            .map(|script| script.language_id.clone());
        self.service
            .update(uri, Arc::from(change.text), language_id.as_deref());
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.service.close(&params.text_document.uri);
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self
            .service
            .hover(uri, position, &CancellationToken::new())
            .await)
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        Ok(self
            .service
            .folding_ranges(&params.text_document.uri, &CancellationToken::new())
            .await)
    }
}

/// Serialized auto-insert answer: a bare snippet string or a text edit.
#[derive(Serialize)]
#[serde(untagged)]
enum AutoInsertResponse {
    Snippet(String),
    Edit(TextEdit),
}

impl From<AutoInsertEdit> for AutoInsertResponse {
    fn from(edit: AutoInsertEdit) -> Self {
        match edit {
            AutoInsertEdit::Snippet(snippet) => Self::Snippet(snippet),
            AutoInsertEdit::Edit(edit) => Self::Edit(edit),
        }
    }
}

pub fn create_service(
    languages: Vec<Arc<dyn LanguagePlugin>>,
    plugins: Vec<PluginEntry>,
) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::build(|client| Backend::new(client, languages, plugins))
        .custom_method(AUTO_INSERT_METHOD, Backend::auto_insert)
        .finish()
}
