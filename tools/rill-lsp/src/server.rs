//! The tower-lsp server.
//!
//! Handlers capture their context and enqueue the real work onto the
//! reactor; only hover and completion answer directly, from snapshots.
//! Diagnostics are published with the version the text was parsed at,
//! and hover entries are replaced under the same key, so per-URI results
//! always follow client order.

use std::sync::Arc;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use rill_eval::ModuleMap;
use rill_ir::{Pos, SourceRange};

use crate::completion::{completion_prefix, completions};
use crate::hover::{find_smallest, HoverIndex};
use crate::pipeline::{run_parse, Hooks, ParseAndInfer};
use crate::reactor::Reactor;
use crate::vfs::Vfs;

/// Rill language server over an external parse backend.
pub struct RillLanguageServer<P: ParseAndInfer> {
    client: Client,
    vfs: Arc<Vfs>,
    hover: Arc<HoverIndex>,
    reactor: Reactor,
    pipeline: Arc<P>,
    hooks: Arc<Hooks>,
    prelude: Arc<ModuleMap>,
}

impl<P: ParseAndInfer> RillLanguageServer<P> {
    /// Build the server and start its reactor. Must run inside a tokio
    /// runtime.
    pub fn from_parts(
        client: Client,
        pipeline: Arc<P>,
        prelude: Arc<ModuleMap>,
        hooks: Arc<Hooks>,
    ) -> Self {
        RillLanguageServer {
            client,
            vfs: Arc::new(Vfs::new()),
            hover: Arc::new(HoverIndex::new()),
            reactor: Reactor::spawn(),
            pipeline,
            hooks,
            prelude,
        }
    }

    /// Enqueue a parse of `text` and the publication of its results.
    fn schedule_parse(&self, uri: Url, version: i32, text: String) {
        let client = self.client.clone();
        let pipeline = self.pipeline.clone();
        let hooks = self.hooks.clone();
        let prelude = self.prelude.clone();
        let hover = self.hover.clone();
        self.reactor.enqueue("parse-and-publish", async move {
            match run_parse(pipeline.as_ref(), &hooks, &prelude, &text) {
                Ok(script) => {
                    hover.replace(uri.clone(), version, script.hover);
                    client
                        .publish_diagnostics(uri, Vec::new(), Some(version))
                        .await;
                }
                Err(diags) => {
                    // The previous version's hover entries stay in place;
                    // hover keeps answering for the last good text.
                    client.publish_diagnostics(uri, diags, Some(version)).await;
                }
            }
        });
    }
}

#[tower_lsp::async_trait]
impl<P: ParseAndInfer> LanguageServer for RillLanguageServer<P> {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(false),
                        })),
                        ..Default::default()
                    },
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions::default()),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "rill-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "rill language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        self.vfs.open(uri.clone(), text.clone());
        self.schedule_parse(uri, 0, text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let Some(doc) = self
            .vfs
            .apply_changes(&uri, version, &params.content_changes)
        else {
            tracing::warn!(uri = %uri, "change for an unopened document");
            return;
        };
        self.schedule_parse(uri, doc.version, doc.text);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.vfs.close(&params.text_document.uri);
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(doc) = self.vfs.get(&uri) else {
            return Ok(None);
        };
        let Some(entries) = self.hover.at(&uri, doc.version) else {
            return Ok(None);
        };
        let pos = Pos::new(position.line, position.character);
        Ok(find_smallest(&entries, pos).map(|(range, markup)| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: markup.clone(),
            }),
            range: Some(to_lsp_range(range)),
        }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some(doc) = self.vfs.get(&uri) else {
            return Ok(None);
        };
        let line = doc
            .text
            .lines()
            .nth(position.line as usize)
            .unwrap_or_default();
        let prefix = completion_prefix(line, position.character);
        let idents = (self.hooks.get_idents)();
        let items = completions(&prefix, position, &self.prelude, &idents);
        Ok(Some(CompletionResponse::Array(items)))
    }
}

fn to_lsp_range(range: &SourceRange) -> Range {
    Range {
        start: Position::new(range.start.line, range.start.col),
        end: Position::new(range.end.line, range.end.col),
    }
}
