//! Rill language server core.
//!
//! Provides IDE features for Rill scripts:
//! - parse/infer diagnostics, republished on every change
//! - hover information from a per-version hover index
//! - prefix-based completion over reserved words, prelude modules, and
//!   host-supplied identifiers
//!
//! # Concurrency model
//!
//! All state mutation runs on a single-consumer *reactor*: every
//! notification handler wraps its real work into an action and enqueues
//! it, and one consumer task executes actions strictly in enqueue order.
//! Hover and completion requests only read snapshots, so they answer
//! directly. Parsing and inference are an external collaborator behind
//! the [`pipeline::ParseAndInfer`] contract.

pub mod completion;
pub mod hover;
pub mod pipeline;
pub mod reactor;
pub mod server;
pub mod tracing_setup;
pub mod vfs;

use std::sync::Arc;

use tower_lsp::{LspService, Server};

use rill_eval::ModuleMap;

use crate::pipeline::{Hooks, ParseAndInfer};
use crate::server::RillLanguageServer;

/// Serve the language protocol over the process's standard streams.
///
/// Framing and UTF-8 handling are delegated to the protocol layer; the
/// call returns when the client closes the session.
pub async fn serve_stdio<P: ParseAndInfer>(pipeline: P, prelude: ModuleMap, hooks: Hooks) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let pipeline = Arc::new(pipeline);
    let prelude = Arc::new(prelude);
    let hooks = Arc::new(hooks);
    let (service, socket) = LspService::new(move |client| {
        RillLanguageServer::from_parts(client, pipeline.clone(), prelude.clone(), hooks.clone())
    });
    Server::new(stdin, stdout, socket).serve(service).await;
}
