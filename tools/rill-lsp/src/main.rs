//! Language server binary.
//!
//! Speaks the protocol over stdin/stdout. The parse backend is supplied
//! by the embedding host through `pipeline::register_pipeline` before
//! this entry point runs; without one the server cannot do useful work
//! and exits with a failure code.
//!
//! Exit codes: 0 on clean shutdown, 1 when a failure reaches the outer
//! handler.

use std::panic::AssertUnwindSafe;
use std::process::ExitCode;

use futures::FutureExt;

use rill_lsp::pipeline::{registered_pipeline, Hooks};

#[tokio::main]
async fn main() -> ExitCode {
    rill_lsp::tracing_setup::init();

    let Some(pipeline) = registered_pipeline() else {
        tracing::error!("no parse backend registered; embed rill-lsp and register one");
        return ExitCode::FAILURE;
    };

    let prelude = rill_eval::Prelude::core().modules().clone();
    let served = AssertUnwindSafe(rill_lsp::serve_stdio(pipeline, prelude, Hooks::default()))
        .catch_unwind()
        .await;
    match served {
        Ok(()) => {
            tracing::info!("rill language server terminated");
            ExitCode::SUCCESS
        }
        Err(_) => {
            tracing::error!("rill language server failed");
            ExitCode::FAILURE
        }
    }
}
