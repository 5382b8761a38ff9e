//! The serializing reactor.
//!
//! One unbounded FIFO, one consumer task. Handlers capture their context
//! into an action and enqueue; the consumer runs each action to
//! completion in enqueue order. This serializes all state mutation
//! (hover index, diagnostics publication) without per-state locks, and
//! it makes ordering a structural guarantee: per URI and globally,
//! published results follow the order the client's events arrived in.
//!
//! A failure inside one action must not terminate the consumer: every
//! action runs under a catch-all that logs and continues.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;

/// A unit of handler work, run to completion by the consumer.
pub struct ReactorAction {
    label: &'static str,
    fut: BoxFuture<'static, ()>,
}

/// Handle for enqueueing actions; the consumer task owns the receiver.
#[derive(Clone)]
pub struct Reactor {
    tx: mpsc::UnboundedSender<ReactorAction>,
}

impl Reactor {
    /// Start the consumer task and return the enqueue handle.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn() -> Reactor {
        let (tx, mut rx) = mpsc::unbounded_channel::<ReactorAction>();
        tokio::spawn(async move {
            while let Some(ReactorAction { label, fut }) = rx.recv().await {
                if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
                    tracing::error!(
                        action = label,
                        panic = panic_message(payload.as_ref()),
                        "reactor action panicked"
                    );
                }
            }
        });
        Reactor { tx }
    }

    /// Enqueue an action. Actions run strictly in enqueue order.
    pub fn enqueue(&self, label: &'static str, fut: impl Future<Output = ()> + Send + 'static) {
        // A send error means the consumer is gone, i.e. the runtime is
        // shutting down; dropping the action is the only option left.
        let _ = self.tx.send(ReactorAction {
            label,
            fut: fut.boxed(),
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
