//! Ctrl-C handling for the whole process lifetime.
//!
//! The listener is created once, before any blocking startup step, and the
//! same pinned future is later handed to [`Orchestrator::run`] as its
//! shutdown signal.
//!
//! [`Orchestrator::run`]: crate::Orchestrator::run

use std::future::Future;
use std::pin::Pin;

/// Resolves on SIGINT. Stays pending forever if the handler cannot be
/// installed.
pub async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Runs `work` unless `interrupt` fires first, in which case `None` is
/// returned and `work` is dropped.
///
/// `interrupt` is polled before `work`, so a signal listener is registered
/// before `work` gets a chance to block.
pub async fn unless_interrupted<I, W>(interrupt: Pin<&mut I>, work: W) -> Option<W::Output>
where
    I: Future<Output = ()> + ?Sized,
    W: Future,
{
    tokio::select! {
        biased;

        _ = interrupt => {
            tracing::info!("interrupted during startup");
            None
        }
        out = work => Some(out),
    }
}
