use std::{future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::{
    api::{self, CallbackState},
    error::Error,
};

pub fn router(state: Arc<CallbackState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
}

/// A callback listener running in the background.
///
/// Startup and serve failures are reported through [`CallbackServer::failed`]
/// instead of being returned from the start call, so the caller can wait on
/// them alongside the callback result.
pub struct CallbackServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    errors: Option<oneshot::Receiver<Error>>,
    task: JoinHandle<()>,
}

impl CallbackServer {
    /// Binds `addr` and serves in a background task.
    pub fn start(addr: String, state: Arc<CallbackState>) -> Self {
        let (err_tx, err_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let listener = match TcpListener::bind(&addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(%addr, error = %e, "callback listener failed to bind");
                    let _ = err_tx.send(Error::ListenerStartupFailed(format!("{addr}: {e}")));
                    return;
                }
            };
            serve(listener, state, shutdown_rx, err_tx).await;
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
            errors: Some(err_rx),
            task,
        }
    }

    /// Serves on an already bound listener.
    pub fn listen(listener: TcpListener, state: Arc<CallbackState>) -> Self {
        let (err_tx, err_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(serve(listener, state, shutdown_rx, err_tx));

        Self {
            shutdown_tx: Some(shutdown_tx),
            errors: Some(err_rx),
            task,
        }
    }

    /// Resolves with the listener's failure. Pends forever if it never fails.
    pub async fn failed(&mut self) -> Error {
        let Some(rx) = self.errors.as_mut() else {
            return future::pending().await;
        };
        match rx.await {
            Ok(e) => {
                self.errors = None;
                e
            }
            Err(_) => {
                // Listener ended without error; nothing more will arrive.
                self.errors = None;
                future::pending().await
            }
        }
    }

    /// Stops accepting connections and waits up to `grace` for in-flight
    /// requests before aborting the server task.
    pub async fn shutdown(mut self, grace: Duration) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(Ok(())) => tracing::debug!("callback listener stopped"),
            Ok(Err(e)) => tracing::warn!(error = %e, "callback listener task failed"),
            Err(_) => {
                tracing::warn!(?grace, "callback listener did not stop in time; aborting");
                self.task.abort();
            }
        }
    }
}

async fn serve(
    listener: TcpListener,
    state: Arc<CallbackState>,
    shutdown_rx: oneshot::Receiver<()>,
    err_tx: oneshot::Sender<Error>,
) {
    let local: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(addr = ?local, "callback listener started");

    let shutdown = async {
        let _ = shutdown_rx.await;
    };
    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!(error = %e, "callback listener stopped with error");
        let _ = err_tx.send(Error::ListenerStartupFailed(e.to_string()));
    }
}
