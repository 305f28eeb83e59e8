//! Playlist migration and reconciliation.
//!
//! Every operation runs on the caller's task, walks its phases in order and
//! reports them through a [`ProgressSender`](crate::progress::ProgressSender)
//! that is dropped, closing the stream, when the operation returns. All
//! provider calls race the invocation's [`CancellationToken`]; once it fires
//! the operation returns [`Error::Cancelled`] and partial work is discarded.

mod diff;
mod export;
mod run;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::{
    error::{Error, Result},
    progress::{ProgressSender, ProgressUpdate},
    service::ServiceRegistry,
};

pub use diff::compare;
pub use export::BulkExportOptions;

/// Migrate `source` (an id or an exact playlist name) from one service to
/// a new playlist called `dest_name` on another.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub source: String,
    pub dest_name: String,
}

/// A playlist on a labelled service.
#[derive(Debug, Clone)]
pub struct PlaylistRef {
    pub service: String,
    pub playlist_id: String,
}

impl PlaylistRef {
    pub fn new(service: &str, playlist_id: &str) -> Self {
        Self {
            service: service.to_string(),
            playlist_id: playlist_id.to_string(),
        }
    }
}

pub struct PlaylistEngine {
    registry: ServiceRegistry,
}

impl PlaylistEngine {
    pub fn new(registry: ServiceRegistry) -> Self {
        Self { registry }
    }
}

/// Runs `fut` unless `cancel` fires first.
pub(crate) async fn guarded<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}

/// Emits a progress update, giving up if the invocation is cancelled while
/// the queue is full.
pub(crate) async fn emit(
    cancel: &CancellationToken,
    progress: &ProgressSender,
    update: ProgressUpdate,
) -> Result<()> {
    guarded(cancel, async {
        progress.send(update).await;
        Ok(())
    })
    .await
}
