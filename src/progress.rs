//! Ordered, bounded progress stream from the engine to a presentation layer.
//!
//! The engine owns the only [`ProgressSender`] for an invocation and drops it
//! when the operation returns, which closes the stream. Consumers must drain
//! [`ProgressReceiver::recv`] until it yields `None`.

use std::fmt;

use tokio::sync::mpsc;

use crate::types::Track;

/// Default queue capacity for one invocation.
pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ResolveSource,
    FetchSource,
    FetchDest,
    SearchTracks,
    CreatePlaylist,
    Compare,
    ExportPlaylist,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::ResolveSource => "resolve_source",
            Phase::FetchSource => "fetch_source",
            Phase::FetchDest => "fetch_dest",
            Phase::SearchTracks => "search_tracks",
            Phase::CreatePlaylist => "create_playlist",
            Phase::Compare => "compare",
            Phase::ExportPlaylist => "export_playlist",
            Phase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Advisory notification; never drives control flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub step: usize,
    pub total: usize,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(phase: Phase, step: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            phase,
            step,
            total,
            message: message.into(),
        }
    }

    pub fn resolving(source: &str) -> Self {
        Self::new(
            Phase::ResolveSource,
            1,
            1,
            format!("Resolving source playlist '{source}'..."),
        )
    }

    pub fn fetching_source(service: &str) -> Self {
        Self::new(
            Phase::FetchSource,
            1,
            1,
            format!("Fetching source playlist ({service})..."),
        )
    }

    pub fn found_playlist(name: &str, tracks: usize) -> Self {
        Self::new(
            Phase::FetchSource,
            1,
            1,
            format!("Found playlist: {name} ({tracks} tracks)"),
        )
    }

    pub fn fetching_dest(service: &str) -> Self {
        Self::new(
            Phase::FetchDest,
            1,
            1,
            format!("Fetching destination playlist ({service})..."),
        )
    }

    pub fn searching(step: usize, total: usize, track: &Track) -> Self {
        Self::new(
            Phase::SearchTracks,
            step,
            total,
            format!("[{step}/{total}] {} - {}", track.artist, track.title),
        )
    }

    pub fn creating_playlist(service: &str) -> Self {
        Self::new(
            Phase::CreatePlaylist,
            1,
            1,
            format!("Creating playlist on {service}..."),
        )
    }

    pub fn comparing(step: usize, total: usize, message: &str) -> Self {
        Self::new(Phase::Compare, step, total, message)
    }

    pub fn done(message: impl Into<String>) -> Self {
        Self::new(Phase::Done, 1, 1, message)
    }
}

/// Producer half. Sending waits when the queue is full.
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressUpdate>,
}

impl ProgressSender {
    /// Sends one update. A consumer that has gone away is ignored since
    /// progress is advisory.
    pub async fn send(&self, update: ProgressUpdate) {
        if self.tx.send(update).await.is_err() {
            tracing::debug!("progress consumer dropped; discarding update");
        }
    }
}

#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressUpdate>,
}

impl ProgressReceiver {
    /// Next update, or `None` once the producer has finished.
    pub async fn recv(&mut self) -> Option<ProgressUpdate> {
        self.rx.recv().await
    }

    /// Drains the stream to completion and returns every update in order.
    pub async fn collect(mut self) -> Vec<ProgressUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.recv().await {
            updates.push(update);
        }
        updates
    }
}

pub fn channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender { tx }, ProgressReceiver { rx })
}

/// A sender whose updates go nowhere, for callers without a presentation layer.
pub fn discard() -> ProgressSender {
    let (tx, _) = channel(1);
    tx
}
