//! The capability every music provider implements.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    types::{Playlist, PlaylistExport, Track},
};

/// Most providers cap playlist additions at this many items per call.
pub const IMPORT_BATCH_LIMIT: usize = 100;

pub type Credentials = HashMap<String, String>;

#[async_trait]
pub trait Service: Send + Sync {
    /// Establishes a usable session. Incomplete credentials yield `NotAuthenticated`.
    async fn authenticate(&self, credentials: &Credentials) -> Result<()>;

    /// Playlist metadata only.
    async fn get_playlists(&self) -> Result<Vec<Playlist>>;

    async fn get_playlist(&self, id: &str) -> Result<Playlist>;

    /// Metadata plus the complete ordered track list. Unknown ids yield `PlaylistNotFound`.
    async fn export_playlist(&self, id: &str) -> Result<PlaylistExport>;

    /// Creates a playlist populated with the given tracks and returns it with
    /// its provider-assigned id.
    async fn import_playlist(&self, export: &PlaylistExport) -> Result<Playlist>;

    /// The single best match, or `TrackNotFound`.
    async fn search_track(&self, title: &str, artist: &str) -> Result<Track>;

    /// Display label for diagnostics.
    fn name(&self) -> &str;
}

/// Splits tracks into provider-sized chunks for additive imports.
pub fn import_batches(tracks: &[Track]) -> std::slice::Chunks<'_, Track> {
    tracks.chunks(IMPORT_BATCH_LIMIT)
}

/// Truncates a listing to at most `limit` entries; `0` means no limit.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: usize) {
    if limit > 0 && limit < items.len() {
        items.truncate(limit);
    }
}

/// Configured services addressed by a caller-chosen label.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<dyn Service>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, label: impl Into<String>, service: Arc<dyn Service>) {
        self.services.insert(label.into(), service);
    }

    pub fn with(mut self, label: impl Into<String>, service: Arc<dyn Service>) -> Self {
        self.register(label, service);
        self
    }

    pub fn resolve(&self, label: &str) -> Result<Arc<dyn Service>> {
        self.services.get(label).cloned().ok_or_else(|| {
            let mut known: Vec<&str> = self.services.keys().map(String::as_str).collect();
            known.sort_unstable();
            Error::InvalidArgument(format!(
                "unknown service '{label}' (configured: {})",
                known.join(", ")
            ))
        })
    }
}
