use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    matching,
    service::{Credentials, Service, import_batches},
    types::{Playlist, PlaylistExport, Track},
    utils,
};

/// A provider backed by a directory of `<id>.json` playlist exports.
pub struct LibraryService {
    name: String,
    root: PathBuf,
}

impl LibraryService {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(Error::PlaylistNotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }

    async fn load(&self, id: &str) -> Result<PlaylistExport> {
        let path = self.path_for(id)?;
        let json = match async_fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::PlaylistNotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    async fn persist(&self, export: &PlaylistExport) -> Result<()> {
        let path = self.path_for(&export.playlist.id)?;
        async_fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string_pretty(export)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PlaylistExport>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();

        let mut exports = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load(&id).await {
                Ok(export) => exports.push(export),
                Err(e) => tracing::warn!(library = %self.name, playlist = %id, error = %e, "skipping unreadable playlist file"),
            }
        }
        Ok(exports)
    }
}

#[async_trait]
impl Service for LibraryService {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<()> {
        match async_fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(Error::NotAuthenticated(format!(
                "library directory {} does not exist",
                self.root.display()
            ))),
        }
    }

    async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .map(|export| export.playlist)
            .collect())
    }

    async fn get_playlist(&self, id: &str) -> Result<Playlist> {
        Ok(self.load(id).await?.playlist)
    }

    async fn export_playlist(&self, id: &str) -> Result<PlaylistExport> {
        self.load(id).await
    }

    async fn import_playlist(&self, export: &PlaylistExport) -> Result<Playlist> {
        let playlist = Playlist {
            id: utils::generate_playlist_id(),
            name: export.playlist.name.clone(),
            description: export.playlist.description.clone(),
            public: export.playlist.public,
            track_count: 0,
        };

        let mut created = PlaylistExport {
            playlist,
            tracks: Vec::with_capacity(export.tracks.len()),
        };
        self.persist(&created).await?;

        for batch in import_batches(&export.tracks) {
            created.tracks.extend_from_slice(batch);
            created.playlist.track_count = created.tracks.len();
            self.persist(&created).await?;
        }

        tracing::info!(
            library = %self.name,
            playlist = %created.playlist.id,
            tracks = created.tracks.len(),
            "playlist imported"
        );
        Ok(created.playlist)
    }

    async fn search_track(&self, title: &str, artist: &str) -> Result<Track> {
        let wanted = matching::track_key(title, artist);
        self.load_all()
            .await?
            .into_iter()
            .flat_map(|export| export.tracks)
            .find(|track| matching::track_key(&track.title, &track.artist) == wanted)
            .ok_or_else(|| Error::TrackNotFound {
                title: title.to_string(),
                artist: artist.to_string(),
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
