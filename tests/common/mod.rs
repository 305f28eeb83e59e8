#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use plsync::{
    Error, Result,
    matching::track_key,
    service::{Credentials, Service},
    types::{Playlist, PlaylistExport, Track},
};

/// In-memory provider with a fixed searchable catalog.
pub struct FakeService {
    name: String,
    playlists: Mutex<HashMap<String, PlaylistExport>>,
    catalog: Vec<Track>,
    imported: Mutex<Vec<PlaylistExport>>,
    searches: AtomicUsize,
    fail_listing: bool,
    search_delay: Option<Duration>,
    panic_on_export: Option<String>,
}

impl FakeService {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            playlists: Mutex::new(HashMap::new()),
            catalog: Vec::new(),
            imported: Mutex::new(Vec::new()),
            searches: AtomicUsize::new(0),
            fail_listing: false,
            search_delay: None,
            panic_on_export: None,
        }
    }

    pub fn with_playlist(self, export: PlaylistExport) -> Self {
        self.playlists
            .lock()
            .unwrap()
            .insert(export.playlist.id.clone(), export);
        self
    }

    pub fn with_catalog(mut self, tracks: Vec<Track>) -> Self {
        self.catalog = tracks;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    /// Makes `export_playlist(id)` panic instead of returning.
    pub fn panicking_export(mut self, id: &str) -> Self {
        self.panic_on_export = Some(id.to_string());
        self
    }

    pub fn imported(&self) -> Vec<PlaylistExport> {
        self.imported.lock().unwrap().clone()
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for FakeService {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<()> {
        Ok(())
    }

    async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        if self.fail_listing {
            return Err(Error::ServiceUnavailable("listing disabled".into()));
        }
        let mut playlists: Vec<Playlist> = self
            .playlists
            .lock()
            .unwrap()
            .values()
            .map(|e| e.playlist.clone())
            .collect();
        playlists.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(playlists)
    }

    async fn get_playlist(&self, id: &str) -> Result<Playlist> {
        Ok(self.export_playlist(id).await?.playlist)
    }

    async fn export_playlist(&self, id: &str) -> Result<PlaylistExport> {
        if self.panic_on_export.as_deref() == Some(id) {
            panic!("export of {id} blew up");
        }
        self.playlists
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::PlaylistNotFound(id.to_string()))
    }

    async fn import_playlist(&self, export: &PlaylistExport) -> Result<Playlist> {
        let mut imported = self.imported.lock().unwrap();
        let mut playlist = export.playlist.clone();
        playlist.id = format!("created-{}", imported.len() + 1);
        playlist.track_count = export.tracks.len();
        imported.push(PlaylistExport {
            playlist: playlist.clone(),
            tracks: export.tracks.clone(),
        });
        Ok(playlist)
    }

    async fn search_track(&self, title: &str, artist: &str) -> Result<Track> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        let wanted = track_key(title, artist);
        self.catalog
            .iter()
            .find(|t| track_key(&t.title, &t.artist) == wanted)
            .cloned()
            .ok_or_else(|| Error::TrackNotFound {
                title: title.to_string(),
                artist: artist.to_string(),
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn playlist(id: &str, name: &str, tracks: Vec<Track>) -> PlaylistExport {
    PlaylistExport {
        playlist: Playlist {
            id: id.to_string(),
            name: name.to_string(),
            track_count: tracks.len(),
            ..Default::default()
        },
        tracks,
    }
}

pub fn abc_tracks() -> Vec<Track> {
    vec![
        Track::new("s1", "Song A", "Artist A").with_isrc("USAAA0000001"),
        Track::new("s2", "Song B", "Artist B").with_isrc("USBBB0000002"),
        Track::new("s3", "Song C", "Artist C").with_isrc("USCCC0000003"),
    ]
}
