use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// True once `now` is within `buffer_secs` of the expiry instant.
    pub fn expires_within(&self, now: u64, buffer_secs: u64) -> bool {
        now + buffer_secs >= self.obtained_at + self.expires_in
    }
}

/// Outcome of one authorization attempt: a token or a classified failure.
pub type OAuthResult = std::result::Result<Token, Error>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
}

impl Track {
    pub fn new(id: &str, title: &str, artist: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: None,
            duration: 0,
            isrc: None,
        }
    }

    pub fn with_isrc(mut self, isrc: &str) -> Self {
        self.isrc = Some(isrc.to_string());
        self
    }

    pub fn with_album(mut self, album: &str) -> Self {
        self.album = Some(album.to_string());
        self
    }

    /// The ISRC if present and non-empty.
    pub fn usable_isrc(&self) -> Option<&str> {
        self.isrc.as_deref().filter(|isrc| !isrc.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub track_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistExport {
    pub playlist: Playlist,
    pub tracks: Vec<Track>,
}

#[derive(Debug)]
pub struct TrackMatch {
    pub original: Track,
    pub matched: Option<Track>,
    pub failure: Option<Error>,
}

impl TrackMatch {
    pub fn is_matched(&self) -> bool {
        self.matched.is_some()
    }
}

#[derive(Debug)]
pub struct TransferResult {
    pub source: PlaylistExport,
    pub destination: Playlist,
    pub matches: Vec<TrackMatch>,
    pub total: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub success_rate: f64,
}

impl TransferResult {
    /// Source tracks that could not be found on the destination, in source order.
    pub fn unmatched(&self) -> Vec<&Track> {
        self.matches
            .iter()
            .filter(|m| !m.is_matched())
            .map(|m| &m.original)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    pub source: PlaylistExport,
    pub destination: PlaylistExport,
    pub matched_count: usize,
    pub missing_in_dest: Vec<Track>,
    pub extra_in_dest: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistExportOutcome {
    pub playlist_id: String,
    pub playlist_name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkExportResult {
    pub total_playlists: usize,
    pub successful_exports: usize,
    pub failed_exports: usize,
    pub output_directory: String,
    pub manifest_path: Option<String>,
    /// Output format of the exported files.
    #[serde(default)]
    pub format: String,
    /// RFC 3339 time the export finished.
    #[serde(default)]
    pub timestamp: String,
    pub results: Vec<PlaylistExportOutcome>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub artist: String,
    pub title: String,
    pub album: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        Self {
            artist: track.artist.clone(),
            title: track.title.clone(),
            album: track.album.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub tracks: usize,
    pub visibility: String,
}

impl From<&Playlist> for PlaylistTableRow {
    fn from(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            tracks: playlist.track_count,
            visibility: if playlist.public {
                "public".to_string()
            } else {
                "private".to_string()
            },
        }
    }
}
