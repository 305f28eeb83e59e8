//! Cross-catalog track identity.
//!
//! Two tracks are the same recording when both carry the same non-empty ISRC,
//! or, failing that, when their normalized title and artist are equal.

use std::collections::HashSet;

use crate::types::Track;

/// Lowercases, trims, and collapses internal whitespace runs to one space.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized `title|artist` lookup key.
pub fn track_key(title: &str, artist: &str) -> String {
    format!("{}|{}", normalize(title), normalize(artist))
}

pub fn tracks_match(a: &Track, b: &Track) -> bool {
    if let (Some(isrc_a), Some(isrc_b)) = (a.usable_isrc(), b.usable_isrc()) {
        if isrc_a == isrc_b {
            return true;
        }
    }
    track_key(&a.title, &a.artist) == track_key(&b.title, &b.artist)
}

/// Lookup structures for one side of a comparison.
#[derive(Debug, Default)]
pub struct TrackIndex {
    by_isrc: HashSet<String>,
    by_key: HashSet<String>,
}

impl TrackIndex {
    pub fn build(tracks: &[Track]) -> Self {
        let mut index = Self::default();
        for track in tracks {
            index.insert(track);
        }
        index
    }

    pub fn insert(&mut self, track: &Track) {
        if let Some(isrc) = track.usable_isrc() {
            self.by_isrc.insert(isrc.to_string());
        }
        self.by_key.insert(track_key(&track.title, &track.artist));
    }

    /// ISRC is checked first, then the normalized key.
    pub fn contains(&self, track: &Track) -> bool {
        if let Some(isrc) = track.usable_isrc() {
            if self.by_isrc.contains(isrc) {
                return true;
            }
        }
        self.by_key.contains(&track_key(&track.title, &track.artist))
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Tracks from `tracks` not present in `against`, keeping their order.
pub fn unmatched(tracks: &[Track], against: &TrackIndex) -> Vec<Track> {
    tracks
        .iter()
        .filter(|track| !against.contains(track))
        .cloned()
        .collect()
}
