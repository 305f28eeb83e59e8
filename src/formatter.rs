//! Renders a playlist export to disk in one of several formats.
//!
//! | format     | files                                                |
//! |------------|------------------------------------------------------|
//! | `json`     | `<id>.json`                                          |
//! | `csv`      | `<id>_tracks.csv` and `<id>_metadata.json`           |
//! | `markdown` | `<id>/README.md`                                     |
//! | `txt`      | `<id>_tracks.txt`                                    |

use std::{
    fmt::{self, Write as _},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    types::PlaylistExport,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Markdown,
    Txt,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Txt => "txt",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "txt" | "text" => Ok(ExportFormat::Txt),
            other => Err(format!(
                "unknown export format '{other}' (expected json, csv, markdown or txt)"
            )),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Artist")]
    artist: &'a str,
    #[serde(rename = "Album")]
    album: &'a str,
    #[serde(rename = "Duration")]
    duration: u32,
    #[serde(rename = "ISRC")]
    isrc: &'a str,
}

pub fn to_json(export: &PlaylistExport) -> Result<String> {
    Ok(serde_json::to_string_pretty(export)?)
}

/// One row per track with a header line.
pub fn to_csv(export: &PlaylistExport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for track in &export.tracks {
        writer
            .serialize(CsvRow {
                id: &track.id,
                title: &track.title,
                artist: &track.artist,
                album: track.album.as_deref().unwrap_or_default(),
                duration: track.duration,
                isrc: track.isrc.as_deref().unwrap_or_default(),
            })
            .map_err(csv_error)?;
    }
    if export.tracks.is_empty() {
        writer
            .write_record(["ID", "Title", "Artist", "Album", "Duration", "ISRC"])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::InvalidArgument(format!("CSV writer error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidArgument(format!("CSV output: {e}")))
}

pub fn to_markdown(export: &PlaylistExport) -> String {
    let playlist = &export.playlist;
    let mut out = format!("# {}\n\n", playlist.name);
    if !playlist.description.is_empty() {
        let _ = write!(out, "**Description**: {}\n\n", playlist.description);
    }
    let _ = writeln!(out, "**Tracks**: {}", export.tracks.len());
    let _ = write!(
        out,
        "**Visibility**: {}\n\n",
        if playlist.public { "Public" } else { "Private" }
    );

    out.push_str("## Tracks\n\n");
    for (i, track) in export.tracks.iter().enumerate() {
        let album = track
            .album
            .as_deref()
            .filter(|a| !a.is_empty())
            .map(|a| format!(" ({a})"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}. {} - {}{} [{}]",
            i + 1,
            track.artist,
            track.title,
            album,
            format_duration(track.duration)
        );
    }
    out
}

pub fn to_text(export: &PlaylistExport) -> String {
    let playlist = &export.playlist;
    let mut out = format!("Playlist: {}\n", playlist.name);
    if !playlist.description.is_empty() {
        let _ = writeln!(out, "Description: {}", playlist.description);
    }
    let _ = write!(out, "Tracks: {}\n\n", export.tracks.len());
    for (i, track) in export.tracks.iter().enumerate() {
        let _ = writeln!(out, "{}. {} - {}", i + 1, track.artist, track.title);
    }
    out
}

/// `m:ss`, or `h:mm:ss` from an hour up.
pub fn format_duration(secs: u32) -> String {
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Keeps provider ids from escaping the output directory.
pub fn file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}

/// Writes `export` under `dir` and returns the files created.
pub async fn write_export(
    export: &PlaylistExport,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let stem = file_stem(&export.playlist.id);

    match format {
        ExportFormat::Json => {
            let path = dir.join(format!("{stem}.json"));
            async_fs::write(&path, to_json(export)?).await?;
            Ok(vec![path])
        }
        ExportFormat::Csv => {
            let tracks = dir.join(format!("{stem}_tracks.csv"));
            async_fs::write(&tracks, to_csv(export)?).await?;
            let metadata = dir.join(format!("{stem}_metadata.json"));
            async_fs::write(&metadata, serde_json::to_string_pretty(&export.playlist)?).await?;
            Ok(vec![tracks, metadata])
        }
        ExportFormat::Markdown => {
            let folder = dir.join(&stem);
            async_fs::create_dir_all(&folder).await?;
            let readme = folder.join("README.md");
            async_fs::write(&readme, to_markdown(export)).await?;
            Ok(vec![readme])
        }
        ExportFormat::Txt => {
            let path = dir.join(format!("{stem}_tracks.txt"));
            async_fs::write(&path, to_text(export)).await?;
            Ok(vec![path])
        }
    }
}

fn csv_error(e: csv::Error) -> Error {
    Error::InvalidArgument(format!("CSV export failed: {e}"))
}
