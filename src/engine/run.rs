use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{PlaylistEngine, TransferRequest, emit, guarded};
use crate::{
    error::{Error, Result},
    progress::{ProgressSender, ProgressUpdate},
    service::Service,
    types::{Playlist, PlaylistExport, TrackMatch, TransferResult},
    utils,
};

impl PlaylistEngine {
    /// Migrates one playlist: resolve and fetch the source, search every
    /// track on the destination, then create the destination playlist from
    /// the tracks that matched.
    ///
    /// Per-track misses are recorded in the result and never abort the run.
    /// A run where nothing matched fails with [`Error::EmptyResultSet`] and
    /// creates nothing.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        progress: ProgressSender,
        request: &TransferRequest,
    ) -> Result<TransferResult> {
        let source_svc = self.registry.resolve(&request.from)?;
        let dest_svc = self.registry.resolve(&request.to)?;

        tracing::info!(
            from = source_svc.name(),
            to = dest_svc.name(),
            source = %request.source,
            dest = %request.dest_name,
            "starting transfer"
        );

        emit(cancel, &progress, ProgressUpdate::resolving(&request.source)).await?;
        let source = resolve_source(cancel, &progress, &source_svc, &request.source).await?;

        let total = source.tracks.len();
        emit(
            cancel,
            &progress,
            ProgressUpdate::found_playlist(&source.playlist.name, total),
        )
        .await?;

        let mut matches = Vec::with_capacity(total);
        for (i, track) in source.tracks.iter().enumerate() {
            emit(cancel, &progress, ProgressUpdate::searching(i + 1, total, track)).await?;

            let found = guarded(cancel, dest_svc.search_track(&track.title, &track.artist)).await;
            let track_match = match found {
                Ok(matched) => TrackMatch {
                    original: track.clone(),
                    matched: Some(matched),
                    failure: None,
                },
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    tracing::warn!(title = %track.title, artist = %track.artist, error = %e, "track not found");
                    TrackMatch {
                        original: track.clone(),
                        matched: None,
                        failure: Some(e),
                    }
                }
            };
            matches.push(track_match);
        }

        let success_count = matches.iter().filter(|m| m.is_matched()).count();
        if success_count == 0 {
            tracing::warn!(total, "no tracks matched; not creating destination playlist");
            return Err(Error::EmptyResultSet { total });
        }

        emit(
            cancel,
            &progress,
            ProgressUpdate::creating_playlist(dest_svc.name()),
        )
        .await?;

        let dest_export = PlaylistExport {
            playlist: Playlist {
                id: String::new(),
                name: request.dest_name.clone(),
                description: format!(
                    "Migrated from {}: {}",
                    source_svc.name(),
                    source.playlist.name
                ),
                public: false,
                track_count: success_count,
            },
            tracks: matches.iter().filter_map(|m| m.matched.clone()).collect(),
        };

        let destination = guarded(cancel, dest_svc.import_playlist(&dest_export)).await?;

        emit(
            cancel,
            &progress,
            ProgressUpdate::done(format!(
                "Playlist created: {} (ID: {})",
                destination.name, destination.id
            )),
        )
        .await?;

        tracing::info!(
            playlist = %destination.id,
            matched = success_count,
            total,
            "transfer complete"
        );

        Ok(TransferResult {
            source,
            destination,
            total,
            success_count,
            failed_count: total - success_count,
            success_rate: utils::percentage(success_count, total),
            matches,
        })
    }
}

/// Treats `id_or_name` as an id first, then as an exact playlist name.
async fn resolve_source(
    cancel: &CancellationToken,
    progress: &ProgressSender,
    service: &Arc<dyn Service>,
    id_or_name: &str,
) -> Result<PlaylistExport> {
    emit(cancel, progress, ProgressUpdate::fetching_source(service.name())).await?;

    match guarded(cancel, service.export_playlist(id_or_name)).await {
        Ok(export) => return Ok(export),
        Err(Error::Cancelled) => return Err(Error::Cancelled),
        Err(e) => {
            tracing::info!(source = id_or_name, error = %e, "source not found by id, searching by name");
        }
    }

    let playlists = match guarded(cancel, service.get_playlists()).await {
        Ok(playlists) => playlists,
        Err(Error::Cancelled) => return Err(Error::Cancelled),
        Err(e) => {
            return Err(Error::ApiRequest(format!(
                "failed to list playlists on {}: {e}",
                service.name()
            )));
        }
    };

    let Some(found) = playlists.iter().find(|p| p.name == id_or_name) else {
        return Err(Error::PlaylistNotFound(format!(
            "no playlist with id or name '{id_or_name}' on {}",
            service.name()
        )));
    };

    guarded(cancel, service.export_playlist(&found.id)).await
}
