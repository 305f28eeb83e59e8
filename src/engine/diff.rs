use tokio_util::sync::CancellationToken;

use super::{PlaylistEngine, PlaylistRef, emit, guarded};
use crate::{
    error::{Error, Result},
    matching::{TrackIndex, unmatched},
    progress::{ProgressSender, ProgressUpdate},
    types::{DiffResult, PlaylistExport},
};

impl PlaylistEngine {
    /// Compares two playlists that may live on different services.
    ///
    /// Only a failure to fetch either playlist prevents a result; a 0% match
    /// is still reported.
    pub async fn diff(
        &self,
        cancel: &CancellationToken,
        progress: ProgressSender,
        source: &PlaylistRef,
        dest: &PlaylistRef,
    ) -> Result<DiffResult> {
        let source_svc = self.registry.resolve(&source.service)?;
        let dest_svc = self.registry.resolve(&dest.service)?;

        tracing::info!(
            source = %source.playlist_id,
            dest = %dest.playlist_id,
            "transfer diff requested"
        );

        emit(cancel, &progress, ProgressUpdate::fetching_source(source_svc.name())).await?;
        let source_export = guarded(cancel, source_svc.export_playlist(&source.playlist_id))
            .await
            .map_err(|e| export_failure(e, "source", &source.playlist_id))?;

        emit(cancel, &progress, ProgressUpdate::fetching_dest(dest_svc.name())).await?;
        let dest_export = guarded(cancel, dest_svc.export_playlist(&dest.playlist_id))
            .await
            .map_err(|e| export_failure(e, "destination", &dest.playlist_id))?;

        emit(
            cancel,
            &progress,
            ProgressUpdate::comparing(1, 2, "Building track comparison maps..."),
        )
        .await?;
        emit(cancel, &progress, ProgressUpdate::comparing(2, 2, "Comparing tracks...")).await?;

        let result = compare(source_export, dest_export);

        emit(
            cancel,
            &progress,
            ProgressUpdate::done(format!(
                "Matched {}, missing {}, extra {}",
                result.matched_count,
                result.missing_in_dest.len(),
                result.extra_in_dest.len()
            )),
        )
        .await?;

        Ok(result)
    }
}

fn export_failure(e: Error, side: &str, id: &str) -> Error {
    match e {
        Error::Cancelled | Error::PlaylistNotFound(_) => e,
        other => Error::PlaylistNotFound(format!(
            "failed to export {side} playlist '{id}': {other}"
        )),
    }
}

/// Set-membership comparison in both directions. Each source track counts
/// once toward `matched_count` however many destination tracks it matches.
pub fn compare(source: PlaylistExport, destination: PlaylistExport) -> DiffResult {
    let dest_index = TrackIndex::build(&destination.tracks);
    let source_index = TrackIndex::build(&source.tracks);

    let missing_in_dest = unmatched(&source.tracks, &dest_index);
    let extra_in_dest = unmatched(&destination.tracks, &source_index);
    let matched_count = source.tracks.len() - missing_in_dest.len();

    DiffResult {
        source,
        destination,
        matched_count,
        missing_in_dest,
        extra_in_dest,
    }
}
