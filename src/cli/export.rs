use tokio_util::sync::CancellationToken;

use crate::{
    cli::{fail, spawn_spinner},
    engine::{BulkExportOptions, PlaylistEngine},
    progress, success, warning,
};

pub async fn export(
    engine: &PlaylistEngine,
    cancel: &CancellationToken,
    label: &str,
    ids: &[String],
    options: BulkExportOptions,
) {
    let (tx, rx) = progress::channel(progress::DEFAULT_CAPACITY);
    let spinner = spawn_spinner(rx);

    let outcome = engine.bulk_export(cancel, tx, label, ids, options).await;
    let _ = spinner.await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => fail(e),
    };

    if result.failed_exports > 0 {
        warning!(
            "{} of {} playlists failed to export",
            result.failed_exports,
            result.total_playlists
        );
    }
    success!(
        "Exported {}/{} playlists as {} to {}",
        result.successful_exports,
        result.total_playlists,
        result.format,
        result.output_directory
    );
    if let Some(manifest) = &result.manifest_path {
        success!("Manifest written to {}", manifest);
    }
}
