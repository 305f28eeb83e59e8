use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    cli::{fail, spawn_spinner},
    engine::{PlaylistEngine, PlaylistRef, TransferRequest},
    info, progress, success,
    types::TrackTableRow,
    warning,
};

pub async fn run(engine: &PlaylistEngine, cancel: &CancellationToken, request: TransferRequest) {
    let (tx, rx) = progress::channel(progress::DEFAULT_CAPACITY);
    let spinner = spawn_spinner(rx);

    let outcome = engine.run(cancel, tx, &request).await;
    let _ = spinner.await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => fail(e),
    };

    success!(
        "Created '{}' (ID: {}) with {}/{} tracks ({:.1}%)",
        result.destination.name,
        result.destination.id,
        result.success_count,
        result.total,
        result.success_rate
    );

    let unmatched = result.unmatched();
    if !unmatched.is_empty() {
        warning!("{} tracks could not be found:", unmatched.len());
        let rows: Vec<TrackTableRow> = unmatched.into_iter().map(TrackTableRow::from).collect();
        println!("{}", Table::new(rows));
    }
}

pub async fn diff(
    engine: &PlaylistEngine,
    cancel: &CancellationToken,
    source: PlaylistRef,
    dest: PlaylistRef,
) {
    let (tx, rx) = progress::channel(progress::DEFAULT_CAPACITY);
    let spinner = spawn_spinner(rx);

    let outcome = engine.diff(cancel, tx, &source, &dest).await;
    let _ = spinner.await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => fail(e),
    };

    info!(
        "'{}' vs '{}': {} matched, {} missing, {} extra",
        result.source.playlist.name,
        result.destination.playlist.name,
        result.matched_count,
        result.missing_in_dest.len(),
        result.extra_in_dest.len()
    );

    if result.missing_in_dest.is_empty() && result.extra_in_dest.is_empty() {
        success!("Playlists are in sync.");
        return;
    }

    if !result.missing_in_dest.is_empty() {
        warning!("Missing in destination:");
        let rows: Vec<TrackTableRow> = result
            .missing_in_dest
            .iter()
            .map(TrackTableRow::from)
            .collect();
        println!("{}", Table::new(rows));
    }
    if !result.extra_in_dest.is_empty() {
        warning!("Only in destination:");
        let rows: Vec<TrackTableRow> = result
            .extra_in_dest
            .iter()
            .map(TrackTableRow::from)
            .collect();
        println!("{}", Table::new(rows));
    }
}
