mod common;

use std::{sync::Arc, time::Duration};

use common::{FakeService, abc_tracks, playlist};
use plsync::{
    Error,
    engine::{PlaylistEngine, PlaylistRef, TransferRequest, compare},
    progress::{self, Phase},
    service::ServiceRegistry,
    types::Track,
};
use tokio_util::sync::CancellationToken;

fn request(source: &str) -> TransferRequest {
    TransferRequest {
        from: "src".to_string(),
        to: "dst".to_string(),
        source: source.to_string(),
        dest_name: "Mix (copy)".to_string(),
    }
}

fn engine_with(source: FakeService, dest: Arc<FakeService>) -> PlaylistEngine {
    let registry = ServiceRegistry::new()
        .with("src", Arc::new(source))
        .with("dst", dest);
    PlaylistEngine::new(registry)
}

fn dest_catalog() -> Vec<Track> {
    vec![
        Track::new("d1", "Song A", "Artist A").with_isrc("USAAA0000001"),
        Track::new("d2", "song b", "ARTIST  B"),
    ]
}

#[tokio::test]
async fn run_records_partial_matches() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let dest = Arc::new(FakeService::new("dst").with_catalog(dest_catalog()));
    let engine = engine_with(source, Arc::clone(&dest));

    let result = engine
        .run(&CancellationToken::new(), progress::discard(), &request("p1"))
        .await
        .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.failed_count, 1);
    assert!((result.success_rate - 66.666).abs() < 0.1);
    assert_eq!(result.matches.len(), 3);

    let unmatched: Vec<&str> = result.unmatched().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(unmatched, vec!["s3"]);
    assert!(matches!(
        result.matches[2].failure,
        Some(Error::TrackNotFound { .. })
    ));

    let imported = dest.imported();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].playlist.name, "Mix (copy)");
    assert_eq!(imported[0].playlist.description, "Migrated from src: Mix");
    assert!(!imported[0].playlist.public);
    let ids: Vec<&str> = imported[0].tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);
    assert_eq!(result.destination.id, "created-1");
}

#[tokio::test]
async fn run_without_any_match_creates_nothing() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let dest = Arc::new(FakeService::new("dst"));
    let engine = engine_with(source, Arc::clone(&dest));

    let err = engine
        .run(&CancellationToken::new(), progress::discard(), &request("p1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyResultSet { total: 3 }));
    assert!(dest.imported().is_empty());
    assert_eq!(dest.search_count(), 3);
}

#[tokio::test]
async fn run_resolves_source_by_exact_name() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Road Trip", abc_tracks()));
    let dest = Arc::new(FakeService::new("dst").with_catalog(abc_tracks()));
    let engine = engine_with(source, Arc::clone(&dest));

    let result = engine
        .run(&CancellationToken::new(), progress::discard(), &request("Road Trip"))
        .await
        .unwrap();

    assert_eq!(result.source.playlist.id, "p1");
    assert_eq!(result.success_count, 3);
    assert_eq!(result.success_rate, 100.0);
}

#[tokio::test]
async fn run_with_unknown_source_fails() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Road Trip", abc_tracks()));
    let dest = Arc::new(FakeService::new("dst").with_catalog(abc_tracks()));
    let engine = engine_with(source, Arc::clone(&dest));

    let err = engine
        .run(&CancellationToken::new(), progress::discard(), &request("road trip"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PlaylistNotFound(_)));
    assert_eq!(dest.search_count(), 0);
}

#[tokio::test]
async fn run_reports_listing_failure_as_api_error() {
    let source = FakeService::new("src")
        .with_playlist(playlist("p1", "Road Trip", abc_tracks()))
        .failing_listing();
    let dest = Arc::new(FakeService::new("dst"));
    let engine = engine_with(source, dest);

    let err = engine
        .run(&CancellationToken::new(), progress::discard(), &request("Road Trip"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ApiRequest(_)));
}

#[tokio::test]
async fn run_rejects_unknown_service_label() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let engine = engine_with(source, Arc::new(FakeService::new("dst")));

    let mut req = request("p1");
    req.to = "elsewhere".to_string();
    let err = engine
        .run(&CancellationToken::new(), progress::discard(), &req)
        .await
        .unwrap_err();

    match err {
        Error::InvalidArgument(msg) => {
            assert!(msg.contains("elsewhere"));
            assert!(msg.contains("dst"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn run_emits_phases_in_order_and_closes_stream() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let dest = Arc::new(FakeService::new("dst").with_catalog(dest_catalog()));
    let engine = engine_with(source, dest);

    // Capacity 1 makes every send wait on the consumer.
    let (tx, rx) = progress::channel(1);
    let collector = tokio::spawn(rx.collect());

    engine
        .run(&CancellationToken::new(), tx, &request("p1"))
        .await
        .unwrap();
    let updates = collector.await.unwrap();

    let phases: Vec<Phase> = updates.iter().map(|u| u.phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::ResolveSource,
            Phase::FetchSource,
            Phase::FetchSource,
            Phase::SearchTracks,
            Phase::SearchTracks,
            Phase::SearchTracks,
            Phase::CreatePlaylist,
            Phase::Done,
        ]
    );

    let steps: Vec<(usize, usize)> = updates
        .iter()
        .filter(|u| u.phase == Phase::SearchTracks)
        .map(|u| (u.step, u.total))
        .collect();
    assert_eq!(steps, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(updates[3].message, "[1/3] Artist A - Song A");
    assert!(updates[7].message.starts_with("Playlist created: Mix (copy)"));
}

#[tokio::test]
async fn run_stops_on_cancellation_and_closes_stream() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let dest = Arc::new(
        FakeService::new("dst")
            .with_catalog(abc_tracks())
            .with_search_delay(Duration::from_secs(30)),
    );
    let engine = Arc::new(engine_with(source, Arc::clone(&dest)));
    let cancel = CancellationToken::new();
    let (tx, mut rx) = progress::channel(progress::DEFAULT_CAPACITY);

    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        let cancel = cancel.clone();
        async move { engine.run(&cancel, tx, &request("p1")).await }
    });

    let mut seen = Vec::new();
    while let Some(update) = rx.recv().await {
        if update.phase == Phase::SearchTracks {
            cancel.cancel();
        }
        seen.push(update.phase);
    }

    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("run did not stop after cancellation")
        .unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!seen.contains(&Phase::CreatePlaylist));
    assert!(dest.search_count() <= 1);
    assert!(dest.imported().is_empty());
}

#[tokio::test]
async fn diff_of_identical_playlists_is_clean() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let dest = Arc::new(FakeService::new("dst").with_playlist(playlist("q1", "Mix", abc_tracks())));
    let engine = engine_with(source, dest);

    let result = engine
        .diff(
            &CancellationToken::new(),
            progress::discard(),
            &PlaylistRef::new("src", "p1"),
            &PlaylistRef::new("dst", "q1"),
        )
        .await
        .unwrap();

    assert_eq!(result.matched_count, 3);
    assert!(result.missing_in_dest.is_empty());
    assert!(result.extra_in_dest.is_empty());
}

#[tokio::test]
async fn diff_reports_missing_and_extra_tracks() {
    let dest_tracks = vec![
        Track::new("x2", "Song B (Remastered)", "Artist B").with_isrc("USBBB0000002"),
        Track::new("x3", "  song c ", "artist c"),
        Track::new("x4", "Song D", "Artist D"),
    ];
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let dest =
        Arc::new(FakeService::new("dst").with_playlist(playlist("q1", "Other", dest_tracks)));
    let engine = engine_with(source, dest);

    let (tx, rx) = progress::channel(progress::DEFAULT_CAPACITY);
    let collector = tokio::spawn(rx.collect());
    let result = engine
        .diff(
            &CancellationToken::new(),
            tx,
            &PlaylistRef::new("src", "p1"),
            &PlaylistRef::new("dst", "q1"),
        )
        .await
        .unwrap();
    let updates = collector.await.unwrap();

    assert_eq!(result.matched_count, 2);
    assert_eq!(result.missing_in_dest.len(), 1);
    assert_eq!(result.missing_in_dest[0].id, "s1");
    assert_eq!(result.extra_in_dest.len(), 1);
    assert_eq!(result.extra_in_dest[0].id, "x4");

    let phases: Vec<Phase> = updates.iter().map(|u| u.phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::FetchSource,
            Phase::FetchDest,
            Phase::Compare,
            Phase::Compare,
            Phase::Done
        ]
    );
}

#[tokio::test]
async fn diff_fails_when_a_playlist_cannot_be_fetched() {
    let source = FakeService::new("src").with_playlist(playlist("p1", "Mix", abc_tracks()));
    let engine = engine_with(source, Arc::new(FakeService::new("dst")));

    let err = engine
        .diff(
            &CancellationToken::new(),
            progress::discard(),
            &PlaylistRef::new("src", "p1"),
            &PlaylistRef::new("dst", "missing"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PlaylistNotFound(_)));
}

#[tokio::test]
async fn diff_rejects_unknown_label() {
    let engine = engine_with(FakeService::new("src"), Arc::new(FakeService::new("dst")));

    let err = engine
        .diff(
            &CancellationToken::new(),
            progress::discard(),
            &PlaylistRef::new("nowhere", "p1"),
            &PlaylistRef::new("dst", "q1"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn compare_is_symmetric() {
    let a = playlist(
        "a",
        "A",
        vec![
            Track::new("1", "One", "X"),
            Track::new("2", "Two", "X"),
            Track::new("3", "Three", "X"),
        ],
    );
    let b = playlist(
        "b",
        "B",
        vec![Track::new("9", "two", "x"), Track::new("8", "Four", "X")],
    );

    let forward = compare(a.clone(), b.clone());
    let backward = compare(b, a);

    assert_eq!(forward.missing_in_dest, backward.extra_in_dest);
    assert_eq!(forward.extra_in_dest, backward.missing_in_dest);
    assert_eq!(forward.matched_count, 1);
    assert_eq!(backward.matched_count, 1);
}

#[test]
fn compare_counts_duplicate_source_tracks_individually() {
    let a = playlist(
        "a",
        "A",
        vec![Track::new("1", "One", "X"), Track::new("2", "One", "X")],
    );
    let b = playlist("b", "B", vec![Track::new("9", "One", "X")]);

    let result = compare(a, b);

    assert_eq!(result.matched_count, 2);
    assert!(result.missing_in_dest.is_empty());
    assert!(result.extra_in_dest.is_empty());
}

#[test]
fn compare_with_empty_destination_reports_everything_missing() {
    let result = compare(playlist("a", "A", abc_tracks()), playlist("b", "B", vec![]));

    assert_eq!(result.matched_count, 0);
    assert_eq!(result.missing_in_dest.len(), 3);
    assert!(result.extra_in_dest.is_empty());
}
