use plsync::{
    progress::{self, Phase, ProgressUpdate},
    types::Track,
};

#[tokio::test]
async fn stream_closes_when_sender_is_dropped() {
    let (tx, rx) = progress::channel(2);
    let consumer = tokio::spawn(rx.collect());

    for i in 1..=5 {
        tx.send(ProgressUpdate::new(Phase::SearchTracks, i, 5, format!("step {i}")))
            .await;
    }
    drop(tx);

    let updates = consumer.await.unwrap();
    let steps: Vec<usize> = updates.iter().map(|u| u.step).collect();
    assert_eq!(steps, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn send_after_consumer_is_gone_does_not_block() {
    let (tx, rx) = progress::channel(1);
    drop(rx);

    tx.send(ProgressUpdate::done("one")).await;
    tx.send(ProgressUpdate::done("two")).await;

    progress::discard().send(ProgressUpdate::done("three")).await;
}

#[test]
fn searching_message_names_the_track() {
    let track = Track::new("1", "Song", "Artist");
    let update = ProgressUpdate::searching(2, 7, &track);

    assert_eq!(update.phase, Phase::SearchTracks);
    assert_eq!((update.step, update.total), (2, 7));
    assert_eq!(update.message, "[2/7] Artist - Song");
}

#[test]
fn phases_display_as_snake_case() {
    assert_eq!(Phase::ResolveSource.to_string(), "resolve_source");
    assert_eq!(Phase::ExportPlaylist.to_string(), "export_playlist");
    assert_eq!(Phase::Done.to_string(), "done");
}
