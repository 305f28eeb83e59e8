use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use crate::progress::{Phase, ProgressReceiver};

/// Renders progress updates on a spinner until the producer closes the queue.
pub fn spawn_spinner(mut rx: ProgressReceiver) -> JoinHandle<()> {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            tracing::debug!(phase = %update.phase, step = update.step, total = update.total, "{}", update.message);
            // Per-playlist export lines are worth keeping on screen.
            if update.phase == Phase::ExportPlaylist && update.step > 0 {
                pb.println(&update.message);
            }
            pb.set_message(update.message);
        }
        pb.finish_and_clear();
    })
}
