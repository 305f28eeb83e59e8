use std::{
    collections::HashMap,
    num::NonZeroU32,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;

use super::{PlaylistEngine, emit, guarded};
use crate::{
    error::{Error, Result},
    formatter::{self, ExportFormat},
    progress::{Phase, ProgressSender, ProgressUpdate},
    service::Service,
    types::{BulkExportResult, PlaylistExportOutcome},
};

const DEFAULT_WORKERS: usize = 5;
const MAX_WORKERS: usize = 10;
const DEFAULT_RATE_LIMIT: f64 = 5.0;
const MANIFEST_FILE: &str = "export_manifest.json";

#[derive(Debug, Clone)]
pub struct BulkExportOptions {
    pub output_dir: PathBuf,
    /// Concurrent exports; `0` selects the default, values above 10 are capped.
    pub workers: usize,
    /// Export requests per second; non-positive selects the default.
    pub rate_limit: f64,
    pub format: ExportFormat,
}

impl BulkExportOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            workers: DEFAULT_WORKERS,
            rate_limit: DEFAULT_RATE_LIMIT,
            format: ExportFormat::default(),
        }
    }

    fn normalized(mut self) -> Self {
        if self.workers == 0 {
            self.workers = DEFAULT_WORKERS;
        }
        self.workers = self.workers.min(MAX_WORKERS);
        if self.rate_limit <= 0.0 || !self.rate_limit.is_finite() {
            self.rate_limit = DEFAULT_RATE_LIMIT;
        }
        self
    }

    fn quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs_f64(1.0 / self.rate_limit))
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
    }
}

impl PlaylistEngine {
    /// Exports many playlists from one service into `output_dir` in the
    /// chosen format, plus a manifest. A playlist that fails, including one
    /// whose worker panics, is recorded in the result and the rest continue.
    pub async fn bulk_export(
        &self,
        cancel: &CancellationToken,
        progress: ProgressSender,
        service: &str,
        ids: &[String],
        options: BulkExportOptions,
    ) -> Result<BulkExportResult> {
        let service = self.registry.resolve(service)?;
        let options = options.normalized();
        async_fs::create_dir_all(&options.output_dir).await?;

        let total = ids.len();
        emit(
            cancel,
            &progress,
            ProgressUpdate::new(
                Phase::ExportPlaylist,
                0,
                total,
                format!("Exporting {total} playlists from {}...", service.name()),
            ),
        )
        .await?;

        let permits = Arc::new(Semaphore::new(options.workers));
        let limiter: Arc<DefaultDirectRateLimiter> =
            Arc::new(RateLimiter::direct(options.quota()));
        let format = options.format;

        let mut workers = JoinSet::new();
        let mut spawned = HashMap::with_capacity(total);
        for (index, id) in ids.iter().cloned().enumerate() {
            let service = Arc::clone(&service);
            let permits = Arc::clone(&permits);
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            let output_dir = options.output_dir.clone();
            let task_id = id.clone();
            let handle = workers.spawn(async move {
                let worker = Worker {
                    service,
                    permits,
                    limiter,
                    output_dir,
                    format,
                };
                worker.export(&cancel, &task_id).await
            });
            spawned.insert(handle.id(), (index, id));
        }

        let mut results: Vec<(usize, PlaylistExportOutcome)> = Vec::with_capacity(total);
        while let Some(joined) = workers.join_next_with_id().await {
            let (task, outcome) = match joined {
                Ok(done) => done,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    tracing::error!(error = %e, "export worker panicked");
                    let failure = Error::ServiceUnavailable(format!("export task failed: {e}"));
                    (e.id(), Err(failure))
                }
            };
            let Some((index, id)) = spawned.remove(&task) else {
                continue;
            };

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(Error::Cancelled) => {
                    workers.abort_all();
                    return Err(Error::Cancelled);
                }
                Err(e) => PlaylistExportOutcome {
                    playlist_name: format!("Unknown ({id})"),
                    playlist_id: id,
                    success: false,
                    files: Vec::new(),
                    error: Some(e.to_string()),
                },
            };

            let step = results.len() + 1;
            let message = match &outcome.error {
                None => format!(
                    "[{step}/{total}] ✓ {} ({} files)",
                    outcome.playlist_name,
                    outcome.files.len()
                ),
                Some(e) => format!("[{step}/{total}] ✗ {}: {e}", outcome.playlist_name),
            };
            emit(
                cancel,
                &progress,
                ProgressUpdate::new(Phase::ExportPlaylist, step, total, message),
            )
            .await?;
            results.push((index, outcome));
        }

        results.sort_by_key(|(index, _)| *index);
        let results: Vec<PlaylistExportOutcome> = results.into_iter().map(|(_, o)| o).collect();
        let successful_exports = results.iter().filter(|o| o.success).count();

        let mut summary = BulkExportResult {
            total_playlists: total,
            successful_exports,
            failed_exports: results.len() - successful_exports,
            output_directory: options.output_dir.display().to_string(),
            manifest_path: None,
            format: format.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            results,
        };

        let manifest_path = options.output_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&summary)?;
        async_fs::write(&manifest_path, json).await?;
        summary.manifest_path = Some(manifest_path.display().to_string());

        emit(
            cancel,
            &progress,
            ProgressUpdate::done(format!(
                "Exported {}/{} playlists",
                summary.successful_exports, summary.total_playlists
            )),
        )
        .await?;

        Ok(summary)
    }
}

struct Worker {
    service: Arc<dyn Service>,
    permits: Arc<Semaphore>,
    limiter: Arc<DefaultDirectRateLimiter>,
    output_dir: PathBuf,
    format: ExportFormat,
}

impl Worker {
    async fn export(&self, cancel: &CancellationToken, id: &str) -> Result<PlaylistExportOutcome> {
        let _permit = guarded(cancel, async {
            self.permits
                .acquire()
                .await
                .map_err(|e| Error::ServiceUnavailable(e.to_string()))
        })
        .await?;

        guarded(cancel, async {
            self.limiter.until_ready().await;
            Ok(())
        })
        .await?;

        let export = guarded(cancel, self.service.export_playlist(id)).await?;
        let files = formatter::write_export(&export, &self.output_dir, self.format).await?;

        Ok(PlaylistExportOutcome {
            playlist_id: id.to_string(),
            playlist_name: export.playlist.name,
            success: true,
            files: files.iter().map(|f| f.display().to_string()).collect(),
            error: None,
        })
    }
}
