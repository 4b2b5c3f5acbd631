//! Re-upload a manifest whenever one of its local files changes.
//!
//! Filesystem events are debounced: a burst of events only counts once the
//! files have been quiet for the stability window. Uploads triggered this way
//! are serialised through a single-slot queue, so at most one upload runs and
//! at most one more waits behind it. Further triggers while the slot is full
//! are coalesced, since the queued run reads the files afresh anyway.

use super::upload::{UploadOptions, UploadStatus, upload};
use crate::manifest::Manifest;
use crate::messages::Message;
use crate::remote::RemoteClient;
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::Notifier;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, error::TrySendError};

pub struct WatchLoop {
    client: Arc<dyn RemoteClient>,
    manifest: Arc<Manifest>,
    options: UploadOptions,
    stability_threshold: Duration,
}

impl WatchLoop {
    pub fn new(
        client: Arc<dyn RemoteClient>,
        manifest: Arc<Manifest>,
        options: UploadOptions,
        stability_threshold: Duration,
    ) -> Self {
        Self {
            client,
            manifest,
            options,
            stability_threshold,
        }
    }

    /// Watches the manifest's local files until the process is terminated.
    pub async fn run(self) -> AppResult<()> {
        let files = watched_files(&self.manifest)?;
        if files.is_empty() {
            tracing::warn!(app = %self.manifest.app, "manifest has no local files to watch");
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let targets = files.clone();
        let mut watcher: RecommendedWatcher =
            recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) if is_content_change(&event.kind) => {
                    for path in event.paths {
                        if targets.contains(&path) {
                            let _ = tx.send(path);
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(?err, "file watcher error"),
            })
            .map_err(|e| AppError::System(format!("Failed to initialize file watcher: {}", e)))?;

        // Parent directories are watched so saves that replace the file are still seen.
        for dir in watched_dirs(&files) {
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| AppError::System(format!("Failed to watch {}: {}", dir.display(), e)))?;
            tracing::debug!(dir = %dir.display(), "watching directory");
        }

        Notifier::new(self.options.lang).info(Message::Watching);
        let result = self.drive(rx).await;
        drop(watcher);
        result
    }

    /// Consumes change events until the sender side closes, then waits for
    /// the queued uploads to finish.
    pub async fn drive(self, mut events: UnboundedReceiver<PathBuf>) -> AppResult<()> {
        let notifier = Notifier::new(self.options.lang);
        let (trigger, mut queued) = mpsc::channel::<()>(1);

        let client = Arc::clone(&self.client);
        let manifest = Arc::clone(&self.manifest);
        let options = self.options;
        let worker = tokio::spawn(async move {
            while queued.recv().await.is_some() {
                // Every change gets the whole pipeline again.
                let mut status = UploadStatus::default();
                if let Err(err) = upload(client.as_ref(), &manifest, &mut status, &options).await {
                    tracing::warn!(app = %manifest.app, error = %err, "upload after change failed");
                }
            }
        });

        while let Some(changed) = next_settled(&mut events, self.stability_threshold).await {
            for path in &changed {
                notifier.subject(&path.display().to_string(), Message::ChangeDetected);
            }

            match trigger.try_send(()) {
                Ok(()) => tracing::debug!(files = changed.len(), "upload queued"),
                Err(TrySendError::Full(())) => tracing::debug!("upload already queued, change coalesced"),
                Err(TrySendError::Closed(())) => break,
            }
        }

        drop(trigger);
        worker
            .await
            .map_err(|e| AppError::System(format!("Upload worker stopped: {}", e)))
    }
}

/// Waits for the next burst of events and returns it once no new event has
/// arrived for `quiet`. Returns `None` when the channel is closed and empty.
pub async fn next_settled<T: Ord>(
    events: &mut UnboundedReceiver<T>,
    quiet: Duration,
) -> Option<BTreeSet<T>> {
    let mut batch = BTreeSet::new();
    batch.insert(events.recv().await?);

    loop {
        match tokio::time::timeout(quiet, events.recv()).await {
            Ok(Some(event)) => {
                batch.insert(event);
            }
            Ok(None) | Err(_) => return Some(batch),
        }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}

/// Local manifest files as absolute paths, matching what the watcher reports.
fn watched_files(manifest: &Manifest) -> AppResult<BTreeSet<PathBuf>> {
    let cwd = std::env::current_dir()?;
    Ok(manifest
        .local_files()
        .into_iter()
        .map(|path| absolute(&cwd, &path))
        .collect())
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    if let (Some(parent), Some(name)) = (joined.parent(), joined.file_name())
        && let Ok(dir) = parent.canonicalize()
    {
        return dir.join(name);
    }
    joined
}

fn watched_dirs(files: &BTreeSet<PathBuf>) -> BTreeSet<PathBuf> {
    files
        .iter()
        .filter_map(|file| file.parent().map(Path::to_path_buf))
        .collect()
}
