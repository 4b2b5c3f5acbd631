use super::ConnectionSettings;
use crate::cli::UploadArgs;
use crate::config::Config;
use crate::manifest::Manifest;
use crate::remote::RemoteClient;
use crate::workflow::{UploadOptions, UploadStatus, WatchLoop, upload};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

pub async fn handle_upload_command(config: Config, args: UploadArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;

    let settings = ConnectionSettings::merge(args.connection, &config);
    let options = UploadOptions {
        lang: settings.lang,
        ..UploadOptions::from(&config)
    };
    let client: Arc<dyn RemoteClient> = Arc::new(settings.into_client()?);

    tracing::info!(app = %manifest.app, files = manifest.local_files().len(), "starting upload");

    let mut status = UploadStatus::default();
    let result = upload(client.as_ref(), &manifest, &mut status, &options).await;

    if !args.watch {
        return result.context("Upload failed");
    }

    // In watch mode a failed first run is already reported; keep watching.
    let stability_threshold = Duration::from_millis(config.watch.stability_threshold_ms);
    WatchLoop::new(client, Arc::new(manifest), options, stability_threshold)
        .run()
        .await
        .context("File watcher stopped")
}
