//! Import an app's current customization into a local manifest plus the
//! downloaded files.

use super::{RetryDecision, RetryPolicy};
use crate::manifest::{DesktopFiles, ImportManifest, Manifest, MobileFiles};
use crate::messages::{Lang, Message};
use crate::remote::{CustomizeResource, RemoteClient, RemoteFile};
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::Notifier;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub lang: Lang,
    pub dest_dir: PathBuf,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStatus {
    pub retry_count: u32,
}

/// Downloads every file referenced by the app's settings into
/// `options.dest_dir` and writes `customize-manifest.json` next to them.
///
/// URL entries are copied through; file entries are rewritten to the path
/// they were downloaded to. Any failure restarts the whole import, within
/// the same retry policy as uploads.
pub async fn import_customize_setting(
    client: &dyn RemoteClient,
    manifest: &ImportManifest,
    status: &mut ImportStatus,
    options: &ImportOptions,
) -> AppResult<Manifest> {
    let notifier = Notifier::new(options.lang);

    loop {
        let err = match run_import(client, &manifest.app, &options.dest_dir).await {
            Ok(imported) => {
                notifier.success(Message::ImportFinished);
                return Ok(imported);
            }
            Err(err) => err,
        };

        status.retry_count += 1;
        tracing::debug!(app = %manifest.app, attempt = status.retry_count, error = %err, "import attempt failed");

        match options.retry.decide(status.retry_count, &err) {
            RetryDecision::Unauthenticated => {
                notifier.error(Message::AuthenticationFailed);
                return Err(err);
            }
            RetryDecision::Retry => {
                tokio::time::sleep(options.retry.backoff).await;
                notifier.warn(Message::Retrying);
            }
            RetryDecision::Exhausted => {
                notifier.error(Message::ImportFailed);
                return Err(err);
            }
        }
    }
}

async fn run_import(client: &dyn RemoteClient, app: &str, dest_dir: &Path) -> AppResult<Manifest> {
    let settings = client.get_customize_settings(app).await?;
    tracing::debug!(app, "customize settings fetched");

    let imported = Manifest {
        app: app.to_string(),
        scope: settings.scope,
        desktop: DesktopFiles {
            js: localize(client, &settings.desktop.js, &dest_dir.join("desktop").join("js")).await?,
            css: localize(client, &settings.desktop.css, &dest_dir.join("desktop").join("css")).await?,
        },
        mobile: MobileFiles {
            js: localize(client, &settings.mobile.js, &dest_dir.join("mobile").join("js")).await?,
        },
    };

    let written = imported.write_to(dest_dir).await?;
    tracing::info!(app, manifest = %written.display(), "manifest written");
    Ok(imported)
}

/// Downloads the file entries of one list into `dir`, in list order.
///
/// Each file gets its own name within `dir`; repeated remote names are
/// numbered (`index.js`, `index-1.js`, ...).
async fn localize(
    client: &dyn RemoteClient,
    resources: &[CustomizeResource],
    dir: &Path,
) -> AppResult<Vec<String>> {
    let mut entries = Vec::with_capacity(resources.len());
    let mut used = HashSet::new();

    for resource in resources {
        let entry = match resource {
            CustomizeResource::Url { url } => url.clone(),
            CustomizeResource::File { file } => {
                let contents = client.download_file(&file.file_key).await?;
                let path = dir.join(unique_name(local_name(file), &mut used));

                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| AppError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;
                tokio::fs::write(&path, contents)
                    .await
                    .map_err(|e| AppError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

                tracing::debug!(file_key = %file.file_key, path = %path.display(), "downloaded");
                path.to_string_lossy().into_owned()
            }
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Final path component of the remote name, so names cannot escape `dir`.
fn local_name(file: &RemoteFile) -> String {
    file.name
        .as_deref()
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.file_key.clone())
}

fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.clone());
    let ext = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    (1u32..)
        .map(|n| format!("{}-{}{}", stem, n, ext))
        .find(|candidate| used.insert(candidate.clone()))
        .unwrap_or(name)
}
