//! Upload a manifest's files, update the app's customization settings and
//! deploy them, resuming from the last completed step on retry.

use super::deploy::{DeployOptions, wait_until_deployed};
use super::{RetryDecision, RetryPolicy};
use crate::manifest::{FileRef, Manifest};
use crate::messages::{Lang, Message};
use crate::remote::{
    ContentType, CustomizeResource, CustomizeSettings, DesktopResources, MobileResources,
    RemoteClient,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::Notifier;
use futures_util::future::try_join_all;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    pub lang: Lang,
    pub retry: RetryPolicy,
    pub deploy: DeployOptions,
}

/// Checkpoint of one upload invocation. Completed steps are never redone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadStatus {
    pub attempt_count: u32,
    pub prepared_body: Option<CustomizeSettings>,
    pub settings_updated: bool,
    pub deployed: bool,
}

impl UploadStatus {
    pub fn is_complete(&self) -> bool {
        self.prepared_body.is_some() && self.settings_updated && self.deployed
    }
}

/// Runs prepare, update and deploy for `manifest`, retrying per `options.retry`.
///
/// Each failure bumps `status.attempt_count`. Authentication failures end the
/// run at once; other failures are retried after the backoff until the
/// attempt ceiling is reached. The final error is left for the caller to
/// report.
pub async fn upload(
    client: &dyn RemoteClient,
    manifest: &Manifest,
    status: &mut UploadStatus,
    options: &UploadOptions,
) -> AppResult<()> {
    let notifier = Notifier::new(options.lang);

    loop {
        let err = match run_steps(client, manifest, status, options, &notifier).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        status.attempt_count += 1;
        tracing::debug!(app = %manifest.app, attempt = status.attempt_count, error = %err, "upload attempt failed");

        match options.retry.decide(status.attempt_count, &err) {
            RetryDecision::Unauthenticated => {
                notifier.error(Message::AuthenticationFailed);
                return Err(err);
            }
            RetryDecision::Retry => {
                tokio::time::sleep(options.retry.backoff).await;
                notifier.warn(Message::Retrying);
            }
            RetryDecision::Exhausted => return Err(err),
        }
    }
}

async fn run_steps(
    client: &dyn RemoteClient,
    manifest: &Manifest,
    status: &mut UploadStatus,
    options: &UploadOptions,
    notifier: &Notifier,
) -> AppResult<()> {
    let app = manifest.app.as_str();

    if status.prepared_body.is_none() {
        let body = prepare(client, manifest, notifier)
            .await
            .inspect_err(|_| notifier.error(Message::FilesUploadFailed))?;
        status.prepared_body = Some(body);
        notifier.success(Message::FilesUploaded);
    }

    if !status.settings_updated {
        let body = status
            .prepared_body
            .as_ref()
            .ok_or_else(|| AppError::System("Upload body was not prepared".to_string()))?;
        client
            .update_customize_settings(body)
            .await
            .inspect_err(|_| notifier.error(Message::SettingsUpdateFailed))?;
        status.settings_updated = true;
        notifier.success(Message::SettingsUpdated);
    }

    if !status.deployed {
        deploy(client, app, &options.deploy, notifier)
            .await
            .inspect_err(|_| notifier.error(Message::DeployFailed))?;
        status.deployed = true;
        notifier.success(Message::Deployed);
    }

    tracing::info!(app, "customization deployed");
    Ok(())
}

async fn deploy(
    client: &dyn RemoteClient,
    app: &str,
    options: &DeployOptions,
    notifier: &Notifier,
) -> AppResult<()> {
    client.deploy_settings(app).await?;
    wait_until_deployed(client, app, options, || notifier.info(Message::Deploying)).await
}

/// Builds the settings body, uploading every local file in the manifest.
///
/// All three lists upload concurrently, as do the files within a list.
/// Positions are preserved regardless of completion order.
pub async fn prepare(
    client: &dyn RemoteClient,
    manifest: &Manifest,
    notifier: &Notifier,
) -> AppResult<CustomizeSettings> {
    let (desktop_js, desktop_css, mobile_js) = tokio::try_join!(
        prepare_list(client, &manifest.desktop.js, ContentType::JavaScript, notifier),
        prepare_list(client, &manifest.desktop.css, ContentType::Css, notifier),
        prepare_list(client, &manifest.mobile.js, ContentType::JavaScript, notifier),
    )?;

    Ok(CustomizeSettings {
        app: Some(manifest.app.clone()),
        scope: manifest.scope,
        desktop: DesktopResources {
            js: desktop_js,
            css: desktop_css,
        },
        mobile: MobileResources { js: mobile_js },
    })
}

async fn prepare_list(
    client: &dyn RemoteClient,
    entries: &[String],
    content_type: ContentType,
    notifier: &Notifier,
) -> AppResult<Vec<CustomizeResource>> {
    try_join_all(
        entries
            .iter()
            .map(|entry| prepare_entry(client, entry, content_type, notifier)),
    )
    .await
}

async fn prepare_entry(
    client: &dyn RemoteClient,
    entry: &str,
    content_type: ContentType,
    notifier: &Notifier,
) -> AppResult<CustomizeResource> {
    let path = match FileRef::classify(entry) {
        FileRef::Url(url) => return Ok(CustomizeResource::Url { url: url.to_string() }),
        FileRef::Local(path) => path,
    };

    let contents = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Io(format!("Failed to read {}: {}", entry, e)))?;

    let file = client
        .attach_file(&upload_name(path), contents, content_type)
        .await?;

    tracing::debug!(file = entry, file_key = %file.file_key, "uploaded");
    notifier.subject(entry, Message::Uploaded);
    Ok(CustomizeResource::File { file })
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{DesktopFiles, MobileFiles, Scope};
    use crate::remote::RemoteFile;
    use crate::remote::testing::{Call, MockClient, Op};
    use std::time::Duration;

    fn url_manifest() -> Manifest {
        Manifest {
            app: "1".to_string(),
            scope: Some(Scope::All),
            desktop: DesktopFiles {
                js: vec!["https://js.cybozu.com/vuejs/v2.5.17/vue.min.js".to_string()],
                css: vec!["https://cdn.example.com/app.css".to_string()],
            },
            mobile: MobileFiles {
                js: vec!["https://js.cybozu.com/jquery/3.3.1/jquery.min.js".to_string()],
            },
        }
    }

    fn file(key: &str) -> CustomizeResource {
        CustomizeResource::File { file: RemoteFile::from_key(key) }
    }

    fn url(url: &str) -> CustomizeResource {
        CustomizeResource::Url { url: url.to_string() }
    }

    #[tokio::test(start_paused = true)]
    async fn test_url_only_manifest_skips_attach() {
        let client = MockClient::new();
        let mut status = UploadStatus::default();

        upload(&client, &url_manifest(), &mut status, &UploadOptions::default())
            .await
            .unwrap();

        let ops: Vec<Op> = client.calls().iter().map(Call::op).collect();
        assert_eq!(ops, vec![Op::Update, Op::Deploy, Op::Status]);
        assert!(status.is_complete());
        assert_eq!(status.attempt_count, 0);

        let body = status.prepared_body.unwrap();
        assert_eq!(body.app.as_deref(), Some("1"));
        assert_eq!(body.desktop.js, vec![url("https://js.cybozu.com/vuejs/v2.5.17/vue.min.js")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_scope_is_not_sent() {
        let manifest: Manifest = serde_json::from_str(
            r#"{ "app": "3", "desktop": { "js": ["https://cdn.example.com/a.js"] }, "mobile": { "js": [] } }"#,
        )
        .unwrap();
        let client = MockClient::new();
        let mut status = UploadStatus::default();

        upload(&client, &manifest, &mut status, &UploadOptions::default())
            .await
            .unwrap();

        let sent = client
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Call::Update(body) => Some(body),
                _ => None,
            })
            .unwrap();
        assert_eq!(sent.scope, None);

        let json = serde_json::to_value(&sent).unwrap();
        assert_eq!(json["app"], "3");
        assert!(json.get("scope").is_none());
    }

    #[tokio::test]
    async fn test_local_files_are_attached_in_position() {
        let dir = tempfile::tempdir().unwrap();
        let local = |name: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("/* {} */", name)).unwrap();
            path.to_string_lossy().into_owned()
        };

        let manifest = Manifest {
            app: "9".to_string(),
            scope: Some(Scope::Admin),
            desktop: DesktopFiles {
                js: vec![
                    local("a.js"),
                    "https://cdn.example.com/lib.js".to_string(),
                    local("b.js"),
                ],
                css: vec![local("style.css")],
            },
            mobile: MobileFiles {
                js: vec!["https://cdn.example.com/m.js".to_string(), local("m.js")],
            },
        };

        let client = MockClient::new();
        let mut status = UploadStatus::default();
        upload(&client, &manifest, &mut status, &UploadOptions::default())
            .await
            .unwrap();

        let mut attached: Vec<(String, ContentType)> = client
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Attach { file_name, content_type } => Some((file_name, content_type)),
                _ => None,
            })
            .collect();
        attached.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            attached,
            vec![
                ("a.js".to_string(), ContentType::JavaScript),
                ("b.js".to_string(), ContentType::JavaScript),
                ("m.js".to_string(), ContentType::JavaScript),
                ("style.css".to_string(), ContentType::Css),
            ]
        );

        let body = status.prepared_body.unwrap();
        assert_eq!(body.scope, Some(Scope::Admin));
        assert_eq!(
            body.desktop.js,
            vec![file("key-a.js"), url("https://cdn.example.com/lib.js"), file("key-b.js")]
        );
        assert_eq!(body.desktop.css, vec![file("key-style.css")]);
        assert_eq!(body.mobile.js, vec![url("https://cdn.example.com/m.js"), file("key-m.js")]);
        assert_eq!(client.calls().iter().filter(|c| matches!(c, Call::Update(b) if *b == body)).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_resumes_after_completed_steps() {
        let client = MockClient::new();
        client.fail_next(Op::Deploy, AppError::Request { status: 503, message: "busy".into() });
        client.fail_next(Op::Deploy, AppError::Network("reset".into()));
        let mut status = UploadStatus::default();

        upload(&client, &url_manifest(), &mut status, &UploadOptions::default())
            .await
            .unwrap();

        assert_eq!(client.count(Op::Update), 1);
        assert_eq!(client.count(Op::Deploy), 3);
        assert_eq!(status.attempt_count, 2);
        assert!(status.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepared_body_survives_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        std::fs::write(&path, "console.log(1);").unwrap();
        let mut manifest = url_manifest();
        manifest.desktop.js.push(path.to_string_lossy().into_owned());

        let client = MockClient::new();
        client.fail_next(Op::Update, AppError::Request { status: 500, message: "oops".into() });
        let mut status = UploadStatus::default();

        upload(&client, &manifest, &mut status, &UploadOptions::default())
            .await
            .unwrap();

        assert_eq!(client.count(Op::Attach), 1);
        assert_eq!(client.count(Op::Update), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_failure_is_terminal() {
        let client = MockClient::new();
        client.fail_next(Op::Update, AppError::Authentication("denied".into()));
        let mut status = UploadStatus::default();

        let err = upload(&client, &url_manifest(), &mut status, &UploadOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_authentication());
        assert_eq!(status.attempt_count, 1);
        assert_eq!(client.count(Op::Update), 1);
        assert_eq!(client.count(Op::Deploy), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_failure_after_retries_stops_immediately() {
        let client = MockClient::new();
        client.fail_next(Op::Deploy, AppError::Network("reset".into()));
        client.fail_next(Op::Deploy, AppError::Authentication("expired".into()));
        let options = UploadOptions {
            retry: RetryPolicy { max_attempts: 10, backoff: Duration::from_secs(1) },
            ..UploadOptions::default()
        };
        let mut status = UploadStatus::default();

        let err = upload(&client, &url_manifest(), &mut status, &options)
            .await
            .unwrap_err();

        assert!(err.is_authentication());
        assert_eq!(client.count(Op::Deploy), 2);
        assert_eq!(status.attempt_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_three_attempts() {
        let client = MockClient::new();
        for _ in 0..5 {
            client.fail_next(Op::Update, AppError::Network("unreachable".into()));
        }
        let mut status = UploadStatus::default();

        let started = tokio::time::Instant::now();
        let err = upload(&client, &url_manifest(), &mut status, &UploadOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Network("unreachable".into()));
        assert_eq!(client.count(Op::Update), 3);
        assert_eq!(status.attempt_count, 3);
        assert!(!status.settings_updated);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_local_file_counts_as_attempt() {
        let mut manifest = url_manifest();
        manifest.mobile.js.push("does/not/exist.js".to_string());
        let client = MockClient::new();
        let mut status = UploadStatus::default();

        let err = upload(&client, &manifest, &mut status, &UploadOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Io(msg) if msg.contains("does/not/exist.js")));
        assert_eq!(status.attempt_count, 3);
        assert!(status.prepared_body.is_none());
        assert_eq!(client.count(Op::Update), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_status_makes_no_calls() {
        let client = MockClient::new();
        let mut status = UploadStatus {
            attempt_count: 1,
            prepared_body: Some(CustomizeSettings {
                app: Some("1".into()),
                scope: Some(Scope::All),
                desktop: DesktopResources::default(),
                mobile: MobileResources::default(),
            }),
            settings_updated: true,
            deployed: true,
        };

        upload(&client, &url_manifest(), &mut status, &UploadOptions::default())
            .await
            .unwrap();

        assert!(client.calls().is_empty());
    }
}
