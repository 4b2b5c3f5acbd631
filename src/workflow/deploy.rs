use crate::remote::{DeployStatus, RemoteClient};
use crate::utils::error::{AppError, AppResult};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployOptions {
    pub poll_interval: Duration,
    /// Upper bound on the whole wait. `None` polls until a terminal status.
    pub timeout: Option<Duration>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

/// Polls the deploy status of `app` until it succeeds.
///
/// The first poll happens immediately. `on_tick` runs once for every poll
/// that reports `PROCESSING`, after which the poller sleeps for
/// `poll_interval`. A `FAIL` or `CANCEL` status, or running past the
/// timeout, is returned as [`AppError::Deploy`]. Query failures propagate
/// unchanged.
pub async fn wait_until_deployed<F>(
    client: &dyn RemoteClient,
    app: &str,
    options: &DeployOptions,
    mut on_tick: F,
) -> AppResult<()>
where
    F: FnMut(),
{
    let deadline = options.timeout.map(|timeout| Instant::now() + timeout);

    loop {
        let status = client.get_deploy_status(app).await?;
        tracing::debug!(app, ?status, "deploy status polled");

        match status {
            DeployStatus::Success => return Ok(()),
            DeployStatus::Fail | DeployStatus::Cancel => {
                return Err(AppError::Deploy(format!(
                    "Deploy of app {} ended with status {:?}",
                    app, status
                )));
            }
            DeployStatus::Processing => on_tick(),
        }

        if let Some(deadline) = deadline
            && Instant::now() + options.poll_interval > deadline
        {
            return Err(AppError::Deploy(format!(
                "Deploy of app {} did not finish within {:?}",
                app,
                options.timeout.unwrap_or_default()
            )));
        }

        tokio::time::sleep(options.poll_interval).await;
    }
}
