//! Remote workflows driven against a [`RemoteClient`](crate::remote::RemoteClient).

pub mod deploy;
pub mod import;
pub mod upload;
pub mod watch;

use crate::config::Config;
use crate::utils::error::AppError;
use std::time::Duration;

pub use deploy::{DeployOptions, wait_until_deployed};
pub use import::{ImportOptions, ImportStatus, import_customize_setting};
pub use upload::{UploadOptions, UploadStatus, upload};
pub use watch::WatchLoop;

/// Bounded retry with a fixed backoff, shared by upload and import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    /// Credentials were rejected; retrying cannot help.
    Unauthenticated,
    Exhausted,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// `failed_attempts` counts the attempt that just failed.
    pub fn decide(&self, failed_attempts: u32, err: &AppError) -> RetryDecision {
        if err.is_authentication() {
            RetryDecision::Unauthenticated
        } else if failed_attempts < self.max_attempts {
            RetryDecision::Retry
        } else {
            RetryDecision::Exhausted
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_attempts: config.retry.max_attempts,
            backoff: Duration::from_millis(config.retry.backoff_ms),
        }
    }
}

impl From<&Config> for UploadOptions {
    fn from(config: &Config) -> Self {
        Self {
            lang: config.general.lang,
            retry: RetryPolicy::from(config),
            deploy: DeployOptions::from(config),
        }
    }
}

impl From<&Config> for DeployOptions {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.deploy.poll_interval_ms),
            timeout: match config.deploy.timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}
