//! customize-uploader - upload and deploy JavaScript/CSS customizations for kintone apps
//!
//! This library provides the upload/deploy workflow with resumable retries,
//! the file-watch re-upload loop, and the import of an app's current
//! customization into a local manifest.

pub mod cli;
pub mod commands;
pub mod config;
pub mod manifest;
pub mod messages;
pub mod remote;
pub mod utils;
pub mod workflow;

// Re-export core types and traits for easier use
pub use manifest::{FileRef, ImportManifest, Manifest, Scope};
pub use remote::{RemoteClient, kintone::KintoneClient};
pub use utils::error::{AppError, AppResult};
pub use workflow::{
    ImportStatus, UploadStatus, WatchLoop, import_customize_setting, upload, wait_until_deployed,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
