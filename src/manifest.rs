//! The `customize-manifest.json` model.
//!
//! A manifest lists, per device and file kind, the files backing an app's
//! customization. Entries are either absolute URLs, which are handed to the
//! platform untouched, or local paths, which are uploaded first. Array order
//! is the load order applied by the platform.

use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "customize-manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPERCASE")]
pub enum Scope {
    #[default]
    All,
    Admin,
    None,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DesktopFiles {
    #[serde(default)]
    pub js: Vec<String>,
    #[serde(default)]
    pub css: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MobileFiles {
    #[serde(default)]
    pub js: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub app: String,
    /// Left out of the settings update when absent, keeping the app's current scope.
    #[serde(
        default,
        deserialize_with = "scope_or_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub desktop: DesktopFiles,
    #[serde(default)]
    pub mobile: MobileFiles,
}

/// Only the app id is needed to import an app's settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportManifest {
    pub app: String,
}

/// How a manifest entry is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRef<'a> {
    Url(&'a str),
    Local(&'a Path),
}

impl<'a> FileRef<'a> {
    pub fn classify(entry: &'a str) -> Self {
        if entry.starts_with("https://") || entry.starts_with("http://") {
            FileRef::Url(entry)
        } else {
            FileRef::Local(Path::new(entry))
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, FileRef::Url(_))
    }
}

impl Manifest {
    /// Scaffold used by `init`.
    pub fn empty(app: impl Into<String>, scope: Scope) -> Self {
        Self {
            app: app.into(),
            scope: Some(scope),
            desktop: DesktopFiles::default(),
            mobile: MobileFiles::default(),
        }
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        read_json(path)
    }

    /// Every non-URL entry, in desktop js, desktop css, mobile js order.
    pub fn local_files(&self) -> Vec<PathBuf> {
        self.desktop
            .js
            .iter()
            .chain(&self.desktop.css)
            .chain(&self.mobile.js)
            .filter_map(|entry| match FileRef::classify(entry) {
                FileRef::Local(path) => Some(path.to_path_buf()),
                FileRef::Url(_) => None,
            })
            .collect()
    }

    /// Writes `<dest_dir>/customize-manifest.json`, creating `dest_dir` if needed.
    pub async fn write_to(&self, dest_dir: &Path) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(MANIFEST_FILE_NAME);
        tokio::fs::write(&path, to_pretty_json(self)?).await?;
        Ok(path)
    }
}

impl ImportManifest {
    pub fn load(path: &Path) -> AppResult<Self> {
        read_json(path)
    }
}

/// An empty string, as older scaffolds wrote, counts as no scope.
fn scope_or_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Scope>, D::Error> {
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some("ALL") => Ok(Some(Scope::All)),
        Some("ADMIN") => Ok(Some(Scope::Admin)),
        Some("NONE") => Ok(Some(Scope::None)),
        Some(other) => Err(<D::Error as serde::de::Error>::unknown_variant(
            other,
            &["ALL", "ADMIN", "NONE"],
        )),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Manifest(format!("Failed to read {}: {}", path.display(), e)))?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::Manifest(format!("Failed to parse {}: {}", path.display(), e)))
}

/// JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> AppResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| AppError::System(format!("Failed to serialize manifest: {}", e)))?;
    String::from_utf8(buf).map_err(|e| AppError::System(e.to_string()))
}
