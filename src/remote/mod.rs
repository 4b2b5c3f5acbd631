pub mod kintone;
#[cfg(test)]
pub(crate) mod testing;

use crate::manifest::Scope;
use crate::utils::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// MIME type sent with an uploaded customization file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    JavaScript,
    Css,
}

impl ContentType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            ContentType::JavaScript => "text/javascript",
            ContentType::Css => "text/css",
        }
    }
}

/// A file stored on the platform, identified by its file key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    #[serde(rename = "fileKey")]
    pub file_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl RemoteFile {
    pub fn from_key(file_key: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
            name: None,
            content_type: None,
            size: None,
        }
    }
}

/// One entry of a customization list as the platform encodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CustomizeResource {
    #[serde(rename = "URL")]
    Url { url: String },
    #[serde(rename = "FILE")]
    File { file: RemoteFile },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DesktopResources {
    #[serde(default)]
    pub js: Vec<CustomizeResource>,
    #[serde(default)]
    pub css: Vec<CustomizeResource>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MobileResources {
    #[serde(default)]
    pub js: Vec<CustomizeResource>,
}

/// Customization settings of one app, both as read and as written.
///
/// `app` is absent in read responses and required in update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub desktop: DesktopResources,
    #[serde(default)]
    pub mobile: MobileResources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeployStatus {
    Processing,
    Success,
    Fail,
    Cancel,
}

#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Uploads one file's bytes and returns the handle the platform assigned.
    async fn attach_file(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        content_type: ContentType,
    ) -> AppResult<RemoteFile>;

    async fn update_customize_settings(&self, settings: &CustomizeSettings) -> AppResult<()>;

    async fn deploy_settings(&self, app: &str) -> AppResult<()>;

    async fn get_deploy_status(&self, app: &str) -> AppResult<DeployStatus>;

    async fn get_customize_settings(&self, app: &str) -> AppResult<CustomizeSettings>;

    async fn download_file(&self, file_key: &str) -> AppResult<Vec<u8>>;
}
