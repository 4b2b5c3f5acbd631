//! Scripted `RemoteClient` that records every call.

use super::{ContentType, CustomizeSettings, DeployStatus, RemoteClient, RemoteFile};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Attach,
    Update,
    Deploy,
    Status,
    GetSettings,
    Download,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Attach { file_name: String, content_type: ContentType },
    Update(CustomizeSettings),
    Deploy(String),
    Status(String),
    GetSettings(String),
    Download(String),
}

#[derive(Default)]
pub struct MockClient {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, VecDeque<AppError>>>,
    statuses: Mutex<VecDeque<DeployStatus>>,
    settings: Mutex<Option<CustomizeSettings>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next call of `op` fails with `err`. Queued failures are consumed in order.
    pub fn fail_next(&self, op: Op, err: AppError) {
        self.failures.lock().unwrap().entry(op).or_default().push_back(err);
    }

    /// Statuses returned by successive deploy status polls; `SUCCESS` once exhausted.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = DeployStatus>) -> Self {
        self.statuses.lock().unwrap().extend(statuses);
        self
    }

    pub fn with_settings(self, settings: CustomizeSettings) -> Self {
        *self.settings.lock().unwrap() = Some(settings);
        self
    }

    pub fn with_file(self, file_key: &str, contents: &[u8]) -> Self {
        self.files.lock().unwrap().insert(file_key.to_string(), contents.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|call| call.op() == op).count()
    }

    /// Key handed out for an attached file.
    pub fn key_for(file_name: &str) -> String {
        format!("key-{}", file_name)
    }

    fn record(&self, call: Call) -> AppResult<()> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Call::Attach { .. } => Op::Attach,
            Call::Update(_) => Op::Update,
            Call::Deploy(_) => Op::Deploy,
            Call::Status(_) => Op::Status,
            Call::GetSettings(_) => Op::GetSettings,
            Call::Download(_) => Op::Download,
        }
    }
}

#[async_trait]
impl RemoteClient for MockClient {
    async fn attach_file(
        &self,
        file_name: &str,
        _contents: Vec<u8>,
        content_type: ContentType,
    ) -> AppResult<RemoteFile> {
        self.record(Call::Attach {
            file_name: file_name.to_string(),
            content_type,
        })?;
        Ok(RemoteFile::from_key(Self::key_for(file_name)))
    }

    async fn update_customize_settings(&self, settings: &CustomizeSettings) -> AppResult<()> {
        self.record(Call::Update(settings.clone()))
    }

    async fn deploy_settings(&self, app: &str) -> AppResult<()> {
        self.record(Call::Deploy(app.to_string()))
    }

    async fn get_deploy_status(&self, app: &str) -> AppResult<DeployStatus> {
        self.record(Call::Status(app.to_string()))?;
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DeployStatus::Success))
    }

    async fn get_customize_settings(&self, app: &str) -> AppResult<CustomizeSettings> {
        self.record(Call::GetSettings(app.to_string()))?;
        self.settings
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Request {
                status: 404,
                message: format!("no settings for app {}", app),
            })
    }

    async fn download_file(&self, file_key: &str) -> AppResult<Vec<u8>> {
        self.record(Call::Download(file_key.to_string()))?;
        self.files
            .lock()
            .unwrap()
            .get(file_key)
            .cloned()
            .ok_or_else(|| AppError::Request {
                status: 404,
                message: format!("no file {}", file_key),
            })
    }
}
