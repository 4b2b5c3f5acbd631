use super::{ContentType, CustomizeSettings, DeployStatus, RemoteClient, RemoteFile};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Proxy, Response, StatusCode};
use serde::{Deserialize, Serialize};

const AUTH_HEADER: &str = "x-cybozu-authorization";
const AUTH_ERROR_CODE: &str = "CB_WA01";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub basic_auth: Option<BasicAuth>,
}

#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub proxy: Option<String>,
    pub guest_space_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    id: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileUploadResponse {
    #[serde(rename = "fileKey")]
    file_key: String,
}

#[derive(Debug, Serialize)]
struct DeployRequest<'a> {
    apps: Vec<DeployTarget<'a>>,
}

#[derive(Debug, Serialize)]
struct DeployTarget<'a> {
    app: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeployStatusResponse {
    apps: Vec<AppDeployStatus>,
}

#[derive(Debug, Deserialize)]
struct AppDeployStatus {
    app: String,
    status: DeployStatus,
}

/// REST client for one kintone domain.
pub struct KintoneClient {
    client: Client,
    base_url: String,
    api_prefix: String,
}

impl KintoneClient {
    pub fn new(domain: &str, credentials: Credentials, options: ClientOptions) -> AppResult<Self> {
        if domain.trim().is_empty() {
            return Err(AppError::System("Domain cannot be empty".to_string()));
        }

        let mut builder = Client::builder()
            .user_agent(concat!("customize-uploader/", env!("CARGO_PKG_VERSION")))
            .default_headers(auth_headers(&credentials)?);

        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.is_empty()) {
            let proxy = Proxy::all(proxy)
                .map_err(|e| AppError::System(format!("Invalid proxy '{}': {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            base_url: base_url(domain),
            api_prefix: api_prefix(options.guest_space_id),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, self.api_prefix, path)
    }
}

fn auth_headers(credentials: &Credentials) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    let token = STANDARD.encode(format!("{}:{}", credentials.username, credentials.password));
    headers.insert(AUTH_HEADER, header_value(&token)?);

    if let Some(basic) = &credentials.basic_auth {
        let token = STANDARD.encode(format!("{}:{}", basic.username, basic.password));
        headers.insert(AUTHORIZATION, header_value(&format!("Basic {}", token))?);
    }

    Ok(headers)
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::System(format!("Invalid credential header: {}", e)))
}

fn base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

fn api_prefix(guest_space_id: Option<u32>) -> String {
    match guest_space_id {
        Some(id) if id > 0 => format!("/k/guest/{}/v1", id),
        _ => "/k/v1".to_string(),
    }
}

fn send_error(action: &str, err: reqwest::Error) -> AppError {
    AppError::Network(format!("Failed to {}: {}", action, err))
}

/// Maps a non-success response body to the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> AppError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.as_deref());

    if status == StatusCode::UNAUTHORIZED || code == Some(AUTH_ERROR_CODE) {
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| status.to_string());
        return AppError::Authentication(message);
    }

    let message = match parsed {
        Some(ErrorBody { code, id, message }) => format!(
            "{} [{}] (id: {})",
            message.unwrap_or_default(),
            code.unwrap_or_default(),
            id.unwrap_or_default()
        ),
        None => body.to_string(),
    };

    AppError::Request {
        status: status.as_u16(),
        message,
    }
}

async fn check(response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(status, &body))
}

#[async_trait]
impl RemoteClient for KintoneClient {
    async fn attach_file(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        content_type: ContentType,
    ) -> AppResult<RemoteFile> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str(content_type.as_mime())
            .map_err(|e| AppError::System(format!("Invalid content type: {}", e)))?;

        let response = self
            .client
            .post(self.endpoint("file.json"))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|e| send_error("upload file", e))?;

        let uploaded: FileUploadResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Failed to parse upload response: {}", e)))?;

        tracing::debug!(file = file_name, file_key = %uploaded.file_key, "file attached");
        Ok(RemoteFile::from_key(uploaded.file_key))
    }

    async fn update_customize_settings(&self, settings: &CustomizeSettings) -> AppResult<()> {
        let response = self
            .client
            .put(self.endpoint("preview/app/customize.json"))
            .json(settings)
            .send()
            .await
            .map_err(|e| send_error("update customize settings", e))?;

        check(response).await?;
        Ok(())
    }

    async fn deploy_settings(&self, app: &str) -> AppResult<()> {
        let request = DeployRequest {
            apps: vec![DeployTarget { app }],
        };

        let response = self
            .client
            .post(self.endpoint("preview/app/deploy.json"))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("deploy settings", e))?;

        check(response).await?;
        Ok(())
    }

    async fn get_deploy_status(&self, app: &str) -> AppResult<DeployStatus> {
        let response = self
            .client
            .get(self.endpoint("preview/app/deploy.json"))
            .query(&[("apps[0]", app)])
            .send()
            .await
            .map_err(|e| send_error("get deploy status", e))?;

        let body: DeployStatusResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Failed to parse deploy status: {}", e)))?;

        body.apps
            .into_iter()
            .find(|status| status.app == app)
            .map(|status| status.status)
            .ok_or_else(|| AppError::Deploy(format!("No deploy status returned for app {}", app)))
    }

    async fn get_customize_settings(&self, app: &str) -> AppResult<CustomizeSettings> {
        let response = self
            .client
            .get(self.endpoint("app/customize.json"))
            .query(&[("app", app)])
            .send()
            .await
            .map_err(|e| send_error("get customize settings", e))?;

        check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Failed to parse customize settings: {}", e)))
    }

    async fn download_file(&self, file_key: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get(self.endpoint("file.json"))
            .query(&[("fileKey", file_key)])
            .send()
            .await
            .map_err(|e| send_error("download file", e))?;

        let bytes = check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read file body: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
            basic_auth: None,
        }
    }

    #[test]
    fn test_base_url_adds_https() {
        assert_eq!(base_url("example.cybozu.com"), "https://example.cybozu.com");
        assert_eq!(base_url("http://localhost:8080/"), "http://localhost:8080");
    }

    #[test]
    fn test_guest_space_prefix() {
        assert_eq!(api_prefix(None), "/k/v1");
        assert_eq!(api_prefix(Some(0)), "/k/v1");
        assert_eq!(api_prefix(Some(5)), "/k/guest/5/v1");
    }

    #[test]
    fn test_endpoint() {
        let client = KintoneClient::new(
            "example.cybozu.com",
            credentials(),
            ClientOptions {
                proxy: None,
                guest_space_id: Some(3),
            },
        )
        .unwrap();
        assert_eq!(
            client.endpoint("preview/app/deploy.json"),
            "https://example.cybozu.com/k/guest/3/v1/preview/app/deploy.json"
        );
    }

    #[test]
    fn test_auth_headers() {
        let mut creds = credentials();
        creds.basic_auth = Some(BasicAuth {
            username: "basic".to_string(),
            password: "pass".to_string(),
        });
        let headers = auth_headers(&creds).unwrap();
        assert_eq!(headers[AUTH_HEADER], "YWRtaW46c2VjcmV0");
        assert_eq!(headers[AUTHORIZATION], "Basic YmFzaWM6cGFzcw==");
    }

    #[test]
    fn test_empty_domain_rejected() {
        let result = KintoneClient::new("  ", credentials(), ClientOptions::default());
        assert!(matches!(result, Err(AppError::System(_))));
    }

    #[test]
    fn test_classify_failure() {
        let unauthorized = classify_failure(StatusCode::UNAUTHORIZED, "");
        assert!(unauthorized.is_authentication());

        let by_code = classify_failure(
            StatusCode::from_u16(520).unwrap(),
            r#"{"code":"CB_WA01","id":"x","message":"Password authentication failed."}"#,
        );
        assert_eq!(
            by_code,
            AppError::Authentication("Password authentication failed.".to_string())
        );

        let transient = classify_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"code":"GAIA_TM12","id":"abc","message":"busy"}"#,
        );
        assert_eq!(
            transient,
            AppError::Request {
                status: 503,
                message: "busy [GAIA_TM12] (id: abc)".to_string()
            }
        );

        let plain = classify_failure(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(
            plain,
            AppError::Request {
                status: 502,
                message: "upstream down".to_string()
            }
        );
    }
}
