use crate::utils::output::OutputStyle;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed: {status} - {message}")]
    Request { status: u16, message: String },

    #[error("Deploy error: {0}")]
    Deploy(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl AppError {
    /// Credentials rejected by the platform. Waiting will not fix these.
    pub fn is_authentication(&self) -> bool {
        matches!(self, AppError::Authentication(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

/// Result type alias for consistent error handling across the application
pub type AppResult<T> = Result<T, AppError>;

pub fn report_error(err: &AppError) {
    match err {
        AppError::Authentication(msg) => {
            eprintln!("🔒 {}", OutputStyle::error(&format!("Authentication: {}", msg)));
        }
        AppError::Network(msg) => {
            eprintln!("🌐 {}", OutputStyle::error(&format!("Network: {}", msg)));
        }
        AppError::Request { status, message } => {
            eprintln!("🌐 {}", OutputStyle::error(&format!("Request ({}): {}", status, message)));
        }
        AppError::Deploy(msg) => {
            eprintln!("⚠️  {}", OutputStyle::warning(&format!("Deploy: {}", msg)));
        }
        AppError::Manifest(msg) => {
            eprintln!("📄 {}", OutputStyle::error(&format!("Manifest: {}", msg)));
        }
        AppError::Io(e) => {
            eprintln!("❌ {}", OutputStyle::error(e));
        }
        AppError::System(msg) => {
            eprintln!("❌ {}", OutputStyle::error(msg));
        }
    }
}
