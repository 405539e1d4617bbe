use reqwest::StatusCode;

/// Failure of a single backend call, tagged by what recovery makes sense.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized ({status})")]
    Unauthorized { status: u16 },

    #[error("Rejected request: {status} {status_text}")]
    Validation { status: u16, status_text: String },

    #[error("Server fault: {status} {status_text}")]
    ServerFault { status: u16, status_text: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-2xx status.
    pub fn from_status(status: StatusCode) -> Self {
        let code = status.as_u16();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApiError::Unauthorized { status: code }
            }
            s if s.is_client_error() => ApiError::Validation {
                status: code,
                status_text,
            },
            _ => ApiError::ServerFault {
                status: code,
                status_text,
            },
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status }
            | ApiError::Validation { status, .. }
            | ApiError::ServerFault { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    pub fn status_text(&self) -> String {
        match self {
            ApiError::Unauthorized { status } => StatusCode::from_u16(*status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unauthorized")
                .to_string(),
            ApiError::Validation { status_text, .. }
            | ApiError::ServerFault { status_text, .. } => status_text.clone(),
            ApiError::Network(e) => e.to_string(),
            ApiError::Decode(msg) => msg.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api(e) if e.is_unauthorized())
    }

    /// Short kind label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Api(ApiError::Unauthorized { .. }) => "unauthorized",
            AppError::Api(ApiError::Validation { .. }) | AppError::InvalidInput(_) => "validation",
            AppError::Api(ApiError::ServerFault { .. }) | AppError::Api(ApiError::Decode(_)) => {
                "server_fault"
            }
            AppError::Api(ApiError::Network(_)) => "network",
            AppError::Storage(_) | AppError::Corrupt(_) => "storage",
            AppError::Config(_) => "config",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
