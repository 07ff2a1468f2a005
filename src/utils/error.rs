use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Token signing failed: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Credentials error: {message}")]
    CredentialsError { message: String },

    #[error("Sheets API returned {status}: {message}")]
    SheetApiError { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Authentication,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// HTTP 狀態碼中可重試的部分（限流與暫時性伺服器錯誤）
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::ConfigError {
            message: message.into(),
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        SyncError::CredentialsError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::HttpError(_) => ErrorCategory::Network,
            SyncError::SheetApiError { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Authentication
            }
            SyncError::SheetApiError { .. } => ErrorCategory::Network,
            SyncError::IoError(_) => ErrorCategory::Storage,
            SyncError::JwtError(_) | SyncError::CredentialsError { .. } => {
                ErrorCategory::Authentication
            }
            SyncError::TomlError(_)
            | SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SyncError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if self.is_transient() {
            return ErrorSeverity::Medium;
        }
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Authentication => {
                ErrorSeverity::Critical
            }
            ErrorCategory::Network | ErrorCategory::Storage | ErrorCategory::Data => {
                ErrorSeverity::High
            }
        }
    }

    /// 是否值得重試：限流、5xx、連線或逾時錯誤
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::SheetApiError { status, .. } => is_transient_status(*status),
            SyncError::HttpError(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status()
                        .map(|s| is_transient_status(s.as_u16()))
                        .unwrap_or(false)
            }
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity and whether the source page or Sheets API is reachable"
            }
            ErrorCategory::Configuration => "Review the configuration file and CLI arguments",
            ErrorCategory::Authentication => {
                "Verify GOOGLE_SHEETS_CREDENTIALS or credentials.json and that the service account can access the spreadsheet"
            }
            ErrorCategory::Storage => "Check that the output path exists and is writable",
            ErrorCategory::Data => "The source page structure may have changed; inspect it manually",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::CredentialsError { message } => format!("Cannot load credentials: {}", message),
            SyncError::SheetApiError { status, .. } if *status == 429 => {
                "Google Sheets rate limit exceeded".to_string()
            }
            SyncError::SheetApiError { status, message } => {
                format!("Google Sheets request failed ({}): {}", status, message)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        for status in [429, 500, 502, 503, 504] {
            let err = SyncError::SheetApiError {
                status,
                message: String::new(),
            };
            assert!(err.is_transient(), "{} should be transient", status);
            assert_eq!(err.severity(), ErrorSeverity::Medium);
        }

        let err = SyncError::SheetApiError {
            status: 400,
            message: "bad range".to_string(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_auth_errors_are_critical() {
        let err = SyncError::SheetApiError {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let err = SyncError::credentials("no credentials");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("no credentials"));
    }
}
