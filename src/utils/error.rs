use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request to backend failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Backend rejected {operation}: {status} {message}")]
    RemoteOperationFailed {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Invalid date format: {value:?} (expected YYYY-MM-DD or DD/MM/YYYY)")]
    InvalidDateFormat { value: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Not signed in; run `birthday-tracker login` first")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Settings file error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Settings file error: {0}")]
    TomlWriteError(#[from] toml::ser::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn remote(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        AppError::RemoteOperationFailed {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// Failures that block submission locally, before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError { .. }
                | AppError::InvalidDateFormat { .. }
                | AppError::ConfigError { .. }
                | AppError::InvalidConfigValueError { .. }
                | AppError::MissingConfigError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
