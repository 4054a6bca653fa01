use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Forecast model error: {message}")]
    ModelError { message: String },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("{entity} not found: {id}")]
    NotFoundError { entity: String, id: String },

    #[error("{message}")]
    ConflictError { message: String },

    #[error("Upstream service error: {message}")]
    UpstreamError { message: String },

    #[error("Service unavailable: {message}")]
    UnavailableError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Model,
    Input,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        AppError::NotFoundError {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        AppError::ModelError {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::UpstreamError {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        AppError::StorageError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::InvalidConfigValueError { .. } | AppError::ConfigValidationError { .. } => {
                ErrorCategory::Configuration
            }
            AppError::ModelError { .. } => ErrorCategory::Model,
            AppError::SerializationError(_)
            | AppError::ValidationError { .. }
            | AppError::NotFoundError { .. }
            | AppError::ConflictError { .. } => ErrorCategory::Input,
            AppError::HttpError(_)
            | AppError::UpstreamError { .. }
            | AppError::UnavailableError { .. } => ErrorCategory::Network,
            AppError::IoError(_) | AppError::StorageError { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::ValidationError { .. }
            | AppError::NotFoundError { .. }
            | AppError::ConflictError { .. } => ErrorSeverity::Low,
            AppError::HttpError(_)
            | AppError::UpstreamError { .. }
            | AppError::UnavailableError { .. } => ErrorSeverity::Medium,
            AppError::SerializationError(_) | AppError::StorageError { .. } => ErrorSeverity::High,
            AppError::IoError(_)
            | AppError::InvalidConfigValueError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::ModelError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML configuration file and referenced environment variables",
            ErrorCategory::Model => "Regenerate the forecast model artifact and check forecast.model_path",
            ErrorCategory::Input => "Check the request payload and identifiers",
            ErrorCategory::Network => "Check llm.endpoint, llm.api_key and network connectivity, then retry",
            ErrorCategory::Storage => "Check storage.data_dir permissions and free disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Model => format!("Forecast model could not be used: {}", self),
            ErrorCategory::Input => self.to_string(),
            ErrorCategory::Network => format!("External service failed: {}", self),
            ErrorCategory::Storage => format!("Storage failed: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_are_critical() {
        let err = AppError::model("baseline is zero");
        assert_eq!(err.category(), ErrorCategory::Model);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("baseline is zero"));
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("favorite", "abc");
        assert_eq!(err.to_string(), "favorite not found: abc");
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }
}
