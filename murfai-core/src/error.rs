use thiserror::Error;

#[derive(Error, Debug)]
pub enum MurfError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Configuration '{0}' is already configured")]
    DuplicateConfiguration(String),

    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MurfError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True when the provider rejected the credential.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Provider(ProviderError::Authentication(_)))
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider-specific error: {0}")]
    ProviderSpecific(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, MurfError>;
