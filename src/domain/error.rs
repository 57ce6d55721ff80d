use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// An upstream collaborator (embedding model, responder) failed.
    /// Fatal to the current request; there is no cached fallback.
    #[error("Upstream error: {source_name} - {message}")]
    Upstream {
        source_name: String,
        message: String,
    },

    /// The similarity index could not be queried (missing index,
    /// connection failure). Distinct from an empty search result.
    #[error("Index unavailable: {message}")]
    IndexUnavailable { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Metrics error: {message}")]
    Metrics { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn upstream(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn index_unavailable(message: impl Into<String>) -> Self {
        Self::IndexUnavailable {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn metrics(message: impl Into<String>) -> Self {
        Self::Metrics {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
