use thiserror::Error;

/// Failures surfaced to whoever issued a command.
///
/// They travel inside `anyhow::Error` (usually wrapped by `err_with_loc!`),
/// so use [`TraceError::kind_of`] to get the variant back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    #[error("Rate limit exceeded on {provider}. Please wait a moment before trying again.")]
    RateLimited { provider: String },

    #[error("Upstream error from {provider}: {message}")]
    UpstreamError { provider: String, message: String },

    #[error("Unauthorized access to session {session_id}")]
    Unauthorized { session_id: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),
}

impl TraceError {
    pub fn upstream(
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TraceError::UpstreamError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn rate_limited(provider: impl Into<String>) -> Self {
        TraceError::RateLimited {
            provider: provider.into(),
        }
    }

    pub fn kind_of(err: &anyhow::Error) -> Option<&TraceError> {
        err.downcast_ref::<TraceError>()
    }
}
