//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Coarse classification of an error, used for reporting and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request itself was wrong; the message says how to fix it
    Input,
    /// An external service failed or refused the call
    Upstream,
    /// Data was retrieved but is unusable for analysis
    Data,
    /// Configuration is missing or invalid
    Config,
    /// A bug or broken invariant
    Internal,
}

impl ErrorKind {
    /// Short label for logs and reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Input => "input error",
            Self::Upstream => "upstream error",
            Self::Data => "data error",
            Self::Config => "configuration error",
            Self::Internal => "internal error",
        }
    }
}

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request input was rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geocoding found no match for the location
    #[error("Location not found: {0}. Check the spelling or add a country, e.g. 'Paris, FR'")]
    LocationNotFound(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Provider quota or rate limit exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Inference/AI error
    #[error("Inference error: {0}")]
    Inference(String),

    /// An outbound call exceeded its time budget
    #[error("Timed out after {0}ms")]
    Timeout(u64),

    /// Retrieved data cannot be analysed
    #[error("Data error: {0}")]
    Data(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::InvalidInput(_) | Self::LocationNotFound(_) => ErrorKind::Input,
            Self::ExternalService(_)
            | Self::QuotaExceeded(_)
            | Self::Inference(_)
            | Self::Timeout(_) => ErrorKind::Upstream,
            Self::Data(_) => ErrorKind::Data,
            Self::Configuration(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExternalService(_) | Self::QuotaExceeded(_) | Self::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_are_input_errors() {
        let err: ApplicationError = DomainError::EmptyLocation.into();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.to_string(), "Location must not be empty");
    }

    #[test]
    fn kinds_cover_taxonomy() {
        assert_eq!(
            ApplicationError::LocationNotFound("Atlantis".into()).kind(),
            ErrorKind::Input
        );
        assert_eq!(
            ApplicationError::QuotaExceeded("weather".into()).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(ApplicationError::Timeout(100).kind(), ErrorKind::Upstream);
        assert_eq!(
            ApplicationError::Data("empty".into()).kind(),
            ErrorKind::Data
        );
        assert_eq!(
            ApplicationError::Configuration("x".into()).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            ApplicationError::Internal("x".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn location_not_found_suggests_fix() {
        let msg = ApplicationError::LocationNotFound("Pariss".into()).to_string();
        assert!(msg.contains("Pariss"));
        assert!(msg.contains("country"));
    }

    #[test]
    fn retryable_classification() {
        assert!(ApplicationError::ExternalService("503".into()).is_retryable());
        assert!(ApplicationError::Timeout(5).is_retryable());
        assert!(!ApplicationError::Data("x".into()).is_retryable());
        assert!(!ApplicationError::InvalidInput("x".into()).is_retryable());
    }
}
