//! Shared error types for the services crate.

use reqwest::StatusCode;
use thiserror::Error;

use quiz_core::TransitionError;
use quiz_core::model::QuestionError;

/// Failures reported by a question source, answer sink or word lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceError {
    /// Connectivity problems and non-2xx answers worth retrying.
    #[error("request failed: {message}")]
    Transient {
        status: Option<StatusCode>,
        message: String,
    },
    /// The backend answered with something the client cannot use.
    #[error("invalid response: {0}")]
    Validation(String),
    /// Credential missing or rejected; the caller has to log in again.
    #[error("authentication required: {0}")]
    Authentication(String),
}

impl ServiceError {
    pub(crate) fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ServiceError::Transient { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Validation(err.to_string());
        }
        Self::Transient {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<QuestionError> for ServiceError {
    fn from(err: QuestionError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Coarse classification used by bindings to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransientNetwork,
    Validation,
    Authentication,
    IllegalTransition,
}

/// Anything the session controller reports to its binding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionFailure {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    IllegalTransition(#[from] TransitionError),
    #[error("another request is still in flight")]
    Busy,
}

impl SessionFailure {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            SessionFailure::Service(ServiceError::Transient { .. }) => FailureKind::TransientNetwork,
            SessionFailure::Service(ServiceError::Validation(_)) => FailureKind::Validation,
            SessionFailure::Service(ServiceError::Authentication(_)) => {
                FailureKind::Authentication
            }
            SessionFailure::IllegalTransition(_) | SessionFailure::Busy => {
                FailureKind::IllegalTransition
            }
        }
    }

    /// Whether re-issuing the same request can reasonably succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::TransientNetwork)
    }
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid api url {raw:?}: {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("api url {0:?} cannot be used as a base")]
    NotABase(String),
    #[error("{var} must be a whole number, got {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Stage;

    #[test]
    fn only_transient_failures_are_retryable() {
        let transient = SessionFailure::from(ServiceError::Transient {
            status: Some(StatusCode::INTERNAL_SERVER_ERROR),
            message: "boom".into(),
        });
        assert_eq!(transient.kind(), FailureKind::TransientNetwork);
        assert!(transient.is_retryable());

        let auth = SessionFailure::from(ServiceError::Authentication("expired".into()));
        assert_eq!(auth.kind(), FailureKind::Authentication);
        assert!(!auth.is_retryable());

        let illegal = SessionFailure::from(TransitionError::StageNotUnlocked {
            event: "navigate_to_stage",
            stage: Stage::Explanation,
        });
        assert_eq!(illegal.kind(), FailureKind::IllegalTransition);
        assert!(!illegal.is_retryable());
    }

    #[test]
    fn question_errors_become_validation() {
        let err = ServiceError::from(QuestionError::BlankId);
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
