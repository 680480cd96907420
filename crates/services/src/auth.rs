use std::fmt;

use crate::error::ServiceError;

/// Bearer credential supplied by the application shell.
///
/// The session never stores or refreshes credentials; every collaborator call
/// receives the token explicitly.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// Placeholder for a shell that has not logged in yet.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw token, or `ServiceError::Authentication` when absent.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Authentication` if no credential was supplied.
    pub fn require(&self) -> Result<&str, ServiceError> {
        if self.is_missing() {
            Err(ServiceError::Authentication("please log in first".into()))
        } else {
            Ok(&self.0)
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            f.write_str("AuthToken(<missing>)")
        } else {
            f.write_str("AuthToken(***)")
        }
    }
}
