use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsersError {
    #[error("User with email '{email}' already exists")]
    Conflict { email: String },

    #[error("Internal error")]
    Internal,
}

impl UsersError {
    pub fn conflict(email: String) -> Self {
        Self::Conflict { email }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for UsersError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            EmailAlreadyExists { email } => Self::conflict(email),
            Database { .. } => Self::internal(),
        }
    }
}
