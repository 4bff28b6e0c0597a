use thiserror::Error;

use crate::domain::repo::StoreError;

/// Domain-specific errors using thiserror
///
/// The service performs no validation of its own, so every variant here is a
/// store fault carried up unchanged.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn email_already_exists(email: String) -> Self {
        Self::EmailAlreadyExists { email }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail { email } => Self::email_already_exists(email),
            // `{:#}` keeps the anyhow context chain in the message
            StoreError::Backend(e) => Self::database(format!("{e:#}")),
        }
    }
}
