use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("order not found")]
    NotFound,
    #[error("{0}")]
    MalformedBody(String),
    #[error("{0}")]
    MissingFields(String),
    #[error("{0}")]
    InvalidItem(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Failure raised by a [`DocumentStore`](super::ports::DocumentStore) backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("document {0} does not exist")]
    Missing(String),
    #[error("{0}")]
    Backend(String),
}

/// Opaque failure raised by an [`IdentityProvider`](super::ports::IdentityProvider).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct IdentityError(pub String);

impl IdentityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or invalid authentication token")]
    Unauthenticated,
    #[error("invalid or expired token")]
    InvalidToken,
}
