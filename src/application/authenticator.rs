use std::sync::Arc;

use log::debug;

use crate::domain::errors::AuthError;
use crate::domain::ports::IdentityProvider;
use crate::domain::principal::Principal;

const BEARER_PREFIX: &str = "Bearer ";

/// Returns the credential following `Bearer `, if the header has that shape.
pub fn bearer_credential(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix(BEARER_PREFIX)
}

/// Validates bearer tokens against the identity provider. Every call goes to the
/// provider; nothing is cached and nothing is retried.
#[derive(Clone)]
pub struct Authenticator {
    identity: Arc<dyn IdentityProvider>,
}

impl Authenticator {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let credential = bearer_credential(authorization).ok_or(AuthError::Unauthenticated)?;
        self.identity.verify_token(credential).await.map_err(|e| {
            debug!("Token verification failed: {}", e);
            AuthError::InvalidToken
        })
    }
}
