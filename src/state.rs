use std::sync::Arc;

use actix_web::http::header;
use actix_web::HttpRequest;
use log::debug;

use crate::application::authenticator::Authenticator;
use crate::application::order_service::OrderService;
use crate::application::user_service::UserService;
use crate::domain::ports::{DocumentStore, IdentityProvider};
use crate::domain::principal::Principal;
use crate::errors::{AppError, ErrorPolicy};

/// Everything a handler needs, built once at startup and shared by all workers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub orders: OrderService,
    pub users: UserService,
    pub errors: ErrorPolicy,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        errors: ErrorPolicy,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(identity.clone()),
            orders: OrderService::new(store),
            users: UserService::new(identity),
            errors,
        }
    }

    /// Authenticates the request from its `Authorization` header.
    pub async fn authenticate(&self, req: &HttpRequest) -> Result<Principal, AppError> {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let principal = self.authenticator.authenticate(authorization).await.map_err(|e| {
            debug!("Rejected {} {}: {}", req.method(), req.path(), e);
            AppError::from(e)
        })?;
        debug!("Authenticated {} for {} {}", principal.uid, req.method(), req.path());
        Ok(principal)
    }

    pub fn fail(&self, e: impl Into<AppError>) -> AppError {
        self.errors.apply(e)
    }
}
