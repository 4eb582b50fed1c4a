use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::principal::Principal;
use crate::domain::requests::Credentials;
use crate::errors::{AppError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub uid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateTokenResponse {
    pub message: String,
    /// The verified principal: `uid` plus the provider's claims.
    #[schema(value_type = Object)]
    pub user: Principal,
}

/// POST /register
#[utoipa::path(
    post,
    path = "/register",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Email or password missing", body = ErrorResponse),
        (status = 500, description = "Identity provider failure", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn register_user(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let (email, password) = Credentials::parse(&body)?;

    let uid = state
        .users
        .register(&email, &password)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "user created successfully".to_string(),
        uid,
    }))
}

/// POST /login
///
/// Issues a custom token for the account registered under the given email.
#[utoipa::path(
    post,
    path = "/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Custom token issued", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = ErrorResponse),
        (status = 500, description = "Identity provider failure, including unknown user", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn login_user(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let (email, _password) = Credentials::parse(&body)?;

    let token = state.users.login(&email).await.map_err(|e| state.fail(e))?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// POST /validate-token
#[utoipa::path(
    post,
    path = "/validate-token",
    responses(
        (status = 200, description = "Token is valid", body = ValidateTokenResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn validate_token(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user = state.authenticate(&req).await?;
    Ok(HttpResponse::Ok().json(ValidateTokenResponse {
        message: "token is valid".to_string(),
        user,
    }))
}
