//! [`IdentityProvider`] backed by the Google Identity Toolkit REST API (the
//! service behind Firebase Authentication).
//!
//! * ID tokens are verified remotely with `accounts:lookup` on every call.
//! * Accounts are created with `accounts:signUp`.
//! * Admin lookups and custom-token signing use an OAuth access token, either
//!   configured explicitly or obtained from the metadata server.
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::IdentityConfig;
use crate::domain::errors::IdentityError;
use crate::domain::ports::IdentityProvider;
use crate::domain::principal::{Principal, UserRecord};

pub const CUSTOM_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";
const CUSTOM_TOKEN_LIFETIME_SECS: i64 = 3600;
const MAX_UID_CHARS: usize = 128;
const HIDDEN_USER_FIELDS: [&str; 2] = ["passwordHash", "salt"];

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignJwtResponse {
    signed_jwt: String,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Claims of a custom token, signed by the service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub uid: String,
}

impl CustomTokenClaims {
    pub fn new(service_account: &str, uid: &str, issued_at: i64) -> Self {
        Self {
            iss: service_account.to_string(),
            sub: service_account.to_string(),
            aud: CUSTOM_TOKEN_AUDIENCE.to_string(),
            iat: issued_at,
            exp: issued_at + CUSTOM_TOKEN_LIFETIME_SECS,
            uid: uid.to_string(),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// The provider's `error.message`, or a generic description of the status.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("identity provider responded with {status}"))
}

/// Turns an Identity Toolkit user record into a principal keyed by `localId`.
pub fn principal_from_user(mut user: Map<String, Value>) -> Result<Principal, IdentityError> {
    let uid = match user.remove("localId") {
        Some(Value::String(uid)) => uid,
        _ => return Err(IdentityError::new("identity provider returned a user without localId")),
    };
    for field in HIDDEN_USER_FIELDS {
        user.remove(field);
    }
    Ok(Principal { uid, claims: user })
}

async fn send_text(request: RequestBuilder) -> Result<String, IdentityError> {
    let response = request
        .send()
        .await
        .map_err(|e| IdentityError::new(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| IdentityError::new(e.to_string()))?;
    if !status.is_success() {
        return Err(IdentityError::new(error_message(status, &body)));
    }
    Ok(body)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, IdentityError> {
    let body = send_text(request).await?;
    serde_json::from_str(&body)
        .map_err(|e| IdentityError::new(format!("unexpected identity provider response: {e}")))
}

fn trimmed(url: &str) -> &str {
    url.trim_end_matches('/')
}

// ── Client ───────────────────────────────────────────────────────────────────

pub struct IdentityToolkitClient {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl IdentityToolkitClient {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn toolkit_url(&self, path: &str) -> String {
        format!("{}/v1/{}", trimmed(&self.config.identity_toolkit_url), path)
    }

    async fn metadata(&self, path: &str) -> Result<String, IdentityError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/{}",
            trimmed(&self.config.metadata_server_url),
            path
        );
        send_text(self.http.get(url).header("Metadata-Flavor", "Google")).await
    }

    async fn access_token(&self) -> Result<String, IdentityError> {
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }
        let body = self.metadata("token").await?;
        let token: MetadataToken = serde_json::from_str(&body)
            .map_err(|e| IdentityError::new(format!("unexpected metadata server response: {e}")))?;
        Ok(token.access_token)
    }

    async fn service_account_email(&self) -> Result<String, IdentityError> {
        match &self.config.service_account_email {
            Some(email) => Ok(email.clone()),
            None => Ok(self.metadata("email").await?.trim().to_string()),
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn verify_token(&self, credential: &str) -> Result<Principal, IdentityError> {
        let request = self
            .http
            .post(self.toolkit_url("accounts:lookup"))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&json!({ "idToken": credential }));
        let response: LookupResponse = send_json(request).await?;

        let user = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::new("USER_NOT_FOUND"))?;
        principal_from_user(user)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<UserRecord, IdentityError> {
        let request = self
            .http
            .post(self.toolkit_url("accounts:signUp"))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&json!({ "email": email, "password": password }));
        let response: SignUpResponse = send_json(request).await?;

        debug!("Identity provider created account {}", response.local_id);
        Ok(UserRecord {
            uid: response.local_id,
            email: response.email.or_else(|| Some(email.to_string())),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, IdentityError> {
        let token = self.access_token().await?;
        let path = format!("projects/{}/accounts:lookup", self.config.project_id);
        let request = self
            .http
            .post(self.toolkit_url(&path))
            .bearer_auth(token)
            .json(&json!({ "email": [email] }));
        let response: LookupResponse = send_json(request).await?;

        let user = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::new(format!("no user record found for email {email}")))?;
        let principal = principal_from_user(user)?;
        Ok(UserRecord {
            email: principal.email().map(str::to_string),
            uid: principal.uid,
        })
    }

    async fn create_custom_token(&self, uid: &str) -> Result<String, IdentityError> {
        if uid.is_empty() || uid.chars().count() > MAX_UID_CHARS {
            return Err(IdentityError::new(format!(
                "uid must be a non-empty string of at most {MAX_UID_CHARS} characters"
            )));
        }

        let signer = self.service_account_email().await?;
        let token = self.access_token().await?;
        let claims = CustomTokenClaims::new(&signer, uid, Utc::now().timestamp());
        let payload = serde_json::to_string(&claims).map_err(|e| IdentityError::new(e.to_string()))?;

        let url = format!(
            "{}/v1/projects/-/serviceAccounts/{}:signJwt",
            trimmed(&self.config.iam_credentials_url),
            signer
        );
        let request = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "payload": payload }));
        let response: SignJwtResponse = send_json(request).await?;
        Ok(response.signed_jwt)
    }
}
