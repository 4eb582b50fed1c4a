use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::errors::DomainError;

/// Decodes a request body that must be a JSON object.
pub fn json_object(body: &[u8]) -> Result<Map<String, Value>, DomainError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(DomainError::MalformedBody("invalid or missing JSON body".to_string())),
    }
}

/// Body of `PUT|PATCH /pedidos/{id}`. Any status string is accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: String,
}

impl StatusUpdate {
    pub fn parse(body: &[u8]) -> Result<Self, DomainError> {
        let fields = json_object(body)?;
        if !fields.contains_key("status") {
            return Err(DomainError::MissingFields("no valid data sent".to_string()));
        }
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::MalformedBody(format!("invalid status update: {e}")))
    }
}

/// Body of `POST /login` and `POST /register`.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Returns `(email, password)`, both non-empty.
    pub fn parse(body: &[u8]) -> Result<(String, String), DomainError> {
        let fields = json_object(body)?;
        let credentials: Credentials = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::MalformedBody(format!("invalid credentials: {e}")))?;
        match (credentials.email, credentials.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(DomainError::MissingFields(
                "email and password are required".to_string(),
            )),
        }
    }
}
