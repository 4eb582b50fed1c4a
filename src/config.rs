//! Server configuration, read from environment variables (a `.env` file is
//! honoured by `main`).
//!
//! | Variable                     | Default                                   |
//! |------------------------------|-------------------------------------------|
//! | `DATABASE_URL`               | required                                  |
//! | `HOST`                       | `0.0.0.0`                                 |
//! | `PORT`                       | `8080`                                    |
//! | `EXPOSE_INTERNAL_ERRORS`     | `true`                                    |
//! | `IDENTITY_API_KEY`           | required                                  |
//! | `GOOGLE_CLOUD_PROJECT`       | required                                  |
//! | `IDENTITY_TOOLKIT_URL`       | `https://identitytoolkit.googleapis.com`  |
//! | `IAM_CREDENTIALS_URL`        | `https://iamcredentials.googleapis.com`   |
//! | `METADATA_SERVER_URL`        | `http://metadata.google.internal`         |
//! | `SERVICE_ACCOUNT_EMAIL`      | fetched from the metadata server          |
//! | `GOOGLE_OAUTH_ACCESS_TOKEN`  | fetched from the metadata server          |
use std::env;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_IAM_CREDENTIALS_URL: &str = "https://iamcredentials.googleapis.com";
pub const DEFAULT_METADATA_SERVER_URL: &str = "http://metadata.google.internal";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// When false, 500 responses carry a generic message instead of the
    /// collaborator's error text.
    pub expose_internal_errors: bool,
    pub identity: IdentityConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityConfig {
    pub api_key: String,
    pub project_id: String,
    pub identity_toolkit_url: String,
    pub iam_credentials_url: String,
    pub metadata_server_url: String,
    pub service_account_email: Option<String>,
    pub access_token: Option<String>,
}

impl IdentityConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            identity_toolkit_url: DEFAULT_IDENTITY_TOOLKIT_URL.to_string(),
            iam_credentials_url: DEFAULT_IAM_CREDENTIALS_URL.to_string(),
            metadata_server_url: DEFAULT_METADATA_SERVER_URL.to_string(),
            service_account_email: None,
            access_token: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let optional = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = match optional("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let expose_internal_errors = match optional("EXPOSE_INTERNAL_ERRORS") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                var: "EXPOSE_INTERNAL_ERRORS",
                value,
            })?,
            None => true,
        };

        let identity = IdentityConfig {
            api_key: required("IDENTITY_API_KEY")?,
            project_id: required("GOOGLE_CLOUD_PROJECT")?,
            identity_toolkit_url: optional("IDENTITY_TOOLKIT_URL")
                .unwrap_or_else(|| DEFAULT_IDENTITY_TOOLKIT_URL.to_string()),
            iam_credentials_url: optional("IAM_CREDENTIALS_URL")
                .unwrap_or_else(|| DEFAULT_IAM_CREDENTIALS_URL.to_string()),
            metadata_server_url: optional("METADATA_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_METADATA_SERVER_URL.to_string()),
            service_account_email: optional("SERVICE_ACCOUNT_EMAIL"),
            access_token: optional("GOOGLE_OAUTH_ACCESS_TOKEN"),
        };

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: required("DATABASE_URL")?,
            expose_internal_errors,
            identity,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
