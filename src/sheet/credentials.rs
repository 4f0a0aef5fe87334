//! Sheets API credentials
//!
//! Credentials come from the `GOOGLE_CREDENTIALS` environment variable (inline
//! JSON) or from a JSON file on disk. Accepted documents:
//!
//! - a service account key (`"type": "service_account"`), exchanged for
//!   access tokens at runtime
//! - `{"access_token": ...}`, a pre-minted OAuth token
//! - `{"api_key": ...}`, for publicly readable sheets
//!
//! Anything else is rejected so the server refuses to start without a usable
//! data source.

use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding inline credentials JSON
pub const CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS";

/// Google's OAuth 2.0 token endpoint, used when a key omits `token_uri`
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How requests to the Sheets API are authorized
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service account key; signs assertions for short-lived access tokens
    ServiceAccount(ServiceAccountKey),
    /// API key sent as the `key` query parameter (public sheets)
    ApiKey(String),
    /// OAuth 2.0 bearer token with the `spreadsheets.readonly` scope
    AccessToken(String),
}

/// The fields of a service account key file needed for the JWT bearer grant
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct CredentialsDocument {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    client_email: Option<String>,
    #[serde(default)]
    private_key: Option<String>,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl Credentials {
    /// Parse a credentials JSON document
    pub fn from_json(json: &str) -> Result<Self, CredentialsError> {
        let doc: CredentialsDocument =
            serde_json::from_str(json).map_err(|e| CredentialsError::Malformed(e.to_string()))?;

        if doc.kind.as_deref() == Some("service_account") {
            return ServiceAccountKey::from_document(doc).map(Credentials::ServiceAccount);
        }

        if let Some(token) = non_empty(doc.access_token) {
            return Ok(Credentials::AccessToken(token));
        }
        if let Some(key) = non_empty(doc.api_key) {
            return Ok(Credentials::ApiKey(key));
        }

        Err(CredentialsError::Malformed(
            "expected a service account key, an `api_key` or an `access_token`".to_string(),
        ))
    }

    /// Read and parse a credentials file
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let content = std::fs::read_to_string(path).map_err(|e| CredentialsError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Load from `GOOGLE_CREDENTIALS` if set, otherwise from `fallback_file`
    pub fn load(fallback_file: &Path) -> Result<Self, CredentialsError> {
        match std::env::var(CREDENTIALS_ENV) {
            Ok(inline) if !inline.trim().is_empty() => {
                tracing::info!("Using credentials from {}", CREDENTIALS_ENV);
                Self::from_json(&inline)
            }
            _ => {
                tracing::info!("Using credentials file {:?}", fallback_file);
                Self::from_file(fallback_file)
            }
        }
    }
}

impl ServiceAccountKey {
    fn from_document(doc: CredentialsDocument) -> Result<Self, CredentialsError> {
        let client_email = non_empty(doc.client_email).ok_or_else(|| {
            CredentialsError::Malformed("service account key has no `client_email`".to_string())
        })?;
        let private_key = non_empty(doc.private_key).ok_or_else(|| {
            CredentialsError::Malformed("service account key has no `private_key`".to_string())
        })?;

        let key = Self {
            client_email,
            private_key,
            private_key_id: non_empty(doc.private_key_id),
            token_uri: non_empty(doc.token_uri).unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        };
        // Fail at startup rather than on the first refresh
        key.signing_key()?;
        Ok(key)
    }

    /// Parse the PEM private key for RS256 signing
    pub fn signing_key(&self) -> Result<EncodingKey, CredentialsError> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| {
            CredentialsError::Malformed(format!("service account private_key: {}", e))
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
            Credentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Credential loading errors; all of these are fatal at startup
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Failed to read credentials file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Malformed credentials: {0}")]
    Malformed(String),
}
