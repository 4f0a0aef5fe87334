//! Request authorization
//!
//! API keys and access tokens are attached as-is. Service account keys are
//! exchanged for access tokens with the OAuth 2.0 JWT bearer grant; tokens
//! are cached and renewed shortly before they expire.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::credentials::{Credentials, ServiceAccountKey};
use super::SheetError;

/// Read-only access to spreadsheets
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Maximum lifetime Google accepts for a signed assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens closer than this to expiry are renewed before use
const RENEW_BEFORE_SECS: i64 = 300;

/// Attaches credentials to outgoing Sheets requests
pub(crate) enum Authorizer {
    ApiKey(String),
    AccessToken(String),
    ServiceAccount(TokenSource),
}

impl Authorizer {
    pub fn new(credentials: Credentials, client: Client) -> Result<Self, SheetError> {
        Ok(match credentials {
            Credentials::ApiKey(key) => Authorizer::ApiKey(key),
            Credentials::AccessToken(token) => Authorizer::AccessToken(token),
            Credentials::ServiceAccount(key) => {
                tracing::info!(client_email = %key.client_email, "Using service account credentials");
                Authorizer::ServiceAccount(TokenSource::new(key, client)?)
            }
        })
    }

    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, SheetError> {
        Ok(match self {
            Authorizer::ApiKey(key) => request.query(&[("key", key)]),
            Authorizer::AccessToken(token) => request.bearer_auth(token),
            Authorizer::ServiceAccount(source) => request.bearer_auth(source.access_token().await?),
        })
    }
}

/// JWT claim set for the bearer grant
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Mints and caches access tokens for a service account
pub struct TokenSource {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, client: Client) -> Result<Self, SheetError> {
        let signing_key = key.signing_key()?;
        Ok(Self {
            key,
            signing_key,
            client,
            cached: Mutex::new(None),
        })
    }

    /// A valid access token, exchanging a new assertion if needed
    ///
    /// Concurrent callers share one exchange.
    pub async fn access_token(&self) -> Result<String, SheetError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(RENEW_BEFORE_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let token = self.exchange(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, SheetError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: SHEETS_READONLY_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| SheetError::Auth(format!("signing assertion: {}", e)))
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, SheetError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(SheetError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token exchange rejected");
            return Err(SheetError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Decode(e.to_string()))?;

        tracing::debug!(expires_in = body.expires_in, "Obtained service account access token");

        Ok(CachedToken {
            value: body.access_token,
            expires_at: now + Duration::seconds(body.expires_in),
        })
    }
}
