//! Google Sheets REST client
//!
//! Reads a range with `GET /v4/spreadsheets/{id}/values/{range}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::auth::Authorizer;
use super::credentials::Credentials;
use super::{DataSource, SheetError};
use crate::config::SheetConfig;
use crate::records::{Cell, RawGrid};

/// Sheets values API client
pub struct SheetsClient {
    client: Client,
    config: SheetConfig,
    authorizer: Authorizer,
}

impl SheetsClient {
    /// Create a new client for the configured spreadsheet
    pub fn new(config: SheetConfig, credentials: Credentials) -> Result<Self, SheetError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let authorizer = Authorizer::new(credentials, client.clone())?;

        Ok(Self {
            client,
            config,
            authorizer,
        })
    }

    /// Full URL of the configured value range
    fn values_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.spreadsheet_id),
            urlencoding::encode(&self.config.range),
        )
    }
}

#[async_trait]
impl DataSource for SheetsClient {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn fetch_grid(&self) -> Result<RawGrid, SheetError> {
        let url = self.values_url();

        let request = self
            .client
            .get(&url)
            .query(&[("majorDimension", "ROWS")]);

        let response = self
            .authorizer
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(SheetError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SheetError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetError::Decode(e.to_string()))?;

        tracing::debug!(
            range = %body.range.as_deref().unwrap_or(&self.config.range),
            rows = body.values.as_ref().map(Vec::len).unwrap_or(0),
            "Fetched sheet values"
        );

        Ok(body.values.unwrap_or_default())
    }
}

// ============================================
// Response DTOs
// ============================================

/// `ValueRange` resource; `values` is omitted entirely for an empty range
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    values: Option<Vec<Vec<Cell>>>,
}
