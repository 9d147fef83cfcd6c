//! HTTP clients for the IAM token exchange and the services catalog.

use serde::Deserialize;

use super::model::ServiceCatalog;
use crate::error::{Error, Result};

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetches the services catalog on behalf of an API key.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    iam_token_url: String,
    catalog_url: String,
}

impl CatalogClient {
    pub fn new(iam_token_url: impl Into<String>, catalog_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            iam_token_url: iam_token_url.into(),
            catalog_url: catalog_url.into(),
        }
    }

    /// Exchange an API key for a bearer token
    pub async fn bearer_token(&self, api_key: &str) -> Result<String> {
        log::debug!("Requesting bearer token from {}", self.iam_token_url);

        let form = [
            ("grant_type", APIKEY_GRANT_TYPE),
            ("apikey", api_key),
            ("response_type", "cloud_iam"),
        ];
        let response = self
            .http
            .post(&self.iam_token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: self.iam_token_url.clone(),
                source,
            })?;

        let response = ensure_success(&self.iam_token_url, response).await?;
        let token: TokenResponse = response.json().await.map_err(|source| Error::Transport {
            url: self.iam_token_url.clone(),
            source,
        })?;

        Ok(token.access_token)
    }

    /// Fetch the services catalog with a bearer token
    pub async fn services(&self, bearer_token: &str) -> Result<ServiceCatalog> {
        log::debug!("Fetching services catalog from {}", self.catalog_url);

        let response = self
            .http
            .get(&self.catalog_url)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: self.catalog_url.clone(),
                source,
            })?;

        let response = ensure_success(&self.catalog_url, response).await?;
        let body = response.text().await.map_err(|source| Error::Transport {
            url: self.catalog_url.clone(),
            source,
        })?;

        ServiceCatalog::from_json(&body)
    }
}

/// Turn a non-success response into [`Error::CatalogFetch`], keeping its body
async fn ensure_success(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::CatalogFetch {
        url: url.to_string(),
        status: status.as_u16(),
        payload: format_error_payload(&body),
    })
}

/// Pretty-print JSON error bodies; pass anything else through trimmed
fn format_error_payload(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => serde_json::to_string_pretty(&value).ok(),
        Err(_) => Some(trimmed.to_string()),
    }
}
