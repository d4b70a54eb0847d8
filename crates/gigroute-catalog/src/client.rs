//! HTTP client for the external touring-event catalog.
//!
//! Wraps `reqwest` with catalog-specific error handling, credential
//! management, retry with back-off, and typed response deserialization. The
//! catalog reports application-level failures as a JSON object carrying an
//! `errorMessage` field even under a 200 status; those surface as
//! [`CatalogError::ApiError`].

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Url};

use crate::error::CatalogError;
use crate::retry::retry_with_backoff;
use crate::types::CatalogEvent;

/// Client for the touring-event catalog REST API.
///
/// Use [`CatalogClient::new`] for production or
/// [`CatalogClient::with_base_url`] to point at a mock server in tests.
pub struct CatalogClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl CatalogClient {
    /// Creates a client pointed at `base_url` with the given credential and
    /// timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::ApiError`] if `base_url`
    /// does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gigroute/0.1 (tour-routing-discovery)")
            .build()?;

        // Normalise: exactly one trailing slash so Url::join treats the last
        // path segment as a directory.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| CatalogError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Creates a client with a custom base URL and no retries, for testing
    /// against wiremock.
    ///
    /// # Errors
    ///
    /// Same conditions as [`CatalogClient::new`].
    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self, CatalogError> {
        Self::new(base_url, Some(api_key.to_owned()), 30, 0, 0)
    }

    /// Whether a catalog credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetches a performer's upcoming events inside `[from, to]`.
    ///
    /// Retries transient failures with exponential back-off; the catalog's
    /// "unknown performer" answer is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingCredential`] if no API key is configured.
    /// - [`CatalogError::ApiError`] if the catalog reports an error payload.
    /// - [`CatalogError::Http`] on network failure or non-2xx status.
    /// - [`CatalogError::Deserialize`] if the body is not the expected shape.
    pub async fn upcoming_events(
        &self,
        performer_name: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CatalogEvent>, CatalogError> {
        let url = self.events_url(performer_name, from, to)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_events(url.clone())
        })
        .await
    }

    async fn fetch_events(&self, url: Url) -> Result<Vec<CatalogEvent>, CatalogError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        if let Some(message) = value.get("errorMessage").and_then(serde_json::Value::as_str) {
            return Err(CatalogError::ApiError(message.to_owned()));
        }

        serde_json::from_value(value).map_err(|e| CatalogError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Builds the events URL with percent-encoded path and query.
    fn events_url(
        &self,
        performer_name: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Url, CatalogError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CatalogError::MissingCredential);
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::ApiError("base URL cannot carry paths".to_owned()))?
            .extend(["artists", performer_name, "events"]);
        url.query_pairs_mut()
            .append_pair("app_id", api_key)
            .append_pair("date", &format!("{from},{to}"));
        Ok(url)
    }
}
