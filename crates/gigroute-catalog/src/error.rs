use thiserror::Error;

/// Errors returned by the touring-event catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog returned an application-level error payload.
    #[error("catalog API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A live catalog call was attempted without an API key configured.
    #[error("no catalog API key configured; set GIGROUTE_CATALOG_API_KEY or use demo mode")]
    MissingCredential,
}
