use thiserror::Error;

/// Run-level discovery failures.
///
/// Per-performer failures never appear here; they are logged, excluded from
/// results, and visible only as the delta between `performers_queried` and
/// `performers_with_events` in the stats.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The query itself is malformed; surfaces as a client error.
    #[error(transparent)]
    Validation(#[from] gigroute_core::ValidationError),

    /// The requested venue does not exist in the venue store.
    #[error("unknown venue: {0}")]
    UnknownVenue(String),

    /// The external catalog was unreachable for the entire run.
    #[error("touring-event catalog unavailable: {0}")]
    ExternalService(String),
}
