//! Client for the external touring-event catalog, plus the deterministic
//! demo catalog used when no credential is configured.
//!
//! The live client wraps `reqwest` with typed deserialization, retry with
//! back-off, and lenient coordinate parsing; [`normalize::normalize_events`]
//! turns raw events into domain [`gigroute_core::TourStop`]s, dropping
//! malformed entries per event rather than per performer.

mod client;
mod demo;
mod error;
mod normalize;
mod retry;
mod types;

pub use client::CatalogClient;
pub use demo::demo_events;
pub use error::CatalogError;
pub use normalize::{normalize_events, parse_event_date};
pub use types::{CatalogEvent, CatalogVenue};
