//! Request, result, and stats types for discovery runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gigroute_core::{GeoPoint, MatchResult, PerformerProfile, RouteAssessment, TourStop, VenueProfile};

use crate::cache::CacheStats;

/// One discovery request, fully validated before the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    pub venue_id: String,
    pub venue_position: GeoPoint,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub radius_miles: f64,
    /// Empty means no genre filtering.
    pub genre_filter: Vec<String>,
    pub max_results: usize,
    /// How far around the window to pull catalog events.
    pub look_ahead_days: i64,
    /// Use the deterministic demo catalog instead of the live one.
    pub demo_mode: bool,
}

/// Aggregate counters for one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    pub performers_queried: usize,
    pub performers_with_events: usize,
    pub performers_passing_filter: usize,
    pub total_events_seen: usize,
    pub elapsed_millis: u64,
    pub cache: CacheStats,
}

/// One performer that survived filtering, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPerformer {
    pub performer: PerformerProfile,
    pub route: RouteAssessment,
    pub compatibility: MatchResult,
    /// The normalized upcoming events the route analysis used.
    pub upcoming_events: Vec<TourStop>,
}

/// The complete (non-streaming) discovery response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub data: Vec<MatchedPerformer>,
    pub venue: VenueProfile,
    pub stats: DiscoveryStats,
}

/// One record in the incremental discovery sequence.
///
/// The transport (NDJSON over chunked HTTP) is an adapter over this enum; the
/// engine itself only ever produces these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DiscoveryEvent {
    /// Zero or more, emitted as each performer finishes.
    InProgress { results: Vec<MatchedPerformer> },
    /// Exactly one, terminal, carrying the deterministically ordered list.
    Complete {
        results: Vec<MatchedPerformer>,
        venue: VenueProfile,
        stats: DiscoveryStats,
    },
    /// Terminal, in place of `Complete`, when the run fails outright.
    Error { message: String },
}
