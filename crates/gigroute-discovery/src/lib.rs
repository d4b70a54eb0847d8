//! Discovery orchestration for gigroute: the TTL result cache, the
//! in-memory venue/performer stores, and the engine that fans route analysis
//! out across the candidate roster with bounded concurrency and delivers
//! results as one batch or an incremental event sequence.

mod cache;
mod error;
mod orchestrator;
mod stores;
mod types;

pub use cache::{cache_key, CacheStats, ResultCache, DEFAULT_TTL};
pub use error::DiscoveryError;
pub use orchestrator::DiscoveryEngine;
pub use stores::{PerformerStore, VenueStore};
pub use types::{
    DiscoveryEvent, DiscoveryQuery, DiscoveryResponse, DiscoveryStats, MatchedPerformer,
};
