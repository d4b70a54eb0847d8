//! Pure domain logic for the gigroute booking engine: great-circle
//! distance, route-leg analysis, multi-criteria compatibility scoring, and
//! environment configuration. No I/O lives in this crate.

pub mod config;
pub mod error;
pub mod geo;
pub mod profiles;
pub mod route;
pub mod scoring;

pub use config::{build_app_config, load_app_config_from_env, AppConfig, ConfigError, Environment};
pub use error::ValidationError;
pub use geo::{distance_miles, GeoPoint};
pub use profiles::{PerformerProfile, VenueProfile};
pub use route::{assess_route, RouteAssessment, RouteLeg, TourStop};
pub use scoring::{score_match, CriterionScore, MatchResult, ScoringWeights};
