//! Performer and venue profile records consumed by the compatibility scorer.
//!
//! These mirror what the external profile stores hold; gigroute does not
//! persist them. Every attribute the scorer reads is optional — missing data
//! degrades to a neutral criterion score, never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A touring performer as known to the booking side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformerProfile {
    pub id: String,
    pub name: String,
    pub genre: Option<String>,
    /// Typical audience the act draws.
    pub draw_size: Option<u32>,
    /// Required technical items mapped to the minimum level/quantity needed
    /// (e.g. `"monitor_mixes" -> 4`, `"pa_watts" -> 2000`).
    pub technical_needs: BTreeMap<String, u32>,
    pub past_venues: Vec<String>,
    pub preferred_venue_types: Vec<String>,
    pub average_ticket_price: Option<f64>,
}

/// A venue record: identity, location, and booking preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueProfile {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub position: GeoPoint,
    pub capacity: Option<u32>,
    /// The single genre the venue is best known for.
    pub primary_genre: Option<String>,
    /// Genres the venue actively books.
    pub preferred_genres: Vec<String>,
    /// Installed technical capability, same key space as
    /// [`PerformerProfile::technical_needs`].
    pub technical_spec: BTreeMap<String, u32>,
    pub past_performers: Vec<String>,
    pub venue_type: Option<String>,
    pub ticket_price_min: Option<f64>,
    pub ticket_price_max: Option<f64>,
}
