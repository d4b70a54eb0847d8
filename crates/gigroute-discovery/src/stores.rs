//! In-memory venue and performer stores.
//!
//! gigroute does not own venue or performer persistence; these stores are
//! the seams where a real record store would plug in. The built-in data set
//! backs demo mode and the test suite.

use std::collections::BTreeMap;

use gigroute_core::{GeoPoint, PerformerProfile, VenueProfile};

/// Read access to venue records.
#[derive(Debug, Clone)]
pub struct VenueStore {
    venues: Vec<VenueProfile>,
}

impl VenueStore {
    #[must_use]
    pub fn new(venues: Vec<VenueProfile>) -> Self {
        Self { venues }
    }

    #[must_use]
    pub fn get(&self, venue_id: &str) -> Option<&VenueProfile> {
        self.venues.iter().find(|v| v.id == venue_id)
    }

    /// The built-in demo venue directory.
    #[must_use]
    pub fn demo_directory() -> Self {
        Self::new(vec![
            venue(
                "thalia-hall",
                "Thalia Hall",
                "1807 S Allport St",
                "Chicago",
                "IL",
                "60608",
                41.8576,
                -87.6573,
                Some(800),
                Some("rock"),
                &["rock", "indie", "folk"],
                &[("monitor_mixes", 6), ("pa_watts", 6000), ("stage_feet", 30)],
                Some("theater"),
                Some(20.0),
                Some(45.0),
            ),
            venue(
                "grog-shop",
                "Grog Shop",
                "2785 Euclid Heights Blvd",
                "Cleveland Heights",
                "OH",
                "44106",
                41.5092,
                -81.5802,
                Some(400),
                Some("punk"),
                &["punk", "indie", "metal"],
                &[("monitor_mixes", 4), ("pa_watts", 3000), ("stage_feet", 20)],
                Some("club"),
                Some(12.0),
                Some(25.0),
            ),
            venue(
                "the-ark",
                "The Ark",
                "316 S Main St",
                "Ann Arbor",
                "MI",
                "48104",
                42.2795,
                -83.7487,
                Some(400),
                Some("folk"),
                &["folk", "americana", "bluegrass"],
                &[("monitor_mixes", 4), ("pa_watts", 2500), ("stage_feet", 24)],
                Some("hall"),
                Some(15.0),
                Some(35.0),
            ),
        ])
    }
}

/// Read access to performer profiles.
#[derive(Debug, Clone)]
pub struct PerformerStore {
    performers: Vec<PerformerProfile>,
}

impl PerformerStore {
    #[must_use]
    pub fn new(performers: Vec<PerformerProfile>) -> Self {
        Self { performers }
    }

    #[must_use]
    pub fn get(&self, performer_id: &str) -> Option<&PerformerProfile> {
        self.performers.iter().find(|p| p.id == performer_id)
    }

    /// Every known candidate performer, in stable insertion order.
    #[must_use]
    pub fn roster(&self) -> &[PerformerProfile] {
        &self.performers
    }

    /// The built-in demo roster of touring acts.
    #[must_use]
    pub fn demo_roster() -> Self {
        Self::new(vec![
            performer(
                "mile-markers",
                "The Mile Markers",
                Some("indie rock"),
                Some(450),
                &[("monitor_mixes", 4), ("pa_watts", 2000)],
                &["Empty Bottle", "Grog Shop"],
                &["club", "theater"],
                Some(22.0),
            ),
            performer(
                "static-violet",
                "Static Violet",
                Some("synth-pop"),
                Some(650),
                &[("monitor_mixes", 5), ("pa_watts", 4000), ("haze_machine", 1)],
                &["Metro"],
                &["theater", "ballroom"],
                Some(28.0),
            ),
            performer(
                "harvest-line",
                "Harvest Line",
                Some("americana"),
                Some(300),
                &[("monitor_mixes", 3), ("pa_watts", 1500)],
                &["The Ark"],
                &["hall", "listening room"],
                Some(18.0),
            ),
            performer(
                "rust-creek-revival",
                "Rust Creek Revival",
                Some("bluegrass"),
                Some(250),
                &[("monitor_mixes", 2), ("pa_watts", 1200)],
                &[],
                &["hall", "festival"],
                Some(15.0),
            ),
            performer(
                "concrete-halo",
                "Concrete Halo",
                Some("metal"),
                Some(550),
                &[("monitor_mixes", 6), ("pa_watts", 8000)],
                &["Grog Shop"],
                &["club"],
                Some(20.0),
            ),
            performer(
                "paper-lanterns",
                "Paper Lanterns",
                Some("folk"),
                Some(200),
                &[("monitor_mixes", 2), ("pa_watts", 1000)],
                &[],
                &["hall", "theater"],
                Some(16.0),
            ),
            performer(
                "night-bus",
                "Night Bus",
                Some("electronic"),
                Some(700),
                &[("monitor_mixes", 4), ("pa_watts", 6000)],
                &[],
                &["club", "warehouse"],
                Some(30.0),
            ),
            performer(
                "the-petty-officers",
                "The Petty Officers",
                Some("punk"),
                Some(350),
                &[("monitor_mixes", 3), ("pa_watts", 2500)],
                &["Grog Shop", "Empty Bottle"],
                &["club", "bar"],
                Some(14.0),
            ),
        ])
    }
}

#[allow(clippy::too_many_arguments)]
fn venue(
    id: &str,
    name: &str,
    address: &str,
    city: &str,
    state: &str,
    zip_code: &str,
    lat: f64,
    lon: f64,
    capacity: Option<u32>,
    primary_genre: Option<&str>,
    preferred_genres: &[&str],
    technical_spec: &[(&str, u32)],
    venue_type: Option<&str>,
    price_min: Option<f64>,
    price_max: Option<f64>,
) -> VenueProfile {
    VenueProfile {
        id: id.to_owned(),
        name: name.to_owned(),
        address: address.to_owned(),
        city: city.to_owned(),
        state: state.to_owned(),
        zip_code: zip_code.to_owned(),
        position: GeoPoint::new(lat, lon).expect("demo venue coordinates are valid"),
        capacity,
        primary_genre: primary_genre.map(ToOwned::to_owned),
        preferred_genres: preferred_genres.iter().map(|&g| g.to_owned()).collect(),
        technical_spec: technical_spec
            .iter()
            .map(|&(k, v)| (k.to_owned(), v))
            .collect::<BTreeMap<_, _>>(),
        past_performers: Vec::new(),
        venue_type: venue_type.map(ToOwned::to_owned),
        ticket_price_min: price_min,
        ticket_price_max: price_max,
    }
}

#[allow(clippy::too_many_arguments)]
fn performer(
    id: &str,
    name: &str,
    genre: Option<&str>,
    draw_size: Option<u32>,
    technical_needs: &[(&str, u32)],
    past_venues: &[&str],
    preferred_venue_types: &[&str],
    average_ticket_price: Option<f64>,
) -> PerformerProfile {
    PerformerProfile {
        id: id.to_owned(),
        name: name.to_owned(),
        genre: genre.map(ToOwned::to_owned),
        draw_size,
        technical_needs: technical_needs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v))
            .collect::<BTreeMap<_, _>>(),
        past_venues: past_venues.iter().map(|&v| v.to_owned()).collect(),
        preferred_venue_types: preferred_venue_types.iter().map(|&t| t.to_owned()).collect(),
        average_ticket_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_directory_resolves_known_venues() {
        let store = VenueStore::demo_directory();
        let thalia = store.get("thalia-hall").expect("thalia-hall exists");
        assert_eq!(thalia.city, "Chicago");
        assert!(store.get("no-such-venue").is_none());
    }

    #[test]
    fn demo_roster_has_unique_ids() {
        let store = PerformerStore::demo_roster();
        let mut ids: Vec<&str> = store.roster().iter().map(|p| p.id.as_str()).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before, "duplicate performer id in demo roster");
        assert!(before >= 6, "roster should be large enough to exercise discovery");
    }

    #[test]
    fn roster_order_is_stable() {
        let a = PerformerStore::demo_roster();
        let b = PerformerStore::demo_roster();
        let names_a: Vec<&str> = a.roster().iter().map(|p| p.name.as_str()).collect();
        let names_b: Vec<&str> = b.roster().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names_a, names_b);
    }
}
