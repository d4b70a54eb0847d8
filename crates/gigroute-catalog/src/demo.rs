//! Deterministic synthetic catalog for demo mode.
//!
//! When no catalog credential is configured (or the caller asks for demo
//! mode) discovery runs against synthetic tour routes generated from a hash
//! of the performer's name. The same name and window always produce the
//! same events, which keeps demo discovery runs reproducible.

use chrono::{Duration, NaiveDate};

use crate::types::{CatalogEvent, CatalogVenue};

/// A fixed pool of real-city coordinates the generator routes through.
const DEMO_CITIES: &[(&str, &str, f64, f64)] = &[
    ("Chicago", "IL", 41.8781, -87.6298),
    ("Detroit", "MI", 42.3314, -83.0458),
    ("Cleveland", "OH", 41.4993, -81.6944),
    ("Columbus", "OH", 39.9612, -82.9988),
    ("Indianapolis", "IN", 39.7684, -86.1581),
    ("Milwaukee", "WI", 43.0389, -87.9065),
    ("Minneapolis", "MN", 44.9778, -93.2650),
    ("St. Louis", "MO", 38.6270, -90.1994),
    ("Nashville", "TN", 36.1627, -86.7816),
    ("Pittsburgh", "PA", 40.4406, -79.9959),
    ("Louisville", "KY", 38.2527, -85.7585),
    ("Kansas City", "MO", 39.0997, -94.5786),
];

/// FNV-1a over the performer name; stable across runs and platforms.
fn name_seed(name: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.to_lowercase().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Generates a deterministic synthetic tour for one performer.
///
/// Produces 3–6 events spaced 2–4 days apart starting shortly after `from`,
/// each at a different city from the pool, and drops any event landing past
/// `to`. An adversarially short window can therefore yield an empty list,
/// which mirrors a real performer with no dates in range.
#[must_use]
pub fn demo_events(performer_name: &str, from: NaiveDate, to: NaiveDate) -> Vec<CatalogEvent> {
    let seed = name_seed(performer_name);
    let event_count = 3 + (seed % 4) as i64;
    let start_offset = ((seed >> 8) % 5) as i64;
    let city_start = ((seed >> 16) % DEMO_CITIES.len() as u64) as usize;

    let mut events = Vec::new();
    let mut date = from + Duration::days(start_offset);
    for i in 0..event_count {
        if date > to {
            break;
        }
        let gap = 2 + ((seed >> (20 + i * 3)) % 3) as i64;
        let (city, region, lat, lon) =
            DEMO_CITIES[(city_start + i as usize) % DEMO_CITIES.len()];
        events.push(CatalogEvent {
            datetime: format!("{date}T20:00:00"),
            venue: CatalogVenue {
                name: format!("{city} Music Hall"),
                city: Some(city.to_owned()),
                region: Some(region.to_owned()),
                country: Some("United States".to_owned()),
                latitude: Some(lat),
                longitude: Some(lon),
            },
        });
        date += Duration::days(gap);
    }
    events
}
