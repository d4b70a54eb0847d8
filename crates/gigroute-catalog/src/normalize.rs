//! Normalization of raw catalog events into domain tour stops.
//!
//! Malformed events — missing or out-of-domain coordinates, unparseable
//! dates — are skipped individually rather than failing the performer. A
//! performer whose every event is malformed simply ends up with no usable
//! stops, which route analysis reports as a routeless performer.

use chrono::NaiveDate;

use gigroute_core::{GeoPoint, TourStop};

use crate::types::CatalogEvent;

/// Parses the date part of a catalog datetime (`YYYY-MM-DDTHH:MM:SS`).
///
/// Returns `None` if the prefix is not a valid date.
#[must_use]
pub fn parse_event_date(datetime: &str) -> Option<NaiveDate> {
    let date_part = datetime.split('T').next().unwrap_or(datetime);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Converts raw catalog events into tour stops sorted ascending by date.
///
/// Events without a usable date or coordinates are dropped with a debug log;
/// the caller compares input and output lengths for its stats.
#[must_use]
pub fn normalize_events(performer_name: &str, events: &[CatalogEvent]) -> Vec<TourStop> {
    let mut stops: Vec<TourStop> = events
        .iter()
        .filter_map(|event| {
            let Some(date) = parse_event_date(&event.datetime) else {
                tracing::debug!(
                    performer = %performer_name,
                    datetime = %event.datetime,
                    "skipping event with unparseable date"
                );
                return None;
            };
            let (Some(lat), Some(lon)) = (event.venue.latitude, event.venue.longitude) else {
                tracing::debug!(
                    performer = %performer_name,
                    venue = %event.venue.name,
                    "skipping event with missing coordinates"
                );
                return None;
            };
            let Ok(position) = GeoPoint::new(lat, lon) else {
                tracing::debug!(
                    performer = %performer_name,
                    venue = %event.venue.name,
                    lat,
                    lon,
                    "skipping event with out-of-domain coordinates"
                );
                return None;
            };
            Some(TourStop {
                position,
                venue_name: event.venue.name.clone(),
                city: event.venue.city.clone().unwrap_or_default(),
                region: event.venue.region.clone(),
                date,
            })
        })
        .collect();

    stops.sort_by(|a, b| a.date.cmp(&b.date));
    stops
}
