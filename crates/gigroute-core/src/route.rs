//! Route-leg analysis for a performer's tour against a venue's open window.
//!
//! Given the performer's committed stops and the venue's target date window,
//! this finds the nearest committed shows bracketing the window, estimates
//! the extra travel a new stop would add, and folds everything into a 0–100
//! routing feasibility score.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::{distance_miles, GeoPoint};

/// One committed show on a performer's tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourStop {
    pub position: GeoPoint,
    pub venue_name: String,
    pub city: String,
    pub region: Option<String>,
    pub date: NaiveDate,
}

/// The committed shows bracketing a target window, exhaustively.
///
/// Modelled as a tagged enum rather than two nullable fields so every
/// consumer must handle the end-of-tour and no-data cases explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteLeg {
    /// A show before and after the window — the performer passes through.
    Both {
        origin: TourStop,
        destination: TourStop,
    },
    /// Only a show before the window is known (end of the known tour).
    OriginOnly { origin: TourStop },
    /// Only a show after the window is known.
    DestinationOnly { destination: TourStop },
    /// No usable route data for this performer.
    Neither,
}

/// The derived feasibility of inserting a venue stop into a route.
///
/// `None` fields mean "unknown/undefined", never zero: a half-known route
/// reports `days_available: None`, and callers must not rank unknown below
/// a literal zero free days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAssessment {
    pub leg: RouteLeg,
    /// Miles from the nearest known route endpoint to the venue.
    /// `None` only for [`RouteLeg::Neither`].
    pub distance_to_venue: Option<f64>,
    /// Extra miles incurred by inserting the venue between the two committed
    /// shows. Only meaningful when both endpoints are known.
    pub detour_distance: Option<f64>,
    /// Whole free days between the bracketing shows (exclusive of both show
    /// days). Only known when both endpoints are known.
    pub days_available: Option<i64>,
    /// Feasibility estimate in `[0, 100]`.
    pub routing_score: f64,
}

/// Detour beyond this contributes nothing to the score.
const MAX_DETOUR_MILES: f64 = 500.0;
/// Venue distance beyond this contributes nothing to the score.
const MAX_VENUE_DISTANCE_MILES: f64 = 500.0;
/// Free days at or above this earn full schedule credit.
const FULL_CREDIT_FREE_DAYS: f64 = 3.0;

const DETOUR_WEIGHT: f64 = 0.45;
const PROXIMITY_WEIGHT: f64 = 0.35;
const SCHEDULE_WEIGHT: f64 = 0.20;

/// Score multiplier when only half the route is known.
const HALF_ROUTE_DISCOUNT: f64 = 0.6;

/// Analyses a performer's committed stops against a venue and date window.
///
/// The origin is the latest stop strictly before `window_start`; the
/// destination is the earliest stop strictly after `window_end`. Stops with
/// unusable coordinates never reach this function — catalog normalization
/// drops them — so an empty slice is the "no route data" case.
///
/// `distance_to_venue` uses the nearest route endpoint, not a true
/// point-to-segment projection. That overstates convenience for venues far
/// off the leg but near one endpoint; it is a deliberate approximation for
/// coarse filtering.
#[must_use]
pub fn assess_route(
    stops: &[TourStop],
    venue: GeoPoint,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> RouteAssessment {
    let origin = stops
        .iter()
        .filter(|s| s.date < window_start)
        .max_by_key(|s| s.date);
    let destination = stops
        .iter()
        .filter(|s| s.date > window_end)
        .min_by_key(|s| s.date);

    match (origin, destination) {
        (Some(o), Some(d)) => assess_both(o.clone(), d.clone(), venue),
        (Some(o), None) => assess_half(
            RouteLeg::OriginOnly { origin: o.clone() },
            distance_miles(o.position, venue),
        ),
        (None, Some(d)) => assess_half(
            RouteLeg::DestinationOnly {
                destination: d.clone(),
            },
            distance_miles(d.position, venue),
        ),
        (None, None) => RouteAssessment {
            leg: RouteLeg::Neither,
            distance_to_venue: None,
            detour_distance: None,
            days_available: None,
            routing_score: 0.0,
        },
    }
}

fn assess_both(origin: TourStop, destination: TourStop, venue: GeoPoint) -> RouteAssessment {
    let origin_to_venue = distance_miles(origin.position, venue);
    let venue_to_dest = distance_miles(venue, destination.position);
    let direct = distance_miles(origin.position, destination.position);

    // The clamp absorbs floating-point noise when the venue sits on the line.
    let detour = (origin_to_venue + venue_to_dest - direct).max(0.0);
    let distance_to_venue = origin_to_venue.min(venue_to_dest);
    let days_available = (destination.date - origin.date).num_days().saturating_sub(1).max(0);

    let detour_component = 1.0 - (detour / MAX_DETOUR_MILES).min(1.0);
    let proximity_component = 1.0 - (distance_to_venue / MAX_VENUE_DISTANCE_MILES).min(1.0);
    #[allow(clippy::cast_precision_loss)]
    let schedule_component = (days_available as f64 / FULL_CREDIT_FREE_DAYS).min(1.0);

    let score = 100.0
        * (DETOUR_WEIGHT * detour_component
            + PROXIMITY_WEIGHT * proximity_component
            + SCHEDULE_WEIGHT * schedule_component);

    RouteAssessment {
        leg: RouteLeg::Both {
            origin,
            destination,
        },
        distance_to_venue: Some(distance_to_venue),
        detour_distance: Some(detour),
        days_available: Some(days_available),
        routing_score: score.clamp(0.0, 100.0),
    }
}

fn assess_half(leg: RouteLeg, distance_to_venue: f64) -> RouteAssessment {
    let proximity_component = 1.0 - (distance_to_venue / MAX_VENUE_DISTANCE_MILES).min(1.0);
    // Only half the route is known, so only proximity is trustworthy; the
    // discount reflects that uncertainty.
    let score = 100.0 * proximity_component * HALF_ROUTE_DISCOUNT;

    RouteAssessment {
        leg,
        distance_to_venue: Some(distance_to_venue),
        detour_distance: None,
        days_available: None,
        routing_score: score.clamp(0.0, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
    }

    fn stop(lat: f64, lon: f64, city: &str, day: &str) -> TourStop {
        TourStop {
            position: GeoPoint::new(lat, lon).expect("valid test coordinates"),
            venue_name: format!("{city} Hall"),
            city: city.to_owned(),
            region: None,
            date: date(day),
        }
    }

    fn chicago() -> GeoPoint {
        GeoPoint::new(41.8781, -87.6298).expect("valid")
    }

    #[test]
    fn both_legs_bracket_the_window() {
        // Detroit day D, Cleveland day D+10, window in between.
        let stops = vec![
            stop(42.3314, -83.0458, "Detroit", "2026-09-01"),
            stop(41.4993, -81.6944, "Cleveland", "2026-09-11"),
        ];
        let assessment = assess_route(&stops, chicago(), date("2026-09-04"), date("2026-09-06"));

        match &assessment.leg {
            RouteLeg::Both {
                origin,
                destination,
            } => {
                assert_eq!(origin.city, "Detroit");
                assert_eq!(destination.city, "Cleveland");
            }
            other => panic!("expected Both, got {other:?}"),
        }
        assert_eq!(assessment.days_available, Some(9));
        // Chicago is not on the Detroit→Cleveland line, so the detour is real.
        let detour = assessment.detour_distance.expect("detour for Both");
        assert!(detour > 0.0, "got {detour}");
        assert!(assessment.routing_score > 0.0);
    }

    #[test]
    fn venue_on_the_route_line_never_yields_negative_detour() {
        // Venue at the origin itself: o→v is 0, v→d equals direct.
        let origin = stop(42.3314, -83.0458, "Detroit", "2026-09-01");
        let venue = origin.position;
        let stops = vec![origin, stop(41.4993, -81.6944, "Cleveland", "2026-09-11")];
        let assessment = assess_route(&stops, venue, date("2026-09-04"), date("2026-09-06"));
        let detour = assessment.detour_distance.expect("detour for Both");
        assert!(detour >= 0.0, "clamp failed: {detour}");
        assert!(detour < 1e-6, "venue on route should add ~no detour: {detour}");
    }

    #[test]
    fn origin_only_reports_unknown_days_not_zero() {
        let stops = vec![stop(42.3314, -83.0458, "Detroit", "2026-09-01")];
        let assessment = assess_route(&stops, chicago(), date("2026-09-04"), date("2026-09-06"));

        assert!(matches!(assessment.leg, RouteLeg::OriginOnly { .. }));
        assert_eq!(assessment.days_available, None);
        assert_eq!(assessment.detour_distance, None);
        assert!(assessment.distance_to_venue.is_some());
        assert!(assessment.routing_score > 0.0);
    }

    #[test]
    fn destination_only_when_no_earlier_stop_exists() {
        let stops = vec![stop(41.4993, -81.6944, "Cleveland", "2026-09-11")];
        let assessment = assess_route(&stops, chicago(), date("2026-09-04"), date("2026-09-06"));
        assert!(matches!(assessment.leg, RouteLeg::DestinationOnly { .. }));
        assert_eq!(assessment.days_available, None);
    }

    #[test]
    fn no_stops_yields_neither_with_zero_score() {
        let assessment = assess_route(&[], chicago(), date("2026-09-04"), date("2026-09-06"));
        assert_eq!(assessment.leg, RouteLeg::Neither);
        assert_eq!(assessment.distance_to_venue, None);
        assert_eq!(assessment.routing_score, 0.0);
    }

    #[test]
    fn stops_inside_the_window_do_not_bracket_it() {
        // A show inside the window is neither an origin nor a destination.
        let stops = vec![stop(42.3314, -83.0458, "Detroit", "2026-09-05")];
        let assessment = assess_route(&stops, chicago(), date("2026-09-04"), date("2026-09-06"));
        assert_eq!(assessment.leg, RouteLeg::Neither);
    }

    #[test]
    fn nearest_of_two_candidate_origins_by_date_wins() {
        let stops = vec![
            stop(39.7684, -86.1581, "Indianapolis", "2026-08-20"),
            stop(42.3314, -83.0458, "Detroit", "2026-09-01"),
            stop(41.4993, -81.6944, "Cleveland", "2026-09-11"),
            stop(40.4406, -79.9959, "Pittsburgh", "2026-09-20"),
        ];
        let assessment = assess_route(&stops, chicago(), date("2026-09-04"), date("2026-09-06"));
        match &assessment.leg {
            RouteLeg::Both {
                origin,
                destination,
            } => {
                assert_eq!(origin.city, "Detroit", "latest stop before the window");
                assert_eq!(destination.city, "Cleveland", "earliest stop after the window");
            }
            other => panic!("expected Both, got {other:?}"),
        }
    }

    #[test]
    fn routing_score_stays_in_range_for_extreme_geometry() {
        // Sydney to London with a venue in Chicago: enormous detour.
        let stops = vec![
            stop(-33.8688, 151.2093, "Sydney", "2026-09-01"),
            stop(51.5074, -0.1278, "London", "2026-09-11"),
        ];
        let assessment = assess_route(&stops, chicago(), date("2026-09-04"), date("2026-09-06"));
        assert!((0.0..=100.0).contains(&assessment.routing_score));
    }

    #[test]
    fn back_to_back_shows_leave_zero_free_days() {
        let stops = vec![
            stop(42.3314, -83.0458, "Detroit", "2026-09-03"),
            stop(41.4993, -81.6944, "Cleveland", "2026-09-04"),
        ];
        // Window has to sit strictly between the dates; use a same-day window.
        let assessment = assess_route(
            &stops,
            chicago(),
            date("2026-09-03"),
            date("2026-09-03"),
        );
        // Cleveland is after the window end but Detroit is not before the
        // window start, so this is DestinationOnly.
        assert!(matches!(assessment.leg, RouteLeg::DestinationOnly { .. }));

        let stops = vec![
            stop(42.3314, -83.0458, "Detroit", "2026-09-02"),
            stop(41.4993, -81.6944, "Cleveland", "2026-09-04"),
        ];
        let assessment = assess_route(&stops, chicago(), date("2026-09-03"), date("2026-09-03"));
        assert_eq!(assessment.days_available, Some(1));
    }
}
