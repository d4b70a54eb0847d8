//! Weighted multi-criteria compatibility scoring for a performer/venue pair.
//!
//! Each criterion maps heterogeneous profile attributes to a raw score in
//! `[0, 1]` with a human-readable explanation; the overall result is the
//! weighted sum scaled to a percentage. Weights live in an immutable,
//! validated [`ScoringWeights`] record passed in by the caller rather than
//! ambient constants, and must sum to 1.0 at construction time.
//!
//! The scorer never fails on missing profile data: any attribute absent on
//! either side scores a neutral 0.5 for that criterion.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::profiles::{PerformerProfile, VenueProfile};
use crate::route::RouteAssessment;

/// Immutable criterion weights, validated to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub genre: f64,
    pub capacity: f64,
    pub technical: f64,
    pub past_history: f64,
    pub venue_type: f64,
    pub price_range: f64,
    pub location: f64,
}

const WEIGHT_SUM_EPSILON: f64 = 1e-9;

impl ScoringWeights {
    /// Validates that the weights sum to 1.0 within epsilon.
    ///
    /// Call this once at configuration load, not per scoring call.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WeightSum`] if the sum is off.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let sum = self.genre
            + self.capacity
            + self.technical
            + self.past_history
            + self.venue_type
            + self.price_range
            + self.location;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ValidationError::WeightSum { sum });
        }
        Ok(self)
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            genre: 0.30,
            capacity: 0.20,
            technical: 0.15,
            past_history: 0.10,
            venue_type: 0.05,
            price_range: 0.10,
            location: 0.10,
        }
    }
}

/// One criterion's contribution to a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub name: String,
    pub weight: f64,
    pub raw_score: f64,
    pub explanation: String,
}

/// The scored match for one performer/venue pair.
///
/// `score` is the honest unclamped weighted sum × 100. The legacy booking UI
/// compressed every percentage into `[65, 98]`; that clamp is preserved only
/// as [`MatchResult::display_percentage`] so the core value stays truthful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: f64,
    pub criteria: Vec<CriterionScore>,
}

impl MatchResult {
    /// The presentation-layer percentage, clamped to the legacy `[65, 98]`
    /// display range.
    #[must_use]
    pub fn display_percentage(&self) -> f64 {
        self.score.clamp(65.0, 98.0)
    }
}

const NEUTRAL: f64 = 0.5;

/// Related genre labels that earn partial match credit.
const GENRE_FAMILIES: &[&[&str]] = &[
    &["rock", "alternative", "alt", "punk", "metal", "grunge", "indie", "emo"],
    &["electronic", "edm", "house", "techno", "dance", "dubstep", "synth"],
    &["folk", "country", "americana", "bluegrass", "singer-songwriter"],
    &["hip hop", "hip-hop", "rap", "r&b", "rnb", "soul", "funk"],
    &["jazz", "blues", "swing"],
    &["pop", "synthpop", "dream pop"],
];

/// Related venue types that earn partial match credit.
const VENUE_TYPE_FAMILIES: &[&[&str]] = &[
    &["club", "bar", "lounge", "pub"],
    &["theater", "theatre", "auditorium", "hall", "ballroom"],
    &["arena", "stadium", "amphitheater", "amphitheatre"],
    &["festival", "outdoor", "fairground"],
];

/// Scores one performer against one venue.
///
/// `route` is the routing assessment from the same discovery pass when
/// available; it drives the location criterion. Callers scoring a single
/// pair without running discovery pass `None` and the location criterion
/// falls back to neutral.
#[must_use]
pub fn score_match(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    route: Option<&RouteAssessment>,
    weights: &ScoringWeights,
) -> MatchResult {
    let criteria = vec![
        genre_criterion(performer, venue, weights.genre),
        capacity_criterion(performer, venue, weights.capacity),
        technical_criterion(performer, venue, weights.technical),
        past_history_criterion(performer, venue, weights.past_history),
        venue_type_criterion(performer, venue, weights.venue_type),
        price_range_criterion(performer, venue, weights.price_range),
        location_criterion(performer, venue, route, weights.location),
    ];

    let score = 100.0
        * criteria
            .iter()
            .map(|c| c.weight * c.raw_score)
            .sum::<f64>();

    MatchResult { score, criteria }
}

/// Qualitative tier wording used inside explanations.
fn tier(raw: f64) -> &'static str {
    if raw >= 0.9 {
        "aligns well"
    } else if raw >= 0.7 {
        "is a strong fit"
    } else if raw >= 0.5 {
        "somewhat matches"
    } else {
        "is a stretch"
    }
}

fn norm(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Substring-tolerant label match in either direction.
fn labels_match(a: &str, b: &str) -> bool {
    let (a, b) = (norm(a), norm(b));
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn family_index(families: &[&[&str]], label: &str) -> Option<usize> {
    let label = norm(label);
    families.iter().position(|family| {
        family
            .iter()
            .any(|member| label.contains(member) || member.contains(label.as_str()))
    })
}

fn genre_criterion(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    weight: f64,
) -> CriterionScore {
    let raw = match performer.genre.as_deref() {
        None => NEUTRAL,
        Some(genre) => {
            if venue
                .preferred_genres
                .iter()
                .any(|preferred| labels_match(genre, preferred))
            {
                1.0
            } else if venue
                .primary_genre
                .as_deref()
                .is_some_and(|primary| labels_match(genre, primary))
            {
                0.9
            } else if same_genre_family(genre, venue) {
                0.7
            } else {
                0.3
            }
        }
    };
    let explanation = match performer.genre.as_deref() {
        Some(genre) => format!(
            "{}'s {} sound {} what {} books",
            performer.name,
            genre,
            tier(raw),
            venue.name
        ),
        None => format!(
            "{} has no listed genre, so genre fit with {} is unknown",
            performer.name, venue.name
        ),
    };
    CriterionScore {
        name: "genre".to_owned(),
        weight,
        raw_score: raw,
        explanation,
    }
}

fn same_genre_family(genre: &str, venue: &VenueProfile) -> bool {
    let Some(performer_family) = family_index(GENRE_FAMILIES, genre) else {
        return false;
    };
    venue
        .preferred_genres
        .iter()
        .chain(venue.primary_genre.as_ref())
        .any(|label| family_index(GENRE_FAMILIES, label) == Some(performer_family))
}

fn capacity_criterion(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    weight: f64,
) -> CriterionScore {
    let raw = match (performer.draw_size, venue.capacity) {
        (Some(draw), Some(capacity)) if capacity > 0 => {
            let ratio = f64::from(draw) / f64::from(capacity);
            if (0.7..=0.9).contains(&ratio) {
                1.0
            } else if (0.5..0.7).contains(&ratio) || (ratio > 0.9 && ratio <= 1.1) {
                0.8
            } else if ratio > 1.3 {
                0.3
            } else if ratio < 0.2 {
                0.2
            } else {
                0.5
            }
        }
        _ => NEUTRAL,
    };
    let explanation = match (performer.draw_size, venue.capacity) {
        (Some(draw), Some(capacity)) => format!(
            "{}'s typical draw of {} {} {}'s capacity of {}",
            performer.name,
            draw,
            tier(raw),
            venue.name,
            capacity
        ),
        _ => format!(
            "draw or capacity unknown for {} at {}",
            performer.name, venue.name
        ),
    };
    CriterionScore {
        name: "capacity".to_owned(),
        weight,
        raw_score: raw,
        explanation,
    }
}

fn technical_criterion(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    weight: f64,
) -> CriterionScore {
    let needs = &performer.technical_needs;
    let spec = &venue.technical_spec;
    let raw = if needs.is_empty() || spec.is_empty() {
        NEUTRAL
    } else {
        let met = needs
            .iter()
            .filter(|(item, required)| spec.get(*item).is_some_and(|have| have >= required))
            .count();
        #[allow(clippy::cast_precision_loss)]
        {
            met as f64 / needs.len() as f64
        }
    };
    let explanation = if needs.is_empty() || spec.is_empty() {
        format!(
            "technical requirements unknown for {} at {}",
            performer.name, venue.name
        )
    } else {
        format!(
            "{}'s technical rider {} what {} has installed",
            performer.name,
            tier(raw),
            venue.name
        )
    };
    CriterionScore {
        name: "technical".to_owned(),
        weight,
        raw_score: raw,
        explanation,
    }
}

fn past_history_criterion(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    weight: f64,
) -> CriterionScore {
    let venue_name = norm(&venue.name);
    let raw = if performer
        .past_venues
        .iter()
        .any(|past| norm(past) == venue_name)
    {
        1.0
    } else if performer
        .past_venues
        .iter()
        .any(|past| labels_match(past, &venue.name))
    {
        0.8
    } else {
        0.4
    };
    let explanation = if raw >= 1.0 {
        format!("{} has played {} before", performer.name, venue.name)
    } else if raw >= 0.8 {
        format!(
            "{} has played a room similar in name to {}",
            performer.name, venue.name
        )
    } else {
        format!("{} would be new to {}", performer.name, venue.name)
    };
    CriterionScore {
        name: "past_history".to_owned(),
        weight,
        raw_score: raw,
        explanation,
    }
}

fn venue_type_criterion(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    weight: f64,
) -> CriterionScore {
    let raw = match venue.venue_type.as_deref() {
        Some(venue_type) if !performer.preferred_venue_types.is_empty() => {
            if performer
                .preferred_venue_types
                .iter()
                .any(|preferred| norm(preferred) == norm(venue_type))
            {
                1.0
            } else if performer.preferred_venue_types.iter().any(|preferred| {
                family_index(VENUE_TYPE_FAMILIES, preferred).is_some()
                    && family_index(VENUE_TYPE_FAMILIES, preferred)
                        == family_index(VENUE_TYPE_FAMILIES, venue_type)
            }) {
                0.8
            } else {
                0.4
            }
        }
        _ => NEUTRAL,
    };
    let explanation = match venue.venue_type.as_deref() {
        Some(venue_type) => format!(
            "a {} like {} {} the rooms {} prefers",
            venue_type,
            venue.name,
            tier(raw),
            performer.name
        ),
        None => format!("venue type unknown for {}", venue.name),
    };
    CriterionScore {
        name: "venue_type".to_owned(),
        weight,
        raw_score: raw,
        explanation,
    }
}

fn price_range_criterion(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    weight: f64,
) -> CriterionScore {
    let raw = match (
        performer.average_ticket_price,
        venue.ticket_price_min,
        venue.ticket_price_max,
    ) {
        (Some(price), Some(min), Some(max)) if min <= max => {
            if (min..=max).contains(&price) {
                1.0
            } else if (min * 0.8..=max * 1.2).contains(&price) {
                0.7
            } else {
                0.3
            }
        }
        _ => NEUTRAL,
    };
    let explanation = match performer.average_ticket_price {
        Some(price) => format!(
            "{}'s average ticket of ${price:.2} {} {}'s price range",
            performer.name,
            tier(raw),
            venue.name
        ),
        None => format!("ticket pricing unknown for {}", performer.name),
    };
    CriterionScore {
        name: "price_range".to_owned(),
        weight,
        raw_score: raw,
        explanation,
    }
}

fn location_criterion(
    performer: &PerformerProfile,
    venue: &VenueProfile,
    route: Option<&RouteAssessment>,
    weight: f64,
) -> CriterionScore {
    let distance = route.and_then(|r| r.distance_to_venue);
    let raw = match distance {
        Some(miles) => {
            if miles <= 25.0 {
                1.0
            } else if miles <= 75.0 {
                0.8
            } else if miles <= 150.0 {
                0.6
            } else if miles <= 300.0 {
                0.4
            } else {
                0.2
            }
        }
        None => NEUTRAL,
    };
    let explanation = match distance {
        Some(miles) => format!(
            "{}'s current route passes {miles:.0} miles from {}, which {}",
            performer.name,
            venue.name,
            tier(raw)
        ),
        None => format!(
            "no route data for {}, so geographic convenience at {} is unknown",
            performer.name, venue.name
        ),
    };
    CriterionScore {
        name: "location".to_owned(),
        weight,
        raw_score: raw,
        explanation,
    }
}
