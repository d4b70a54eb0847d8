//! Single-pair compatibility scoring, without a discovery run.

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use gigroute_core::{score_match, CriterionScore};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct CompatibilityParams {
    performer_id: String,
    venue_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CompatibilityBody {
    performer_id: String,
    performer_name: String,
    venue_id: String,
    venue_name: String,
    score: f64,
    display_percentage: f64,
    criteria: Vec<CriterionScore>,
}

/// Scores one performer/venue pair from the stores. No route assessment is
/// available here, so the location criterion falls back to neutral.
pub(super) async fn score_pair(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Query(params): Query<CompatibilityParams>,
) -> Result<Json<CompatibilityBody>, ApiError> {
    let performer = state.engine.performer(&params.performer_id).ok_or_else(|| {
        ApiError::new(
            &request_id,
            "not_found",
            format!("unknown performer: {}", params.performer_id),
        )
    })?;
    let venue = state.engine.venue(&params.venue_id).ok_or_else(|| {
        ApiError::new(
            &request_id,
            "not_found",
            format!("unknown venue: {}", params.venue_id),
        )
    })?;

    let result = score_match(performer, venue, None, state.engine.weights());
    Ok(Json(CompatibilityBody {
        performer_id: performer.id.clone(),
        performer_name: performer.name.clone(),
        venue_id: venue.id.clone(),
        venue_name: venue.name.clone(),
        score: result.score,
        display_percentage: result.display_percentage(),
        criteria: result.criteria,
    }))
}
