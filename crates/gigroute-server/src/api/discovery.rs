//! The discovery endpoint, in both batch and NDJSON streaming forms.

use axum::{
    body::Body,
    extract::{Extension, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;

use gigroute_core::VenueProfile;
use gigroute_discovery::{
    DiscoveryError, DiscoveryEvent, DiscoveryQuery, DiscoveryStats, MatchedPerformer,
};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

const DEFAULT_RADIUS_MILES: f64 = 100.0;
const DEFAULT_MAX_BANDS: usize = 20;
const DEFAULT_LOOK_AHEAD_DAYS: i64 = 90;
/// Upper bound on the catalog pull window; unbounded values would overflow
/// date arithmetic before the catalog could reject them.
const MAX_LOOK_AHEAD_DAYS: i64 = 365;

/// Raw query parameters, validated into a [`DiscoveryQuery`] before the
/// engine sees them.
#[derive(Debug, Deserialize)]
pub(super) struct DiscoveryParams {
    venue_id: String,
    start_date: String,
    end_date: String,
    radius: Option<f64>,
    /// Comma-separated genre labels; absent means no filtering.
    genres: Option<String>,
    max_bands: Option<usize>,
    look_ahead_days: Option<i64>,
    #[serde(default)]
    demo: bool,
    #[serde(default)]
    streaming: bool,
}

/// The venue shape exposed on the wire; a projection of [`VenueProfile`].
#[derive(Debug, Serialize)]
pub(super) struct VenueSummary {
    id: String,
    name: String,
    address: String,
    city: String,
    state: String,
    #[serde(rename = "zipCode")]
    zip_code: String,
    latitude: f64,
    longitude: f64,
}

impl From<&VenueProfile> for VenueSummary {
    fn from(venue: &VenueProfile) -> Self {
        Self {
            id: venue.id.clone(),
            name: venue.name.clone(),
            address: venue.address.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            zip_code: venue.zip_code.clone(),
            latitude: venue.position.latitude,
            longitude: venue.position.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
struct DiscoveryBody {
    data: Vec<MatchedPerformer>,
    venue: VenueSummary,
    stats: DiscoveryStats,
}

/// One NDJSON line in the streaming response. Mirrors [`DiscoveryEvent`]
/// with the venue projected down to its wire shape.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
enum StreamRecord {
    InProgress {
        results: Vec<MatchedPerformer>,
    },
    Complete {
        results: Vec<MatchedPerformer>,
        venue: VenueSummary,
        stats: DiscoveryStats,
    },
    Error {
        message: String,
    },
}

impl From<DiscoveryEvent> for StreamRecord {
    fn from(event: DiscoveryEvent) -> Self {
        match event {
            DiscoveryEvent::InProgress { results } => Self::InProgress { results },
            DiscoveryEvent::Complete {
                results,
                venue,
                stats,
            } => Self::Complete {
                results,
                venue: VenueSummary::from(&venue),
                stats,
            },
            DiscoveryEvent::Error { message } => Self::Error { message },
        }
    }
}

fn parse_date(request_id: &str, param: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("{param} must be a YYYY-MM-DD date, got '{raw}'"),
        )
    })
}

fn validate(
    request_id: &str,
    params: &DiscoveryParams,
    venue: &VenueProfile,
) -> Result<DiscoveryQuery, ApiError> {
    let window_start = parse_date(request_id, "start_date", &params.start_date)?;
    let window_end = parse_date(request_id, "end_date", &params.end_date)?;
    if window_end < window_start {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("end_date {window_end} is before start_date {window_start}"),
        ));
    }

    let radius_miles = params.radius.unwrap_or(DEFAULT_RADIUS_MILES);
    if !radius_miles.is_finite() || radius_miles <= 0.0 {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("radius must be a positive number of miles, got {radius_miles}"),
        ));
    }

    let max_results = params.max_bands.unwrap_or(DEFAULT_MAX_BANDS);
    if max_results == 0 {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "max_bands must be at least 1",
        ));
    }

    let look_ahead_days = params.look_ahead_days.unwrap_or(DEFAULT_LOOK_AHEAD_DAYS);
    if !(1..=MAX_LOOK_AHEAD_DAYS).contains(&look_ahead_days) {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!(
                "look_ahead_days must be between 1 and {MAX_LOOK_AHEAD_DAYS}, got {look_ahead_days}"
            ),
        ));
    }

    let genre_filter = params
        .genres
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(DiscoveryQuery {
        venue_id: venue.id.clone(),
        venue_position: venue.position,
        window_start,
        window_end,
        radius_miles,
        genre_filter,
        max_results,
        look_ahead_days,
        demo_mode: params.demo,
    })
}

pub(super) async fn run_discovery(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Query(params): Query<DiscoveryParams>,
) -> Result<Response, ApiError> {
    if !state.config.discovery_enabled {
        return Err(ApiError::new(
            &request_id,
            "service_unavailable",
            "discovery is disabled by configuration",
        ));
    }

    let venue = state
        .engine
        .venue(&params.venue_id)
        .ok_or_else(|| {
            ApiError::new(
                &request_id,
                "not_found",
                format!("unknown venue: {}", params.venue_id),
            )
        })?
        .clone();

    let query = validate(&request_id, &params, &venue)?;
    tracing::info!(
        venue = %query.venue_id,
        start = %query.window_start,
        end = %query.window_end,
        streaming = params.streaming,
        demo = query.demo_mode,
        "discovery request"
    );

    if params.streaming {
        let rx = state.engine.run_streaming(query);
        let lines = ReceiverStream::new(rx).map(|event| {
            serde_json::to_string(&StreamRecord::from(event)).map(|mut line| {
                line.push('\n');
                line
            })
        });
        return Ok((
            [(header::CONTENT_TYPE, "application/x-ndjson")],
            Body::from_stream(lines),
        )
            .into_response());
    }

    let response = state.engine.run(&query).await.map_err(|err| match err {
        DiscoveryError::UnknownVenue(id) => {
            ApiError::new(&request_id, "not_found", format!("unknown venue: {id}"))
        }
        DiscoveryError::Validation(source) => {
            ApiError::new(&request_id, "validation_error", source.to_string())
        }
        DiscoveryError::ExternalService(message) => {
            ApiError::new(&request_id, "service_unavailable", message)
        }
    })?;

    let body = DiscoveryBody {
        venue: VenueSummary::from(&response.venue),
        data: response.data,
        stats: response.stats,
    };
    Ok(Json(body).into_response())
}
