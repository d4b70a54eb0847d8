//! Operational endpoints: liveness, catalog status, cache control.

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct HealthBody {
    status: &'static str,
    service: &'static str,
}

pub(super) async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        service: "gigroute-server",
    })
}

#[derive(Debug, Serialize)]
pub(super) struct StatusBody {
    status: &'static str,
    message: String,
    api_key_configured: bool,
    discovery_enabled: bool,
}

/// Reports whether the live catalog credential and the discovery feature
/// flag are active. Demo mode keeps the surface usable without either.
pub(super) async fn status(State(state): State<AppState>) -> Json<StatusBody> {
    let api_key_configured = state.engine.has_live_catalog();
    let message = if !state.config.discovery_enabled {
        "discovery is disabled by configuration".to_owned()
    } else if api_key_configured {
        "live catalog credential configured".to_owned()
    } else {
        "no catalog credential; serving deterministic demo data".to_owned()
    };
    Json(StatusBody {
        status: "ok",
        message,
        api_key_configured,
        discovery_enabled: state.config.discovery_enabled,
    })
}

#[derive(Debug, Serialize)]
pub(super) struct CacheClearBody {
    status: &'static str,
    message: &'static str,
}

pub(super) async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearBody> {
    state.engine.clear_cache().await;
    tracing::info!("result cache cleared by request");
    Json(CacheClearBody {
        status: "ok",
        message: "result cache cleared",
    })
}
