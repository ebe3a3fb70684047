//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::domain::{Station, StationId};
use crate::geo::{GeoStation, Now, select_now};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations))
        .route("/station/:id", get(get_station))
        .route("/near/:location", get(near_stations))
        .route("/now/:location", get(now))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        stations: state.registry.len().await,
        refreshed_at: state.registry.refreshed_at().await,
    })
}

/// All stations matching the filters, by id.
async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Json<Vec<Station>> {
    Json(state.registry.filter(&query.availability()).await)
}

/// One station by id.
async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Station>, AppError> {
    let id: StationId = id.parse().map_err(|e| AppError::BadRequest {
        message: format!("{e}: {id:?}"),
    })?;

    state
        .registry
        .lookup(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Station {id} not found"),
        })
}

/// Stations matching the filters, nearest first, at most `n` of them.
async fn near_stations(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(query): Query<NearQuery>,
) -> Result<Json<Vec<GeoStation>>, AppError> {
    let origin = parse_location(&location)?;

    let mut stations = state
        .registry
        .rank_by_distance(origin, &query.availability())
        .await;
    if let Some(n) = query.limit() {
        stations.truncate(n);
    }

    Ok(Json(stations))
}

/// Nearest bike, slot, and ticket terminal.
async fn now(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Now>, AppError> {
    let origin = parse_location(&location)?;
    let ranked = state.registry.rank_by_distance(origin, &[]).await;
    Ok(Json(select_now(&ranked)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<InvalidLocation> for AppError {
    fn from(e: InvalidLocation) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
