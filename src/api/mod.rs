//! HTTP API
//!
//! `GET /api/forecast` answers forecast queries, `GET /api/cities` lists the
//! cities known for a state. Both sit behind the bearer-token check when a
//! token is configured; `GET /health` is always open.

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ErrorCode, ForecastError};
use crate::forecast::ForecastService;
use crate::request::ForecastQuery;
use crate::store::MeasurementStore;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub forecasts: ForecastService,
    pub store: MeasurementStore,
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        forecasts: ForecastService,
        store: MeasurementStore,
        api_token: Option<String>,
    ) -> Self {
        Self {
            forecasts,
            store,
            api_token: api_token.map(Arc::from),
        }
    }
}

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: ErrorCode,
}

fn error_response(status: StatusCode, code: ErrorCode, message: String) -> Response {
    (status, Json(ApiError { error: message, code })).into_response()
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = match &self {
            ForecastError::InvalidRequest { .. }
            | ForecastError::InvalidDateFormat { .. }
            | ForecastError::MissingDateSelector => StatusCode::BAD_REQUEST,
            ForecastError::NotFound { .. }
            | ForecastError::NoHistoricalData { .. }
            | ForecastError::NoDataInRange => StatusCode::NOT_FOUND,
            ForecastError::Source { .. } => {
                tracing::error!("Forecast failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, self.code(), self.to_string())
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CitiesQuery {
    pub state: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/forecast", get(get_forecast))
        .route("/cities", get(get_cities))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        message: "climia is running",
    })
}

/// One object for a single result, an array otherwise
async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Response, ForecastError> {
    let request = query.validate()?;
    let mut days = state.forecasts.get_forecast(&request).await?.into_days();

    if days.len() == 1 {
        return Ok(Json(days.remove(0)).into_response());
    }
    Ok(Json(days).into_response())
}

async fn get_cities(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> Result<Json<Vec<String>>, ForecastError> {
    let Some(uf) = query.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(ForecastError::invalid_request("state is required"));
    };
    let cities = state.store.cities_in_state(uf).await?;
    Ok(Json(cities))
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };

    let verdict = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        None => Err("Authorization header required"),
        Some(value) => match value.strip_prefix("Bearer ") {
            None => Err("Invalid authorization format. Use: Bearer <token>"),
            Some(token) if token == expected => Ok(()),
            Some(_) => Err("Invalid API token"),
        },
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err(message) => {
            tracing::warn!("Rejected request to {}: {}", request.uri().path(), message);
            error_response(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message.to_string())
        }
    }
}
