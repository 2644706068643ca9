use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::dto::StatusView;
use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/service/status`
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<StatusView>> {
    let status = state.status.status().await?;
    Ok(Json(status.into()))
}

/// `POST /api/service/clear`
pub async fn clear(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.maintenance.clear().await?;
    tracing::warn!("service data cleared over http");
    Ok(StatusCode::OK)
}

/// `GET /metrics` in the OpenMetrics text format.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
