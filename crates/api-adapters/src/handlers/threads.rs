use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::VoteValue;

use super::thread_ref;
use crate::dto::{ThreadCreateRequest, ThreadUpdateRequest, ThreadView, VoteRequest};
use crate::error::{ApiResult, JsonBody};
use crate::AppState;

/// `POST /api/forum/{slug}/create`
pub async fn create_thread(
    State(state): State<AppState>,
    Path(forum): Path<String>,
    JsonBody(body): JsonBody<ThreadCreateRequest>,
) -> ApiResult<(StatusCode, Json<ThreadView>)> {
    let thread = state
        .threads
        .create_thread(&forum, body.into_new_thread(&forum))
        .await?;
    state.metrics.threads_created.inc();
    Ok((StatusCode::CREATED, Json(thread.into())))
}

/// `GET /api/thread/{slug_or_id}/details`
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread): Path<String>,
) -> ApiResult<Json<ThreadView>> {
    let thread = state.threads.resolve(&thread_ref(&thread)?).await?;
    Ok(Json(thread.into()))
}

/// `POST /api/thread/{slug_or_id}/details`
pub async fn update_thread(
    State(state): State<AppState>,
    Path(thread): Path<String>,
    JsonBody(body): JsonBody<ThreadUpdateRequest>,
) -> ApiResult<Json<ThreadView>> {
    let thread = state
        .threads
        .update_thread(&thread_ref(&thread)?, body.into())
        .await?;
    Ok(Json(thread.into()))
}

/// `POST /api/thread/{slug_or_id}/vote`
pub async fn vote(
    State(state): State<AppState>,
    Path(thread): Path<String>,
    JsonBody(body): JsonBody<VoteRequest>,
) -> ApiResult<Json<ThreadView>> {
    let thread = thread_ref(&thread)?;
    let value = VoteValue::try_from(body.voice)?;
    let thread = state.votes.vote(&thread, &body.nickname, value).await?;
    state.metrics.votes_cast.inc();
    Ok(Json(thread.into()))
}
