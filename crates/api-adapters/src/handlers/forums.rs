use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{ThreadListQuery, UserListQuery};
use serde::Deserialize;

use crate::dto::{ForumCreateRequest, ForumView, ProfileView, ThreadView};
use crate::error::{ApiResult, JsonBody};
use crate::AppState;

/// Raw listing parameters; `since` is a timestamp for threads and a
/// nickname for users.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub since: Option<String>,
    pub desc: Option<String>,
}

/// `POST /api/forum/create`
pub async fn create_forum(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ForumCreateRequest>,
) -> ApiResult<(StatusCode, Json<ForumView>)> {
    let forum = state.forums.create_forum(body.into()).await?;
    Ok((StatusCode::CREATED, Json(forum.into())))
}

/// `GET /api/forum/{slug}/details`
pub async fn forum_details(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ForumView>> {
    let forum = state.forums.details(&slug).await?;
    Ok(Json(forum.into()))
}

/// `GET /api/forum/{slug}/threads`
pub async fn forum_threads(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<ThreadView>>> {
    let query = ThreadListQuery::parse(
        params.limit.as_deref(),
        params.since.as_deref(),
        params.desc.as_deref(),
    )?;
    let threads = state.forums.threads(&slug, query).await?;
    Ok(Json(threads.into_iter().map(ThreadView::from).collect()))
}

/// `GET /api/forum/{slug}/users`
pub async fn forum_users(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<ProfileView>>> {
    let query = UserListQuery::parse(
        params.limit.as_deref(),
        params.since.as_deref(),
        params.desc.as_deref(),
    )?;
    let users = state.forums.users(&slug, query).await?;
    Ok(Json(users.into_iter().map(ProfileView::from).collect()))
}
