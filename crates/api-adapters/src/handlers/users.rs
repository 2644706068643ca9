use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{ProfileView, UserCreateRequest, UserUpdateRequest};
use crate::error::{ApiResult, JsonBody};
use crate::AppState;

/// `POST /api/user/{nickname}/create`
pub async fn create_user(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    JsonBody(body): JsonBody<UserCreateRequest>,
) -> ApiResult<(StatusCode, Json<ProfileView>)> {
    let profile = state.users.create_user(body.into_profile(&nickname)).await?;
    Ok((StatusCode::CREATED, Json(profile.into())))
}

/// `GET /api/user/{nickname}/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> ApiResult<Json<ProfileView>> {
    let profile = state.users.profile(&nickname).await?;
    Ok(Json(profile.into()))
}

/// `POST /api/user/{nickname}/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    JsonBody(body): JsonBody<UserUpdateRequest>,
) -> ApiResult<Json<ProfileView>> {
    let profile = state.users.update_profile(&nickname, body.into()).await?;
    Ok(Json(profile.into()))
}
