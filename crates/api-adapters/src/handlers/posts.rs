use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{PageQuery, PostDraft, PostRelated, PostSort};
use serde::Deserialize;

use super::{post_id, thread_ref};
use crate::dto::{PostCreateRequest, PostDetailsView, PostEditRequest, PostView};
use crate::error::{ApiResult, JsonBody};
use crate::AppState;

/// `POST /api/thread/{slug_or_id}/create`
pub async fn create_posts(
    State(state): State<AppState>,
    Path(thread): Path<String>,
    JsonBody(body): JsonBody<Vec<PostCreateRequest>>,
) -> ApiResult<(StatusCode, Json<Vec<PostView>>)> {
    let thread = thread_ref(&thread)?;
    let drafts = body
        .into_iter()
        .map(PostDraft::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let posts = state.posts.create_posts(&thread, drafts).await?;
    state.metrics.posts_created.inc_by(posts.len() as u64);
    Ok((
        StatusCode::CREATED,
        Json(posts.into_iter().map(PostView::from).collect()),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPostsParams {
    pub limit: Option<String>,
    pub since: Option<String>,
    pub sort: Option<String>,
    pub desc: Option<String>,
}

/// `GET /api/thread/{slug_or_id}/posts`
pub async fn list_posts(
    State(state): State<AppState>,
    Path(thread): Path<String>,
    Query(params): Query<ListPostsParams>,
) -> ApiResult<Json<Vec<PostView>>> {
    let thread = thread_ref(&thread)?;
    let sort: PostSort = params.sort.as_deref().unwrap_or_default().parse()?;
    let page = PageQuery::parse(
        params.limit.as_deref(),
        params.since.as_deref(),
        params.desc.as_deref(),
    )?;
    let posts = state.posts.list_posts(&thread, sort, page).await?;
    Ok(Json(posts.into_iter().map(PostView::from).collect()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailsParams {
    pub related: Option<String>,
}

/// `GET /api/post/{id}/details`
pub async fn post_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DetailsParams>,
) -> ApiResult<Json<PostDetailsView>> {
    let id = post_id(&id)?;
    let related = PostRelated::parse(params.related.as_deref().unwrap_or_default())?;
    let details = state.posts.post_details(id, related).await?;
    Ok(Json(details.into()))
}

/// `POST /api/post/{id}/details`
pub async fn edit_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PostEditRequest>,
) -> ApiResult<Json<PostView>> {
    let id = post_id(&id)?;
    let post = state
        .posts
        .edit_post(id, body.message.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(post.into()))
}
