use std::time::Duration;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{forums, posts, service, threads, users};
use crate::AppState;

/// Builds the full HTTP surface over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let api = Router::new()
        .route("/user/{nickname}/create", post(users::create_user))
        .route(
            "/user/{nickname}/profile",
            get(users::get_profile).post(users::update_profile),
        )
        .route("/forum/create", post(forums::create_forum))
        .route("/forum/{slug}/details", get(forums::forum_details))
        .route("/forum/{slug}/threads", get(forums::forum_threads))
        .route("/forum/{slug}/users", get(forums::forum_users))
        .route("/forum/{slug}/create", post(threads::create_thread))
        .route(
            "/thread/{slug_or_id}/details",
            get(threads::get_thread).post(threads::update_thread),
        )
        .route("/thread/{slug_or_id}/create", post(posts::create_posts))
        .route("/thread/{slug_or_id}/posts", get(posts::list_posts))
        .route("/thread/{slug_or_id}/vote", post(threads::vote))
        .route(
            "/post/{id}/details",
            get(posts::post_details).post(posts::edit_post),
        )
        .route("/service/status", get(service::status))
        .route("/service/clear", post(service::clear));

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(service::metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
