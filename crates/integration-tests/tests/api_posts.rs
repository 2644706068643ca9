use axum::http::StatusCode;
use integration_tests::http::{get, post, seeded_app};
use serde_json::{json, Value};

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn create_posts_returns_201_with_wire_fields() {
    let (app, _) = seeded_app().await;

    let (status, body) = post(
        &app,
        "/api/thread/intro/create",
        json!([
            {"parent": 0, "author": "alice", "message": "hi"},
            {"author": "bob", "message": "yo"},
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["parent"], 0);
    assert_eq!(posts[0]["isEdited"], false);
    assert_eq!(posts[0]["forum"], "general");
    assert!(posts[0].get("path").is_none());
}

#[tokio::test]
async fn create_posts_maps_errors_to_statuses() {
    let (app, _) = seeded_app().await;

    let (status, body) = post(
        &app,
        "/api/thread/intro/create",
        json!([{"parent": 999, "author": "alice", "message": "x"}]),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (status, _) = post(
        &app,
        "/api/thread/intro/create",
        json!([{"author": "mallory", "message": "x"}]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&app, "/api/thread/missing/create", json!([])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_posts_supports_sorts_and_cursor() {
    let (app, _) = seeded_app().await;
    let (_, created) = post(
        &app,
        "/api/thread/intro/create",
        json!([
            {"author": "alice", "message": "a"},
            {"author": "bob", "message": "b"},
        ]),
    )
    .await;
    let tops = ids(&created);
    post(
        &app,
        "/api/thread/intro/create",
        json!([{"parent": tops[0], "author": "bob", "message": "a1"}]),
    )
    .await;

    let (status, flat) = get(&app, "/api/thread/intro/posts?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&flat), vec![tops[0]]);

    let uri = format!("/api/thread/intro/posts?since={}", tops[0]);
    let (_, rest) = get(&app, &uri).await;
    assert_eq!(ids(&rest).len(), 2);

    let (_, tree) = get(&app, "/api/thread/intro/posts?sort=tree").await;
    let messages: Vec<&str> = tree
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, ["a", "a1", "b"]);

    let (_, parent_tree) = get(&app, "/api/thread/intro/posts?sort=parent_tree&limit=1&desc=true").await;
    assert_eq!(ids(&parent_tree), vec![tops[1]]);
}

#[tokio::test]
async fn malformed_paging_is_bad_request() {
    let (app, _) = seeded_app().await;

    for uri in [
        "/api/thread/intro/posts?limit=0",
        "/api/thread/intro/posts?limit=ten",
        "/api/thread/intro/posts?desc=maybe",
        "/api/thread/intro/posts?sort=sideways",
    ] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn post_details_and_edit() {
    let (app, _) = seeded_app().await;
    let (_, created) = post(
        &app,
        "/api/thread/intro/create",
        json!([{"author": "alice", "message": "hi"}]),
    )
    .await;
    let id = ids(&created)[0];
    let uri = format!("/api/post/{id}/details");

    let (status, edited) = post(&app, &uri, json!({"message": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["isEdited"], false);

    let (_, edited) = post(&app, &uri, json!({"message": "hello"})).await;
    assert_eq!(edited["isEdited"], true);
    assert_eq!(edited["message"], "hello");

    let (status, details) = get(&app, &format!("{uri}?related=user,forum,thread")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["post"]["message"], "hello");
    assert_eq!(details["author"]["nickname"], "alice");
    assert_eq!(details["forum"]["posts"], 1);
    assert_eq!(details["thread"]["slug"], "intro");

    let (_, bare) = get(&app, &uri).await;
    assert!(bare.get("author").is_none());

    let (status, _) = get(&app, "/api/post/999/details").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, "/api/post/abc/details").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
