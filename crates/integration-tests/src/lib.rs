//! # integration-tests
//!
//! Shared fixtures: a seeded `MemoryStore` with services wired on top.

use std::sync::Arc;

use domains::{NewThread, PostDraft, PostId, Thread, ThreadRef};
use services::{ForumService, PostService, ThreadService, UserService, VoteService};
use storage_adapters::MemoryStore;

pub const FORUM: &str = "general";
pub const THREAD_SLUG: &str = "intro";

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub posts: PostService,
    pub threads: ThreadService,
    pub votes: VoteService,
    pub users: UserService,
    pub forums: ForumService,
    pub thread: Thread,
}

impl Fixture {
    /// Users alice and bob, forum `general`, thread `intro` by alice.
    pub async fn seeded() -> Self {
        let store = seeded_store().await;
        let posts = PostService::new(store.clone(), store.clone(), store.clone(), store.clone());
        let threads = ThreadService::new(store.clone(), store.clone(), store.clone());
        let votes = VoteService::new(store.clone(), store.clone(), store.clone());
        let users = UserService::new(store.clone());
        let forums = ForumService::new(store.clone(), store.clone(), store.clone(), store.clone());
        let thread = threads
            .create_thread(FORUM, intro_thread())
            .await
            .expect("seed thread");
        Self {
            store,
            posts,
            threads,
            votes,
            users,
            forums,
            thread,
        }
    }

    pub fn thread_ref(&self) -> ThreadRef {
        ThreadRef::Id(self.thread.id)
    }

    /// Creates posts in the seeded thread and returns their ids.
    pub async fn post_batch(&self, drafts: Vec<PostDraft>) -> Vec<PostId> {
        self.posts
            .create_posts(&self.thread_ref(), drafts)
            .await
            .expect("batch create")
            .into_iter()
            .map(|p| p.id)
            .collect()
    }
}

pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_user("alice").await.expect("seed alice");
    store.add_user("bob").await.expect("seed bob");
    store
        .add_forum(FORUM, "General discussion", "alice")
        .await
        .expect("seed forum");
    store
}

pub fn intro_thread() -> NewThread {
    NewThread {
        slug: Some(THREAD_SLUG.to_string()),
        title: "Introductions".to_string(),
        message: "Say hi".to_string(),
        author: "alice".to_string(),
        forum: FORUM.to_string(),
        created: None,
    }
}

pub fn top(author: &str, message: &str) -> PostDraft {
    PostDraft::new(None, author, message)
}

pub fn reply(parent: PostId, author: &str, message: &str) -> PostDraft {
    PostDraft::new(Some(parent), author, message)
}

#[cfg(feature = "web-axum")]
pub mod http {
    //! Request helpers for driving the router in-process.

    use std::sync::Arc;

    use api_adapters::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use storage_adapters::MemoryStore;
    use tower::ServiceExt;

    /// Router over a seeded store; the `intro` thread is created through the API.
    pub async fn seeded_app() -> (Router, Arc<MemoryStore>) {
        let store = super::seeded_store().await;
        let app = api_adapters::router(AppState::from_store(store.clone()));
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/forum/general/create",
            Some(serde_json::json!({
                "slug": super::THREAD_SLUG,
                "title": "Introductions",
                "author": "alice",
                "message": "Say hi",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (app, store)
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, None).await
    }

    pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, Some(body)).await
    }
}
