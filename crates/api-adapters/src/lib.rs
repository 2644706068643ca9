//! # api-adapters
//!
//! HTTP transport for the forum core: maps routes onto service calls,
//! (de)serializes the wire format and turns `DomainError` into statuses.

pub mod dto;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
mod router;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use router::router;

use std::sync::Arc;

use domains::{
    ForumRegistry, Maintenance, PostRepository, StatusReport, ThreadRepository, UserAccounts,
    UserDirectory, VoteLedger,
};
use services::{ForumService, PostService, ThreadService, UserService, VoteService};

pub use metrics::Metrics;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub threads: ThreadService,
    pub votes: VoteService,
    pub users: UserService,
    pub forums: ForumService,
    pub status: Arc<dyn StatusReport>,
    pub maintenance: Arc<dyn Maintenance>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires every service onto a single store that implements all ports.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: PostRepository
            + ThreadRepository
            + UserDirectory
            + UserAccounts
            + ForumRegistry
            + VoteLedger
            + StatusReport
            + Maintenance
            + 'static,
    {
        Self {
            posts: PostService::new(store.clone(), store.clone(), store.clone(), store.clone()),
            threads: ThreadService::new(store.clone(), store.clone(), store.clone()),
            votes: VoteService::new(store.clone(), store.clone(), store.clone()),
            users: UserService::new(store.clone()),
            forums: ForumService::new(store.clone(), store.clone(), store.clone(), store.clone()),
            status: store.clone(),
            maintenance: store,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
