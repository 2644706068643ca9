//! # Handlers
//!
//! Thin glue between axum extractors and the services. Each handler parses
//! its path and query input into domain types and lets `ApiError` pick the
//! status.

pub mod forums;
pub mod posts;
pub mod service;
pub mod threads;
pub mod users;

use domains::{DomainError, DomainResult, PostId, ThreadRef};

pub(crate) fn thread_ref(raw: &str) -> DomainResult<ThreadRef> {
    ThreadRef::parse(raw)
}

pub(crate) fn post_id(raw: &str) -> DomainResult<PostId> {
    raw.parse::<PostId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| DomainError::validation(format!("invalid post id {raw:?}")))
}
