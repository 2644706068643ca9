//! # Core Traits (Ports)
//!
//! Any storage backend must implement these traits to be wired into the
//! services. Multi-step mutations (`create_posts`, `create_thread`,
//! `cast_vote`) are a single unit of work inside the implementation: either
//! every effect is committed or none is.

use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::{
    ForumRef, Identity, NewForum, NewThread, Post, PostDraft, PostId, ServiceStatus, Thread,
    ThreadId, ThreadPatch, ThreadRef, UserPatch, UserProfile, VoteEvent, VoteValue,
};
use crate::paging::{PageQuery, PostSort, ThreadListQuery, UserListQuery};

/// Resolves nicknames to canonical identities (case-insensitive).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `NotFound` when no user carries this nickname.
    async fn resolve(&self, nickname: &str) -> DomainResult<Identity>;
}

/// User account management. Nicknames and emails are unique
/// case-insensitively.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// `Conflict` when the nickname or the email is already taken.
    async fn create_user(&self, profile: UserProfile) -> DomainResult<UserProfile>;
    async fn find_user(&self, nickname: &str) -> DomainResult<Option<UserProfile>>;
    /// `Conflict` when the new email belongs to another user.
    async fn update_user(&self, nickname: &str, patch: UserPatch) -> DomainResult<Option<UserProfile>>;
    /// Users who authored a thread or a post in `forum` (canonical slug).
    async fn forum_users(&self, forum: &str, query: UserListQuery) -> DomainResult<Vec<UserProfile>>;
}

/// Forum lookup, creation and aggregate counters.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ForumRegistry: Send + Sync {
    /// `Conflict` when the slug is already taken.
    async fn create_forum(&self, forum: NewForum) -> DomainResult<ForumRef>;
    /// `NotFound` when no forum carries this slug (case-insensitive).
    async fn resolve_by_slug(&self, slug: &str) -> DomainResult<ForumRef>;
    async fn increment_post_count(&self, forum: &str, delta: i64) -> DomainResult<()>;
    async fn increment_thread_count(&self, forum: &str) -> DomainResult<()>;
}

/// Thread persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Persists the thread and bumps the forum's thread counter atomically.
    /// `Conflict` when the slug is already taken.
    async fn create_thread(&self, thread: NewThread) -> DomainResult<Thread>;
    async fn find_thread(&self, thread: &ThreadRef) -> DomainResult<Option<Thread>>;
    async fn update_thread(&self, id: ThreadId, patch: ThreadPatch) -> DomainResult<Option<Thread>>;
    /// Threads of `forum` (canonical slug) ordered by creation time.
    async fn list_forum_threads(&self, forum: &str, query: ThreadListQuery) -> DomainResult<Vec<Thread>>;
}

/// Post persistence: bulk creation, traversal and edits.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Atomically creates `drafts` under `thread` in input order, assigns
    /// ids, timestamps and materialized paths, and adds the batch size to
    /// the forum post counter. Authors must already be canonical.
    /// `Conflict` when a parent is missing or lives in another thread.
    async fn create_posts(&self, thread: &Thread, drafts: Vec<PostDraft>) -> DomainResult<Vec<Post>>;
    async fn find_post(&self, id: PostId) -> DomainResult<Option<Post>>;
    async fn list_posts(
        &self,
        thread: ThreadId,
        sort: PostSort,
        page: PageQuery,
    ) -> DomainResult<Vec<Post>>;
    /// Applies [`crate::resolve_edit`] atomically against the stored message.
    async fn edit_message(&self, id: PostId, candidate: &str) -> DomainResult<Option<Post>>;
}

/// Append-only vote log plus the running tally on each thread.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Appends a vote event and applies `value - previous` to the thread
    /// tally in one transaction. Returns the new tally.
    async fn cast_vote(&self, thread: ThreadId, nickname: &str, value: VoteValue) -> DomainResult<i32>;
    /// Every event recorded for a thread, oldest first.
    async fn vote_history(&self, thread: ThreadId) -> DomainResult<Vec<VoteEvent>>;
}

/// Row counts for the status endpoint.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait StatusReport: Send + Sync {
    async fn status(&self) -> DomainResult<ServiceStatus>;
}

/// Wipes every entity; used by the service clear endpoint.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Maintenance: Send + Sync {
    async fn clear(&self) -> DomainResult<()>;
}
