//! # Domain Models
//!
//! These structs represent the core entities of the forum.
//! Ids are database-generated integers; posts are totally ordered by id
//! within a creation batch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::path::MaterializedPath;

pub type PostId = i64;
pub type ThreadId = i32;
pub type VoteId = i64;

/// Canonical identity of a user as known by the User Directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub nickname: String,
}

/// A user account as managed through the profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub nickname: String,
    pub fullname: String,
    pub about: String,
    pub email: String,
}

impl From<UserProfile> for Identity {
    fn from(profile: UserProfile) -> Self {
        Identity {
            nickname: profile.nickname,
        }
    }
}

/// Profile update; `None` or blank fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub fullname: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// Drops blank fields.
    pub fn non_blank(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        UserPatch {
            fullname: keep(self.fullname),
            about: keep(self.about),
            email: keep(self.email),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fullname.is_none() && self.about.is_none() && self.email.is_none()
    }
}

/// Input for forum creation; `author` is canonicalized before persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewForum {
    pub slug: String,
    pub title: String,
    pub author: String,
}

/// Forum as seen through the Forum Registry, including its aggregate counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumRef {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub posts: i64,
    pub threads: i32,
}

/// A discussion thread. `votes` is only ever changed by the vote ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    /// Optional human-readable alternate key, never purely numeric.
    pub slug: Option<String>,
    pub title: String,
    pub message: String,
    pub author: String,
    pub forum: String,
    pub created: DateTime<Utc>,
    pub votes: i32,
}

/// Input for thread creation. `author` and `forum` are replaced by their
/// canonical spellings before the thread is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    pub slug: Option<String>,
    pub title: String,
    pub message: String,
    pub author: String,
    pub forum: String,
    pub created: Option<DateTime<Utc>>,
}

/// Title/message edit. `None` or an empty string leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadPatch {
    pub title: Option<String>,
    pub message: Option<String>,
}

/// How a caller names a thread: numeric id or slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThreadRef {
    Id(ThreadId),
    Slug(String),
}

impl ThreadRef {
    /// An all-digit reference is an id; anything else is a slug.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.is_empty() {
            return Err(DomainError::validation("empty thread reference"));
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            raw.parse::<ThreadId>()
                .map(ThreadRef::Id)
                .map_err(|_| DomainError::validation(format!("thread id out of range: {raw}")))
        } else {
            Ok(ThreadRef::Slug(raw.to_string()))
        }
    }
}

impl FromStr for ThreadRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadRef::Id(id) => write!(f, "{id}"),
            ThreadRef::Slug(slug) => f.write_str(slug),
        }
    }
}

impl From<ThreadId> for ThreadRef {
    fn from(id: ThreadId) -> Self {
        ThreadRef::Id(id)
    }
}

/// The fundamental unit of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// `None` for a top-level post.
    pub parent: Option<PostId>,
    pub author: String,
    pub message: String,
    pub forum: String,
    pub thread: ThreadId,
    pub created: DateTime<Utc>,
    pub is_edited: bool,
    /// Ancestor ids followed by `id`.
    pub path: MaterializedPath,
}

impl Post {
    /// Id of the top-level ancestor (the post itself when top-level).
    pub fn root(&self) -> PostId {
        self.path.root()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

/// A candidate post submitted as part of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub parent: Option<PostId>,
    pub author: String,
    pub message: String,
}

impl PostDraft {
    pub fn new(parent: Option<PostId>, author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parent,
            author: author.into(),
            message: message.into(),
        }
    }
}

/// Which related entities to attach to a post lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostRelated {
    pub user: bool,
    pub forum: bool,
    pub thread: bool,
}

impl PostRelated {
    /// Parses a comma separated list such as `user,thread`. Blank items are ignored.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let mut related = Self::default();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item {
                "user" => related.user = true,
                "forum" => related.forum = true,
                "thread" => related.thread = true,
                other => {
                    return Err(DomainError::validation(format!("unknown related entity: {other}")))
                }
            }
        }
        Ok(related)
    }
}

/// A post together with the related entities that were asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetails {
    pub post: Post,
    pub author: Option<Identity>,
    pub forum: Option<ForumRef>,
    pub thread: Option<Thread>,
}

/// The two vote polarities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i32(self) -> i32 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i32> for VoteValue {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(DomainError::validation(format!("vote must be 1 or -1, got {other}"))),
        }
    }
}

/// One appended entry of the vote ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    pub id: VoteId,
    pub nickname: String,
    pub value: VoteValue,
    pub thread_id: ThreadId,
    pub previous_vote_id: Option<VoteId>,
}

/// Aggregate row counts reported by the status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub users: i64,
    pub forums: i64,
    pub threads: i64,
    pub posts: i64,
}
