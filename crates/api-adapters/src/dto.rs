//! # Wire format
//!
//! Request and response bodies. Top-level posts travel with `parent = 0`.

use chrono::{DateTime, Utc};
use domains::{
    DomainError, DomainResult, ForumRef, Identity, NewForum, NewThread, Post, PostDetails,
    PostDraft, ServiceStatus, Thread, ThreadPatch, UserPatch, UserProfile,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PostCreateRequest {
    #[serde(default)]
    pub parent: i64,
    pub author: String,
    pub message: String,
}

impl TryFrom<PostCreateRequest> for PostDraft {
    type Error = DomainError;

    fn try_from(req: PostCreateRequest) -> DomainResult<Self> {
        let parent = match req.parent {
            0 => None,
            id if id > 0 => Some(id),
            id => return Err(DomainError::validation(format!("invalid parent id {id}"))),
        };
        Ok(PostDraft {
            parent,
            author: req.author,
            message: req.message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: i64,
    pub parent: i64,
    pub author: String,
    pub message: String,
    pub is_edited: bool,
    pub forum: String,
    pub thread: i32,
    pub created: DateTime<Utc>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        PostView {
            id: post.id,
            parent: post.parent.unwrap_or(0),
            author: post.author,
            message: post.message,
            is_edited: post.is_edited,
            forum: post.forum,
            thread: post.thread,
            created: post.created,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostEditRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadCreateRequest {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl ThreadCreateRequest {
    pub fn into_new_thread(self, forum: &str) -> NewThread {
        NewThread {
            slug: self.slug,
            title: self.title,
            message: self.message,
            author: self.author,
            forum: forum.to_string(),
            created: self.created,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<ThreadUpdateRequest> for ThreadPatch {
    fn from(req: ThreadUpdateRequest) -> Self {
        ThreadPatch {
            title: req.title,
            message: req.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    pub forum: String,
    pub message: String,
    pub votes: i32,
    pub created: DateTime<Utc>,
}

impl From<Thread> for ThreadView {
    fn from(thread: Thread) -> Self {
        ThreadView {
            id: thread.id,
            slug: thread.slug,
            title: thread.title,
            author: thread.author,
            forum: thread.forum,
            message: thread.message,
            votes: thread.votes,
            created: thread.created,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub nickname: String,
    pub voice: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub nickname: String,
}

impl From<Identity> for UserView {
    fn from(identity: Identity) -> Self {
        UserView {
            nickname: identity.nickname,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreateRequest {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub about: String,
    pub email: String,
}

impl UserCreateRequest {
    pub fn into_profile(self, nickname: &str) -> UserProfile {
        UserProfile {
            nickname: nickname.to_string(),
            fullname: self.fullname,
            about: self.about,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<UserUpdateRequest> for UserPatch {
    fn from(req: UserUpdateRequest) -> Self {
        UserPatch {
            fullname: req.fullname,
            about: req.about,
            email: req.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub nickname: String,
    pub fullname: String,
    pub about: String,
    pub email: String,
}

impl From<UserProfile> for ProfileView {
    fn from(profile: UserProfile) -> Self {
        ProfileView {
            nickname: profile.nickname,
            fullname: profile.fullname,
            about: profile.about,
            email: profile.email,
        }
    }
}

/// `user` names the forum owner.
#[derive(Debug, Clone, Deserialize)]
pub struct ForumCreateRequest {
    pub slug: String,
    pub title: String,
    pub user: String,
}

impl From<ForumCreateRequest> for NewForum {
    fn from(req: ForumCreateRequest) -> Self {
        NewForum {
            slug: req.slug,
            title: req.title,
            author: req.user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumView {
    pub slug: String,
    pub title: String,
    pub user: String,
    pub posts: i64,
    pub threads: i32,
}

impl From<ForumRef> for ForumView {
    fn from(forum: ForumRef) -> Self {
        ForumView {
            slug: forum.slug,
            title: forum.title,
            user: forum.author,
            posts: forum.posts,
            threads: forum.threads,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetailsView {
    pub post: PostView,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub author: Option<UserView>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub forum: Option<ForumView>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thread: Option<ThreadView>,
}

impl From<PostDetails> for PostDetailsView {
    fn from(details: PostDetails) -> Self {
        PostDetailsView {
            post: details.post.into(),
            author: details.author.map(Into::into),
            forum: details.forum.map(Into::into),
            thread: details.thread.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub user: i64,
    pub forum: i64,
    pub thread: i64,
    pub post: i64,
}

impl From<ServiceStatus> for StatusView {
    fn from(status: ServiceStatus) -> Self {
        StatusView {
            user: status.users,
            forum: status.forums,
            thread: status.threads,
            post: status.posts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
