//! Row shapes as read from PostgreSQL and their domain conversions.

use chrono::{DateTime, Utc};
use domains::{
    DomainError, ForumRef, MaterializedPath, Post, Thread, UserProfile, VoteEvent, VoteValue,
};
use sqlx::FromRow;

use super::TOP_LEVEL;

pub(crate) const POST_COLUMNS: &str = "id, parent, author, message, forum, thread, created, is_edited, path";
pub(crate) const THREAD_COLUMNS: &str = "id, slug, title, message, author, forum, created, votes";
pub(crate) const USER_COLUMNS: &str = "nickname, fullname, about, email";
pub(crate) const FORUM_COLUMNS: &str = "slug, title, author, posts, threads";

#[derive(Debug, FromRow)]
pub(crate) struct PostRow {
    id: i64,
    parent: i64,
    author: String,
    message: String,
    forum: String,
    thread: i32,
    created: DateTime<Utc>,
    is_edited: bool,
    path: Vec<i64>,
}

impl TryFrom<PostRow> for Post {
    type Error = DomainError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.id,
            parent: (row.parent != TOP_LEVEL).then_some(row.parent),
            author: row.author,
            message: row.message,
            forum: row.forum,
            thread: row.thread,
            created: row.created,
            is_edited: row.is_edited,
            path: MaterializedPath::from_ids(row.path)?,
        })
    }
}

pub(crate) fn into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, DomainError> {
    rows.into_iter().map(Post::try_from).collect()
}

#[derive(Debug, FromRow)]
pub(crate) struct ThreadRow {
    id: i32,
    slug: Option<String>,
    title: String,
    message: String,
    author: String,
    forum: String,
    created: DateTime<Utc>,
    votes: i32,
}

impl From<ThreadRow> for Thread {
    fn from(row: ThreadRow) -> Self {
        Thread {
            id: row.id,
            slug: row.slug,
            title: row.title,
            message: row.message,
            author: row.author,
            forum: row.forum,
            created: row.created,
            votes: row.votes,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    nickname: String,
    fullname: String,
    about: String,
    email: String,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            nickname: row.nickname,
            fullname: row.fullname,
            about: row.about,
            email: row.email,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ForumRow {
    slug: String,
    title: String,
    author: String,
    posts: i64,
    threads: i32,
}

impl From<ForumRow> for ForumRef {
    fn from(row: ForumRow) -> Self {
        ForumRef {
            slug: row.slug,
            title: row.title,
            author: row.author,
            posts: row.posts,
            threads: row.threads,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct VoteRow {
    id: i64,
    nickname: String,
    value: i32,
    thread_id: i32,
    previous_vote_id: Option<i64>,
}

impl TryFrom<VoteRow> for VoteEvent {
    type Error = DomainError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(VoteEvent {
            id: row.id,
            nickname: row.nickname,
            value: VoteValue::try_from(row.value)?,
            thread_id: row.thread_id,
            previous_vote_id: row.previous_vote_id,
        })
    }
}
