//! User Directory, Forum Registry, status counts and the clear operation.

use async_trait::async_trait;
use domains::{
    DomainError, DomainResult, ForumRef, ForumRegistry, Identity, Maintenance, NewForum,
    ServiceStatus, StatusReport, UserDirectory,
};
use sqlx::PgConnection;
use tracing::{info, warn};

use super::error::db_error;
use super::rows::{ForumRow, FORUM_COLUMNS};
use super::PgStore;

/// Adds `delta` to a forum's post counter on an open connection or transaction.
pub(crate) async fn bump_post_count(conn: &mut PgConnection, forum: &str, delta: i64) -> DomainResult<()> {
    let updated = sqlx::query("UPDATE forum SET posts = posts + $2 WHERE slug = $1")
        .bind(forum)
        .bind(delta)
        .execute(conn)
        .await
        .map_err(db_error)?;
    if updated.rows_affected() == 0 {
        return Err(DomainError::not_found(format!("forum {forum}")));
    }
    Ok(())
}

pub(crate) async fn bump_thread_count(conn: &mut PgConnection, forum: &str) -> DomainResult<()> {
    let updated = sqlx::query("UPDATE forum SET threads = threads + 1 WHERE slug = $1")
        .bind(forum)
        .execute(conn)
        .await
        .map_err(db_error)?;
    if updated.rows_affected() == 0 {
        return Err(DomainError::not_found(format!("forum {forum}")));
    }
    Ok(())
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn resolve(&self, nickname: &str) -> DomainResult<Identity> {
        let canonical: Option<String> =
            sqlx::query_scalar("SELECT nickname FROM users WHERE lower(nickname) = lower($1)")
                .bind(nickname)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        canonical
            .map(|nickname| Identity { nickname })
            .ok_or_else(|| DomainError::not_found(format!("user {nickname}")))
    }
}

#[async_trait]
impl ForumRegistry for PgStore {
    async fn create_forum(&self, forum: NewForum) -> DomainResult<ForumRef> {
        let row: ForumRow = sqlx::query_as(&format!(
            "INSERT INTO forum (slug, title, author) VALUES ($1, $2, $3) RETURNING {FORUM_COLUMNS}"
        ))
        .bind(&forum.slug)
        .bind(&forum.title)
        .bind(&forum.author)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        info!(slug = %forum.slug, "forum persisted");
        Ok(ForumRef::from(row))
    }

    async fn resolve_by_slug(&self, slug: &str) -> DomainResult<ForumRef> {
        let row: Option<ForumRow> = sqlx::query_as(&format!(
            "SELECT {FORUM_COLUMNS} FROM forum WHERE lower(slug) = lower($1)"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.map(ForumRef::from)
            .ok_or_else(|| DomainError::not_found(format!("forum {slug}")))
    }

    async fn increment_post_count(&self, forum: &str, delta: i64) -> DomainResult<()> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        bump_post_count(&mut conn, forum, delta).await
    }

    async fn increment_thread_count(&self, forum: &str) -> DomainResult<()> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        bump_thread_count(&mut conn, forum).await
    }
}

#[async_trait]
impl StatusReport for PgStore {
    async fn status(&self) -> DomainResult<ServiceStatus> {
        let (users, forums, threads, posts): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT count(*) FROM users), (SELECT count(*) FROM forum), \
                    (SELECT count(*) FROM thread), (SELECT count(*) FROM post)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(ServiceStatus {
            users,
            forums,
            threads,
            posts,
        })
    }
}

#[async_trait]
impl Maintenance for PgStore {
    async fn clear(&self) -> DomainResult<()> {
        sqlx::query("TRUNCATE vote, post, thread, forum, users RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        warn!("all forum data cleared");
        Ok(())
    }
}
