use async_trait::async_trait;
use domains::{
    DomainResult, NewThread, Thread, ThreadId, ThreadListQuery, ThreadPatch, ThreadRef,
    ThreadRepository,
};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use super::directory::bump_thread_count;
use super::error::db_error;
use super::rows::{ThreadRow, THREAD_COLUMNS};
use super::PgStore;

#[async_trait]
impl ThreadRepository for PgStore {
    async fn create_thread(&self, new: NewThread) -> DomainResult<Thread> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row: ThreadRow = sqlx::query_as(&format!(
            "INSERT INTO thread (slug, title, author, forum, message, created) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, now())) RETURNING {THREAD_COLUMNS}"
        ))
        .bind(new.slug.as_deref())
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.forum)
        .bind(&new.message)
        .bind(new.created)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        bump_thread_count(&mut tx, &new.forum).await?;
        tx.commit().await.map_err(db_error)?;

        let thread = Thread::from(row);
        info!(thread_id = thread.id, "thread persisted");
        Ok(thread)
    }

    async fn find_thread(&self, thread: &ThreadRef) -> DomainResult<Option<Thread>> {
        let query = match thread {
            ThreadRef::Id(id) => sqlx::query_as::<_, ThreadRow>(&format!(
                "SELECT {THREAD_COLUMNS} FROM thread WHERE id = $1"
            ))
            .bind(*id)
            .fetch_optional(&self.pool)
            .await,
            ThreadRef::Slug(slug) => sqlx::query_as::<_, ThreadRow>(&format!(
                "SELECT {THREAD_COLUMNS} FROM thread WHERE lower(slug) = lower($1)"
            ))
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await,
        };
        Ok(query.map_err(db_error)?.map(Thread::from))
    }

    async fn update_thread(&self, id: ThreadId, patch: ThreadPatch) -> DomainResult<Option<Thread>> {
        let row: Option<ThreadRow> = sqlx::query_as(&format!(
            "UPDATE thread SET \
                 title = COALESCE(NULLIF($2, ''), title), \
                 message = COALESCE(NULLIF($3, ''), message) \
             WHERE id = $1 RETURNING {THREAD_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.message)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(Thread::from))
    }

    async fn list_forum_threads(&self, forum: &str, query: ThreadListQuery) -> DomainResult<Vec<Thread>> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {THREAD_COLUMNS} FROM thread WHERE forum = "));
        qb.push_bind(forum);
        if let Some(since) = query.since {
            qb.push(if query.desc { " AND created <= " } else { " AND created >= " });
            qb.push_bind(since);
        }
        qb.push(if query.desc {
            " ORDER BY created DESC, id DESC"
        } else {
            " ORDER BY created, id"
        });
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        let rows: Vec<ThreadRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Thread::from).collect())
    }
}
