//! Bulk post transaction, traversal and edits.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    DomainError, DomainResult, MaterializedPath, PageQuery, PathIndexer, Post, PostDraft, PostId,
    PostRepository, PostSort, Thread, ThreadId,
};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

use super::directory::bump_post_count;
use super::error::db_error;
use super::rows::{into_posts, PostRow, POST_COLUMNS};
use super::traversal::posts_query;
use super::{PgStore, TOP_LEVEL};

/// Rows per multi-row `INSERT`; keeps every statement well below the
/// protocol's bind-parameter ceiling.
const INSERT_CHUNK: usize = 1_000;

#[async_trait]
impl PostRepository for PgStore {
    async fn create_posts(&self, thread: &Thread, drafts: Vec<PostDraft>) -> DomainResult<Vec<Post>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // 1. Reserve ids in input order so paths can be written with the rows.
        let mut ids: Vec<PostId> =
            sqlx::query_scalar("SELECT nextval('post_id_seq') FROM generate_series(1, $1)")
                .bind(drafts.len() as i64)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_error)?;
        ids.sort_unstable();
        let created: DateTime<Utc> = sqlx::query_scalar("SELECT now()")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;

        // 2. Parents outside this batch must already exist in this thread;
        // parents assigned earlier in the batch are left to the indexer.
        let batch_ids: HashSet<PostId> = ids.iter().copied().collect();
        let parent_ids: Vec<PostId> = drafts
            .iter()
            .filter_map(|d| d.parent)
            .filter(|id| !batch_ids.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut parents: HashMap<PostId, (ThreadId, Vec<i64>)> = HashMap::new();
        if !parent_ids.is_empty() {
            let rows: Vec<(i64, i32, Vec<i64>)> =
                sqlx::query_as("SELECT id, thread, path FROM post WHERE id = ANY($1)")
                    .bind(&parent_ids)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(db_error)?;
            parents.extend(rows.into_iter().map(|(id, thread, path)| (id, (thread, path))));
        }
        let mut parent_paths = Vec::with_capacity(parent_ids.len());
        for parent_id in &parent_ids {
            match parents.remove(parent_id) {
                Some((parent_thread, path)) if parent_thread == thread.id => {
                    parent_paths.push(MaterializedPath::from_ids(path)?)
                }
                _ => {
                    return Err(DomainError::conflict(format!(
                        "parent post {parent_id} is not in thread {}",
                        thread.id
                    )))
                }
            }
        }

        // 3. Path Indexer.
        let mut indexer = PathIndexer::with_parents(parent_paths);
        let mut posts = Vec::with_capacity(drafts.len());
        for (draft, id) in drafts.into_iter().zip(ids) {
            let path = indexer.index(id, draft.parent)?;
            posts.push(Post {
                id,
                parent: draft.parent,
                author: draft.author,
                message: draft.message,
                forum: thread.forum.clone(),
                thread: thread.id,
                created,
                is_edited: false,
                path,
            });
        }

        // 4. Chunked multi-row insert.
        for chunk in posts.chunks(INSERT_CHUNK) {
            let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO post (id, parent, author, message, forum, thread, created, is_edited, path, root) ",
            );
            qb.push_values(chunk, |mut row, post| {
                row.push_bind(post.id)
                    .push_bind(post.parent.unwrap_or(TOP_LEVEL))
                    .push_bind(post.author.as_str())
                    .push_bind(post.message.as_str())
                    .push_bind(post.forum.as_str())
                    .push_bind(post.thread)
                    .push_bind(post.created)
                    .push_bind(post.is_edited)
                    .push_bind(post.path.as_slice())
                    .push_bind(post.root());
            });
            qb.build().execute(&mut *tx).await.map_err(db_error)?;
        }

        // 5. Forum counter, same transaction.
        bump_post_count(&mut tx, &thread.forum, posts.len() as i64).await?;

        tx.commit().await.map_err(db_error)?;
        info!(thread_id = thread.id, count = posts.len(), "post batch persisted");
        Ok(posts)
    }

    async fn find_post(&self, id: PostId) -> DomainResult<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM post WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Post::try_from).transpose()
    }

    async fn list_posts(&self, thread: ThreadId, sort: PostSort, page: PageQuery) -> DomainResult<Vec<Post>> {
        let mut qb = posts_query(thread, sort, page);
        let rows: Vec<PostRow> = qb
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        debug!(thread_id = thread, %sort, rows = rows.len(), "posts fetched");
        into_posts(rows)
    }

    async fn edit_message(&self, id: PostId, candidate: &str) -> DomainResult<Option<Post>> {
        // Right-hand sides see the pre-update row, so both columns are
        // decided against the stored message in a single statement.
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "UPDATE post SET \
                 message = COALESCE(NULLIF($2, ''), message), \
                 is_edited = (NULLIF($2, '') IS NOT NULL AND $2 <> message) \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(candidate)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.map(Post::try_from).transpose()
    }
}
