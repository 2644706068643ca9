//! # Vote ledger
//!
//! The thread row is locked first, which serialises concurrent votes on one
//! thread; the tally is then moved by a server-side delta.

use async_trait::async_trait;
use domains::{DomainError, DomainResult, ThreadId, VoteEvent, VoteLedger, VoteValue};
use tracing::debug;

use super::error::db_error;
use super::rows::VoteRow;
use super::PgStore;

#[async_trait]
impl VoteLedger for PgStore {
    async fn cast_vote(&self, thread: ThreadId, nickname: &str, value: VoteValue) -> DomainResult<i32> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM thread WHERE id = $1 FOR UPDATE")
            .bind(thread)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;
        if locked.is_none() {
            return Err(DomainError::not_found(format!("thread {thread}")));
        }

        let previous: Option<(i64, i32)> = sqlx::query_as(
            "SELECT id, value FROM vote WHERE thread_id = $1 AND nickname = $2 ORDER BY id DESC LIMIT 1",
        )
        .bind(thread)
        .bind(nickname)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;
        let (previous_vote_id, previous_value) = match previous {
            Some((id, value)) => (Some(id), value),
            None => (None, 0),
        };

        sqlx::query("INSERT INTO vote (nickname, value, thread_id, previous_vote_id) VALUES ($1, $2, $3, $4)")
            .bind(nickname)
            .bind(value.as_i32())
            .bind(thread)
            .bind(previous_vote_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let votes: i32 = sqlx::query_scalar("UPDATE thread SET votes = votes + $1 WHERE id = $2 RETURNING votes")
            .bind(value.as_i32() - previous_value)
            .bind(thread)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        debug!(thread_id = thread, votes, "vote appended");
        Ok(votes)
    }

    async fn vote_history(&self, thread: ThreadId) -> DomainResult<Vec<VoteEvent>> {
        let rows: Vec<VoteRow> = sqlx::query_as(
            "SELECT id, nickname, value, thread_id, previous_vote_id FROM vote WHERE thread_id = $1 ORDER BY id",
        )
        .bind(thread)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.into_iter().map(VoteEvent::try_from).collect()
    }
}
