//! # VoteService
//!
//! Front door of the vote ledger: resolves the voter and the thread, then
//! hands the read-append-increment sequence to the ledger as one unit.

use std::sync::Arc;

use domains::{
    DomainError, DomainResult, Thread, ThreadRef, ThreadRepository, UserDirectory, VoteLedger,
    VoteValue,
};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct VoteService {
    ledger: Arc<dyn VoteLedger>,
    threads: Arc<dyn ThreadRepository>,
    users: Arc<dyn UserDirectory>,
}

impl VoteService {
    pub fn new(
        ledger: Arc<dyn VoteLedger>,
        threads: Arc<dyn ThreadRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            ledger,
            threads,
            users,
        }
    }

    /// Records `nickname`'s current stance on `thread` and returns the
    /// thread carrying its updated tally.
    #[instrument(skip(self), fields(thread = %thread))]
    pub async fn vote(&self, thread: &ThreadRef, nickname: &str, value: VoteValue) -> DomainResult<Thread> {
        let voter = self.users.resolve(nickname).await?;
        let mut thread = self
            .threads
            .find_thread(thread)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("thread {thread}")))?;

        thread.votes = self
            .ledger
            .cast_vote(thread.id, &voter.nickname, value)
            .await?;
        info!(thread_id = thread.id, votes = thread.votes, "vote recorded");
        Ok(thread)
    }
}
