//! # Path Indexer
//!
//! Materialized paths for the reply tree. A post's path is its parent's
//! path followed by its own id, so comparing two paths lexicographically
//! yields ancestor-before-descendant order with siblings ordered by id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::models::PostId;

/// Ancestor ids followed by the post's own id. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterializedPath(Vec<PostId>);

impl MaterializedPath {
    /// Path of a top-level post: just its own id.
    pub fn top_level(id: PostId) -> Self {
        Self(vec![id])
    }

    /// Path of a reply to the post owning `self`.
    pub fn child(&self, id: PostId) -> Self {
        let mut ids = Vec::with_capacity(self.0.len() + 1);
        ids.extend_from_slice(&self.0);
        ids.push(id);
        Self(ids)
    }

    /// Rebuilds a path read back from storage. Empty input is rejected.
    pub fn from_ids(ids: Vec<PostId>) -> DomainResult<Self> {
        if ids.is_empty() {
            return Err(DomainError::internal("post has an empty materialized path"));
        }
        Ok(Self(ids))
    }

    pub fn root(&self) -> PostId {
        self.0[0]
    }

    /// Id of the post owning this path.
    pub fn leaf(&self) -> PostId {
        self.0[self.0.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[PostId] {
        &self.0
    }

    pub fn into_ids(self) -> Vec<PostId> {
        self.0
    }

    /// True when `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &MaterializedPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

/// Computes paths for freshly id'd posts in batch order.
///
/// Seed it with the paths of the already persisted parents the batch refers
/// to; every indexed post becomes available as a parent for later entries
/// of the same batch.
#[derive(Debug, Default)]
pub struct PathIndexer {
    known: HashMap<PostId, MaterializedPath>,
}

impl PathIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parents<I>(parents: I) -> Self
    where
        I: IntoIterator<Item = MaterializedPath>,
    {
        let known = parents.into_iter().map(|path| (path.leaf(), path)).collect();
        Self { known }
    }

    /// Assigns the path of post `id`. Fails with `Conflict` when the parent
    /// has not been seen, which aborts the whole batch.
    pub fn index(&mut self, id: PostId, parent: Option<PostId>) -> DomainResult<MaterializedPath> {
        let path = match parent {
            None => MaterializedPath::top_level(id),
            Some(parent_id) => self
                .known
                .get(&parent_id)
                .map(|parent_path| parent_path.child(id))
                .ok_or_else(|| {
                    DomainError::conflict(format!("parent post {parent_id} is not in this thread"))
                })?,
        };
        self.known.insert(id, path.clone());
        Ok(path)
    }
}
