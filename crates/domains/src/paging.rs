//! # Traversal parameters
//!
//! Sort modes and cursor pagination for post, thread and user listings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::errors::{DomainError, DomainResult};
use crate::models::PostId;

/// The three mutually exclusive post orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PostSort {
    /// By `(created, id)`.
    #[default]
    Flat,
    /// By materialized path.
    Tree,
    /// Pages of top-level posts, each expanded to its full reply subtree.
    ParentTree,
}

impl PostSort {
    pub fn as_str(self) -> &'static str {
        match self {
            PostSort::Flat => "flat",
            PostSort::Tree => "tree",
            PostSort::ParentTree => "parent_tree",
        }
    }
}

impl FromStr for PostSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "flat" => Ok(PostSort::Flat),
            "tree" => Ok(PostSort::Tree),
            "parent_tree" => Ok(PostSort::ParentTree),
            other => Err(DomainError::validation(format!("unknown sort mode: {other}"))),
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cursor pagination. `limit: None` means no cap; `since` is an exclusive
/// boundary expressed as a post id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub since: Option<PostId>,
    pub desc: bool,
}

impl PageQuery {
    pub fn ascending() -> Self {
        Self::default()
    }

    pub fn descending() -> Self {
        Self {
            desc: true,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_since(mut self, since: PostId) -> Self {
        self.since = Some(since);
        self
    }

    /// Builds a page from raw query-string values. Absent or blank values
    /// fall back to the defaults.
    pub fn parse(limit: Option<&str>, since: Option<&str>, desc: Option<&str>) -> DomainResult<Self> {
        let since = match non_blank(since) {
            None => None,
            Some(raw) => Some(raw.parse::<PostId>().map_err(|_| {
                DomainError::validation(format!("since must be a post id, got {raw}"))
            })?),
        };
        Ok(Self {
            limit: parse_limit(limit)?,
            since,
            desc: parse_desc(desc)?,
        })
    }
}

/// Listing of a forum's threads by creation time. `since` is inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadListQuery {
    pub limit: Option<u32>,
    pub since: Option<DateTime<Utc>>,
    pub desc: bool,
}

impl ThreadListQuery {
    pub fn parse(limit: Option<&str>, since: Option<&str>, desc: Option<&str>) -> DomainResult<Self> {
        let since = match non_blank(since) {
            None => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| {
                        DomainError::validation(format!("since must be an RFC 3339 timestamp, got {raw}"))
                    })?
                    .with_timezone(&Utc),
            ),
        };
        Ok(Self {
            limit: parse_limit(limit)?,
            since,
            desc: parse_desc(desc)?,
        })
    }
}

/// Listing of a forum's participants ordered by nickname, case-insensitively.
/// `since` is an exclusive nickname bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    pub limit: Option<u32>,
    pub since: Option<String>,
    pub desc: bool,
}

impl UserListQuery {
    pub fn parse(limit: Option<&str>, since: Option<&str>, desc: Option<&str>) -> DomainResult<Self> {
        Ok(Self {
            limit: parse_limit(limit)?,
            since: non_blank(since).map(str::to_string),
            desc: parse_desc(desc)?,
        })
    }
}

fn parse_limit(raw: Option<&str>) -> DomainResult<Option<u32>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(0) | Err(_) => Err(DomainError::validation(format!(
                "limit must be a positive integer, got {raw}"
            ))),
            Ok(n) => Ok(Some(n)),
        },
    }
}

fn parse_desc(raw: Option<&str>) -> DomainResult<bool> {
    match non_blank(raw) {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(raw) => Err(DomainError::validation(format!(
            "desc must be true or false, got {raw}"
        ))),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
