//! # Traversal query builder
//!
//! One `SELECT` per (sort mode, cursor given, direction). The cursor is
//! resolved inside the statement against the same thread, so a cursor from
//! another thread yields an empty page. `LIMIT` is only emitted when a
//! limit was requested.

use domains::{PageQuery, PostSort, ThreadId};
use sqlx::{Postgres, QueryBuilder};

use super::rows::POST_COLUMNS;

pub(crate) fn posts_query(thread: ThreadId, sort: PostSort, page: PageQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM post WHERE thread = "));
    qb.push_bind(thread);

    match sort {
        PostSort::Flat => {
            if let Some(since) = page.since {
                qb.push(if page.desc {
                    " AND (created, id) < (SELECT created, id FROM post WHERE id = "
                } else {
                    " AND (created, id) > (SELECT created, id FROM post WHERE id = "
                });
                push_cursor_scope(&mut qb, since, thread);
            }
            qb.push(if page.desc {
                " ORDER BY created DESC, id DESC"
            } else {
                " ORDER BY created, id"
            });
            push_limit(&mut qb, page.limit);
        }
        PostSort::Tree => {
            if let Some(since) = page.since {
                qb.push(if page.desc {
                    " AND path < (SELECT path FROM post WHERE id = "
                } else {
                    " AND path > (SELECT path FROM post WHERE id = "
                });
                push_cursor_scope(&mut qb, since, thread);
            }
            qb.push(if page.desc {
                " ORDER BY path DESC"
            } else {
                " ORDER BY path"
            });
            push_limit(&mut qb, page.limit);
        }
        PostSort::ParentTree => {
            qb.push(" AND root IN (SELECT id FROM post WHERE thread = ");
            qb.push_bind(thread);
            qb.push(" AND parent = 0");
            if let Some(since) = page.since {
                qb.push(if page.desc {
                    " AND id < (SELECT root FROM post WHERE id = "
                } else {
                    " AND id > (SELECT root FROM post WHERE id = "
                });
                push_cursor_scope(&mut qb, since, thread);
            }
            qb.push(if page.desc {
                " ORDER BY id DESC"
            } else {
                " ORDER BY id"
            });
            push_limit(&mut qb, page.limit);
            qb.push(if page.desc {
                ") ORDER BY root DESC, path"
            } else {
                ") ORDER BY root, path"
            });
        }
    }
    qb
}

fn push_cursor_scope(qb: &mut QueryBuilder<'static, Postgres>, since: i64, thread: ThreadId) {
    qb.push_bind(since);
    qb.push(" AND thread = ");
    qb.push_bind(thread);
    qb.push(")");
}

fn push_limit(qb: &mut QueryBuilder<'static, Postgres>, limit: Option<u32>) {
    if let Some(limit) = limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(limit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(sort: PostSort, page: PageQuery) -> String {
        posts_query(1, sort, page).sql().to_string()
    }

    #[test]
    fn flat_unbounded_has_no_limit() {
        let sql = sql(PostSort::Flat, PageQuery::ascending());
        assert!(sql.ends_with("WHERE thread = $1 ORDER BY created, id"), "{sql}");
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn flat_since_descending() {
        let sql = sql(PostSort::Flat, PageQuery::descending().with_since(5).with_limit(10));
        assert!(sql.contains("(created, id) < (SELECT created, id FROM post WHERE id = $2 AND thread = $3)"));
        assert!(sql.ends_with("ORDER BY created DESC, id DESC LIMIT $4"), "{sql}");
    }

    #[test]
    fn tree_since_ascending_compares_paths() {
        let sql = sql(PostSort::Tree, PageQuery::ascending().with_since(5));
        assert!(sql.contains("path > (SELECT path FROM post WHERE id = $2"));
        assert!(sql.ends_with("ORDER BY path"), "{sql}");
    }

    #[test]
    fn tree_descending_reverses_path_order() {
        let sql = sql(PostSort::Tree, PageQuery::descending().with_limit(3));
        assert!(sql.ends_with("ORDER BY path DESC LIMIT $2"), "{sql}");
    }

    #[test]
    fn parent_tree_limits_roots_not_rows() {
        let sql = sql(PostSort::ParentTree, PageQuery::ascending().with_limit(2));
        assert!(sql.contains("root IN (SELECT id FROM post WHERE thread = $2 AND parent = 0 ORDER BY id LIMIT $3)"), "{sql}");
        assert!(sql.ends_with(") ORDER BY root, path"), "{sql}");
    }

    #[test]
    fn parent_tree_descending_since_uses_cursor_root() {
        let sql = sql(PostSort::ParentTree, PageQuery::descending().with_since(9));
        assert!(sql.contains("AND id < (SELECT root FROM post WHERE id = $3 AND thread = $4)"), "{sql}");
        assert!(sql.ends_with("ORDER BY id DESC) ORDER BY root DESC, path"), "{sql}");
    }
}
