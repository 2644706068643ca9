//! User accounts over the `users` table.

use async_trait::async_trait;
use domains::{DomainResult, UserAccounts, UserListQuery, UserPatch, UserProfile};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use super::error::db_error;
use super::rows::{UserRow, USER_COLUMNS};
use super::PgStore;

#[async_trait]
impl UserAccounts for PgStore {
    async fn create_user(&self, profile: UserProfile) -> DomainResult<UserProfile> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&profile.nickname)
        .bind(&profile.fullname)
        .bind(&profile.about)
        .bind(&profile.email)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        info!(nickname = %profile.nickname, "user persisted");
        Ok(UserProfile::from(row))
    }

    async fn find_user(&self, nickname: &str) -> DomainResult<Option<UserProfile>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(nickname) = lower($1)"
        ))
        .bind(nickname)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(UserProfile::from))
    }

    async fn update_user(&self, nickname: &str, patch: UserPatch) -> DomainResult<Option<UserProfile>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET \
                 fullname = COALESCE(NULLIF($2, ''), fullname), \
                 about = COALESCE(NULLIF($3, ''), about), \
                 email = COALESCE(NULLIF($4, ''), email) \
             WHERE lower(nickname) = lower($1) RETURNING {USER_COLUMNS}"
        ))
        .bind(nickname)
        .bind(patch.fullname)
        .bind(patch.about)
        .bind(patch.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(UserProfile::from))
    }

    async fn forum_users(&self, forum: &str, query: UserListQuery) -> DomainResult<Vec<UserProfile>> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE nickname IN \
             (SELECT author FROM thread WHERE forum = "
        ));
        qb.push_bind(forum);
        qb.push(" UNION SELECT author FROM post WHERE forum = ");
        qb.push_bind(forum);
        qb.push(")");
        if let Some(since) = &query.since {
            let op = if query.desc { "<" } else { ">" };
            qb.push(format!(" AND lower(nickname) COLLATE \"C\" {op} lower("));
            qb.push_bind(since.as_str());
            qb.push(") COLLATE \"C\"");
        }
        let direction = if query.desc { "DESC" } else { "ASC" };
        qb.push(format!(" ORDER BY lower(nickname) COLLATE \"C\" {direction}"));
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        let rows: Vec<UserRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}
