use domains::DomainError;
use tracing::error;

/// Maps a sqlx failure onto the domain taxonomy.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::RowNotFound => DomainError::not_found("row"),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            DomainError::not_found(db.message().to_string())
        }
        _ => {
            error!(error = %err, "database failure");
            DomainError::internal(err.to_string())
        }
    }
}
