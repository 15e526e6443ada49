use crate::application::repos::RepoError;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to statement timeout")
                || db
                    .message()
                    .contains("canceling statement due to user request") =>
        {
            RepoError::Timeout
        }
        sqlx::Error::Database(db) if db.message().contains("invalid input syntax") => {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db) if db.message().contains("violates") => RepoError::Integrity {
            message: db.message().to_string(),
        },
        other => RepoError::from_persistence(other),
    }
}

/// Convert a row count or position into the signed form Postgres expects.
pub fn to_sql_i64(value: u64, what: &str) -> Result<i64, RepoError> {
    i64::try_from(value)
        .map_err(|_| RepoError::invalid_input(format!("{what} {value} exceeds supported range")))
}

pub fn from_sql_count(value: i64) -> Result<u64, RepoError> {
    u64::try_from(value).map_err(|_| RepoError::Integrity {
        message: format!("negative row count {value}"),
    })
}
