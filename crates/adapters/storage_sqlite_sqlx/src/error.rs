//! Errors of the minion store.

use minionhub_domain::error::MinionHubError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The database URL is invalid or the database could not be opened.
    #[error("failed to open minion store at {url}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("minion store query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// A minion status could not be encoded for the `status` column.
    #[error("failed to encode minion status: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to migrate minion store: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for MinionHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_into_storage_variant() {
        let err: MinionHubError = StorageError::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, MinionHubError::Storage(_)));
        assert!(err.code().is_none());
    }

    #[test]
    fn should_name_url_when_open_fails() {
        let err = StorageError::Connect {
            url: "sqlite:/nowhere/hub.db".to_string(),
            source: sqlx::Error::PoolClosed,
        };
        assert_eq!(
            err.to_string(),
            "failed to open minion store at sqlite:/nowhere/hub.db"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
