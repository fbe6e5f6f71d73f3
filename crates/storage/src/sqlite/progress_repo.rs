use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{LocalProgressStore, StorageError};
use tracker_core::model::ProblemId;

use super::{LOCAL_PROGRESS_KEY, SqliteRepository};

#[async_trait]
impl LocalProgressStore for SqliteRepository {
    async fn load(&self) -> Result<Option<Vec<ProblemId>>, StorageError> {
        let row = sqlx::query("SELECT value FROM local_progress WHERE key = ?1")
            .bind(LOCAL_PROGRESS_KEY)
            .fetch_optional(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        // No schema versioning on the stored value; anything that fails to
        // deserialize reads as absent rather than an error.
        Ok(serde_json::from_str::<Vec<ProblemId>>(&value).ok())
    }

    async fn save(&self, ids: &[ProblemId]) -> Result<(), StorageError> {
        let value = serde_json::to_string(ids)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO local_progress (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(LOCAL_PROGRESS_KEY)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
