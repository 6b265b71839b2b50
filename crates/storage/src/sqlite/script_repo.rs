use chrono::{DateTime, Utc};
use practice_core::model::{DialogueScript, ScriptId};

use super::SqliteRepository;
use super::mapping::{conn, map_script_row, script_id_to_i64, ser};
use crate::repository::{ScriptRepository, StorageError};

#[async_trait::async_trait]
impl ScriptRepository for SqliteRepository {
    async fn upsert_script(
        &self,
        script: &DialogueScript,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if script.is_empty() {
            return Err(StorageError::Serialization(format!(
                "script {} has no steps",
                script.id()
            )));
        }
        let body = serde_json::to_string(script).map_err(ser)?;
        let step_count = i64::try_from(script.len())
            .map_err(|_| StorageError::Serialization("step_count overflow".into()))?;

        sqlx::query(
            r"
                INSERT INTO scripts (id, title, step_count, body, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    step_count = excluded.step_count,
                    body = excluded.body,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(script_id_to_i64(script.id())?)
        .bind(script.title().primary())
        .bind(step_count)
        .bind(body)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_script(&self, id: ScriptId) -> Result<DialogueScript, StorageError> {
        let row = sqlx::query("SELECT id, body FROM scripts WHERE id = ?1")
            .bind(script_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_script_row(&row)
    }

    async fn list_scripts(&self, limit: u32) -> Result<Vec<DialogueScript>, StorageError> {
        let rows = sqlx::query("SELECT id, body FROM scripts ORDER BY id ASC LIMIT ?1")
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_script_row).collect()
    }
}
