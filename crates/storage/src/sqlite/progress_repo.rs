use practice_core::model::{ProgressUpdate, RunRecord, ScriptId};
use sqlx::Row;
use std::collections::HashSet;

use super::SqliteRepository;
use super::mapping::{conn, map_run_row, script_id_from_i64, script_id_to_i64, ser, step_to_i64};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn append_progress(&self, update: &ProgressUpdate) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO progress_log (
                    script_id, current_step, score_delta, score, completed, reported_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(script_id_to_i64(update.script_id)?)
        .bind(step_to_i64(update.current_step)?)
        .bind(i64::from(update.score_delta))
        .bind(i64::from(update.score))
        .bind(i64::from(update.completed))
        .bind(update.reported_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn latest_run(&self, script_id: ScriptId) -> Result<Option<RunRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT script_id, current_step, score, completed, reported_at
                FROM progress_log
                WHERE script_id = ?1
                ORDER BY reported_at DESC, current_step DESC, id DESC
                LIMIT 1
            ",
        )
        .bind(script_id_to_i64(script_id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_run_row).transpose()
    }

    async fn latest_runs(&self, script_ids: &[ScriptId]) -> Result<Vec<RunRecord>, StorageError> {
        if script_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
                SELECT script_id, current_step, score, completed, reported_at
                FROM progress_log
                WHERE script_id IN (
            ",
        );
        for i in 0..script_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push_str(")\n ORDER BY script_id ASC, reported_at DESC, current_step DESC, id DESC");

        let mut query = sqlx::query(&sql);
        for id in script_ids {
            query = query.bind(script_id_to_i64(*id)?);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in rows {
            let script_id = script_id_from_i64(row.try_get::<i64, _>("script_id").map_err(ser)?)?;
            if !seen.insert(script_id) {
                continue;
            }
            out.push(map_run_row(&row)?);
        }

        Ok(out)
    }
}
