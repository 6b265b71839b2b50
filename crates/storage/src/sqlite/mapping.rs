use practice_core::model::{DialogueScript, RunRecord, ScriptId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn script_id_to_i64(id: ScriptId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("script_id overflow".into()))
}

pub(crate) fn script_id_from_i64(v: i64) -> Result<ScriptId, StorageError> {
    u64::try_from(v)
        .map(ScriptId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid script_id: {v}")))
}

pub(crate) fn step_to_i64(step: usize) -> Result<i64, StorageError> {
    i64::try_from(step).map_err(|_| StorageError::Serialization("current_step overflow".into()))
}

fn step_from_i64(v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid current_step: {v}")))
}

fn score_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_script_row(row: &sqlx::sqlite::SqliteRow) -> Result<DialogueScript, StorageError> {
    let body: String = row.try_get("body").map_err(ser)?;
    let script: DialogueScript = serde_json::from_str(&body).map_err(ser)?;
    let id = script_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    if script.id() != id {
        return Err(StorageError::Serialization(format!(
            "script body id {} does not match row id {id}",
            script.id()
        )));
    }
    Ok(script)
}

pub(crate) fn map_run_row(row: &sqlx::sqlite::SqliteRow) -> Result<RunRecord, StorageError> {
    Ok(RunRecord {
        script_id: script_id_from_i64(row.try_get::<i64, _>("script_id").map_err(ser)?)?,
        current_step: step_from_i64(row.try_get::<i64, _>("current_step").map_err(ser)?)?,
        score: score_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        completed: row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        updated_at: row.try_get("reported_at").map_err(ser)?,
    })
}
