use async_trait::async_trait;
use chrono::{DateTime, Utc};
use practice_core::model::{DialogueScript, ProgressUpdate, RunRecord, ScriptId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Catalog of authored scripts kept on this device.
#[async_trait]
pub trait ScriptRepository: Send + Sync {
    /// Insert or replace a script.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the script cannot be stored.
    async fn upsert_script(
        &self,
        script: &DialogueScript,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Fetch a script by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_script(&self, id: ScriptId) -> Result<DialogueScript, StorageError>;

    /// List scripts ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read.
    async fn list_scripts(&self, limit: u32) -> Result<Vec<DialogueScript>, StorageError>;
}

/// Append-only journal of progress reports.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append one report and return its journal id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the report cannot be stored.
    async fn append_progress(&self, update: &ProgressUpdate) -> Result<i64, StorageError>;

    /// Latest report for a script, by report time.
    ///
    /// Reports can arrive out of order, so recency is judged by `reported_at`
    /// rather than by arrival.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the journal cannot be read.
    async fn latest_run(&self, script_id: ScriptId) -> Result<Option<RunRecord>, StorageError>;

    /// Latest report for each of the given scripts; scripts without reports are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the journal cannot be read.
    async fn latest_runs(&self, script_ids: &[ScriptId]) -> Result<Vec<RunRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scripts: Arc<Mutex<BTreeMap<ScriptId, DialogueScript>>>,
    progress: Arc<Mutex<Vec<(i64, ProgressUpdate)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_newer(candidate: (i64, &ProgressUpdate), current: (i64, &ProgressUpdate)) -> bool {
    (candidate.1.reported_at, candidate.1.current_step, candidate.0)
        > (current.1.reported_at, current.1.current_step, current.0)
}

#[async_trait]
impl ScriptRepository for InMemoryRepository {
    async fn upsert_script(
        &self,
        script: &DialogueScript,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .scripts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(script.id(), script.clone());
        Ok(())
    }

    async fn get_script(&self, id: ScriptId) -> Result<DialogueScript, StorageError> {
        let guard = self
            .scripts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_scripts(&self, limit: u32) -> Result<Vec<DialogueScript>, StorageError> {
        let guard = self
            .scripts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.values().take(limit).cloned().collect())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn append_progress(&self, update: &ProgressUpdate) -> Result<i64, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("progress id overflow".into()))?
            + 1;
        guard.push((id, update.clone()));
        Ok(id)
    }

    async fn latest_run(&self, script_id: ScriptId) -> Result<Option<RunRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut latest: Option<(i64, &ProgressUpdate)> = None;
        for (id, update) in guard.iter().filter(|(_, u)| u.script_id == script_id) {
            let candidate = (*id, update);
            if latest.is_none_or(|current| is_newer(candidate, current)) {
                latest = Some(candidate);
            }
        }
        Ok(latest.map(|(_, update)| RunRecord::from_update(update)))
    }

    async fn latest_runs(&self, script_ids: &[ScriptId]) -> Result<Vec<RunRecord>, StorageError> {
        let mut out = Vec::with_capacity(script_ids.len());
        for id in script_ids {
            if let Some(record) = self.latest_run(*id).await? {
                out.push(record);
            }
        }
        Ok(out)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scripts: Arc<dyn ScriptRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let scripts: Arc<dyn ScriptRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { scripts, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use practice_core::time::fixed_now;

    use crate::seed::sample_scripts;

    fn update(script: u64, step: usize, score: u32, at: DateTime<Utc>) -> ProgressUpdate {
        ProgressUpdate {
            script_id: ScriptId::new(script),
            current_step: step,
            score_delta: 0,
            score,
            completed: false,
            reported_at: at,
        }
    }

    #[tokio::test]
    async fn scripts_round_trip_in_memory() {
        let repo = InMemoryRepository::new();
        let scripts = sample_scripts().unwrap();
        for script in &scripts {
            repo.upsert_script(script, fixed_now()).await.unwrap();
        }

        let listed = repo.list_scripts(10).await.unwrap();
        assert_eq!(listed.len(), scripts.len());
        let fetched = repo.get_script(scripts[0].id()).await.unwrap();
        assert_eq!(fetched, scripts[0]);
        assert!(matches!(
            repo.get_script(ScriptId::new(999)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn latest_run_uses_report_time_not_arrival() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        repo.append_progress(&update(1, 2, 20, now + Duration::seconds(2)))
            .await
            .unwrap();
        // Earlier report delivered late.
        repo.append_progress(&update(1, 1, 10, now + Duration::seconds(1)))
            .await
            .unwrap();

        let latest = repo.latest_run(ScriptId::new(1)).await.unwrap().unwrap();
        assert_eq!(latest.current_step, 2);
        assert_eq!(latest.score, 20);
    }

    #[tokio::test]
    async fn latest_runs_skips_scripts_without_reports() {
        let repo = InMemoryRepository::new();
        repo.append_progress(&update(2, 1, 10, fixed_now()))
            .await
            .unwrap();

        let runs = repo
            .latest_runs(&[ScriptId::new(1), ScriptId::new(2)])
            .await
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].script_id, ScriptId::new(2));
    }
}
