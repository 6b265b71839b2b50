use std::sync::Arc;

use practice_core::model::{CatalogEntry, DialogueScript, ProgressUpdate, ScriptId};
use practice_core::runner::{DialogueRunner, Effect};
use tokio::task::JoinHandle;

use super::run::PracticeRun;
use crate::Clock;
use crate::backend::{ProgressSink, ScriptCatalog};
use crate::error::PracticeError;

/// What happened to a progress report. Never surfaced to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Delivered,
    Dropped,
}

/// Loads scripts, starts runs, and carries out the effects runs emit.
#[derive(Clone)]
pub struct PracticeLoopService {
    clock: Clock,
    catalog: Arc<dyn ScriptCatalog>,
    sink: Arc<dyn ProgressSink>,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<dyn ScriptCatalog>, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            clock,
            catalog,
            sink,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch the catalog with each script's last known run.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Backend` if the catalog cannot be fetched.
    pub async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, PracticeError> {
        let entries = self.catalog.fetch_catalog().await?;
        log::debug!("loaded catalog with {} scripts", entries.len());
        Ok(entries)
    }

    /// Start a fresh run of a catalog script.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::UnknownScript` if the script is not in the catalog,
    /// `PracticeError::Runner` if it has no steps, or backend errors.
    pub async fn start_run(&self, script_id: ScriptId) -> Result<PracticeRun, PracticeError> {
        let entry = self
            .load_catalog()
            .await?
            .into_iter()
            .find(|entry| entry.script.id() == script_id)
            .ok_or(PracticeError::UnknownScript(script_id))?;
        let runner = DialogueRunner::start(entry.script)?;
        Ok(PracticeRun::new(runner, self.clock, entry.last_run))
    }

    /// Start a fresh run of a script the caller already holds.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Runner` if the script has no steps.
    pub fn start_run_with(&self, script: DialogueScript) -> Result<PracticeRun, PracticeError> {
        let runner = DialogueRunner::start(script)?;
        Ok(PracticeRun::new(runner, self.clock, None))
    }

    /// Send one progress report. Failures are logged and dropped, never retried.
    pub async fn report_progress(&self, update: ProgressUpdate) -> ReportOutcome {
        report(self.sink.as_ref(), &update).await
    }

    /// Carry out an effect without waiting for it.
    ///
    /// Returns the spawned task, or `None` when no tokio runtime is running, in
    /// which case the report is dropped.
    pub fn dispatch(&self, effect: Effect) -> Option<JoinHandle<ReportOutcome>> {
        let Effect::PersistProgress(update) = effect;
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!(
                "no async runtime; dropping progress for script {} step {}",
                update.script_id,
                update.current_step
            );
            return None;
        };
        let sink = Arc::clone(&self.sink);
        Some(handle.spawn(async move { report(sink.as_ref(), &update).await }))
    }
}

async fn report(sink: &dyn ProgressSink, update: &ProgressUpdate) -> ReportOutcome {
    match sink.persist_progress(update).await {
        Ok(()) => ReportOutcome::Delivered,
        Err(err) => {
            log::warn!(
                "progress for script {} step {} not saved: {err}",
                update.script_id,
                update.current_step
            );
            ReportOutcome::Dropped
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
