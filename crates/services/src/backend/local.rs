use std::sync::Arc;

use async_trait::async_trait;
use practice_core::model::{CatalogEntry, ProgressUpdate, ScriptId};
use storage::repository::{ProgressRepository, ScriptRepository, Storage};

use super::{ProgressSink, ScriptCatalog};
use crate::error::BackendError;

const CATALOG_LIMIT: u32 = 256;

/// Serves the catalog and records progress on this device.
#[derive(Clone)]
pub struct LocalBackend {
    scripts: Arc<dyn ScriptRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl LocalBackend {
    #[must_use]
    pub fn new(scripts: Arc<dyn ScriptRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { scripts, progress }
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self::new(Arc::clone(&storage.scripts), Arc::clone(&storage.progress))
    }
}

#[async_trait]
impl ScriptCatalog for LocalBackend {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, BackendError> {
        let scripts = self.scripts.list_scripts(CATALOG_LIMIT).await?;
        if scripts.len() >= CATALOG_LIMIT as usize {
            log::warn!("catalog truncated to the first {CATALOG_LIMIT} scripts");
        }
        let ids: Vec<ScriptId> = scripts.iter().map(|s| s.id()).collect();
        let mut runs = self.progress.latest_runs(&ids).await?;

        Ok(scripts
            .into_iter()
            .map(|script| {
                let last_run = runs
                    .iter()
                    .position(|run| run.script_id == script.id())
                    .map(|pos| runs.swap_remove(pos));
                CatalogEntry { script, last_run }
            })
            .collect())
    }
}

#[async_trait]
impl ProgressSink for LocalBackend {
    async fn persist_progress(&self, update: &ProgressUpdate) -> Result<(), BackendError> {
        self.progress.append_progress(update).await?;
        Ok(())
    }
}
