//! Contracts for the external system of record, plus the two adapters.

mod http;
mod local;

use async_trait::async_trait;
use practice_core::model::{CatalogEntry, ProgressUpdate};

use crate::error::BackendError;

pub use http::{HttpBackend, HttpBackendConfig};
pub use local::LocalBackend;

/// Source of the script catalog, including each script's last known run.
#[async_trait]
pub trait ScriptCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns `BackendError` when the catalog cannot be fetched.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, BackendError>;
}

/// Receiver of progress reports. Acknowledgements carry no data.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `BackendError` when the report is not accepted.
    async fn persist_progress(&self, update: &ProgressUpdate) -> Result<(), BackendError>;
}
