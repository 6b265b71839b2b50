//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::ScriptId;
use practice_core::runner::RunnerError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by catalog and progress backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the practice loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error("script {0} is not in the catalog")]
    UnknownScript(ScriptId),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(String),
}
