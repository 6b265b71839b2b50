#![forbid(unsafe_code)]

pub mod app_services;
pub mod backend;
pub mod error;
pub mod practice;

pub use practice_core::Clock;

pub use app_services::{AppServices, BackendChoice};
pub use backend::{HttpBackend, HttpBackendConfig, LocalBackend, ProgressSink, ScriptCatalog};
pub use error::{AppServicesError, BackendError, PracticeError};
pub use practice::{CatalogSummary, PracticeLoopService, PracticeRun, ReportOutcome};
