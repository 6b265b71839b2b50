mod run;
mod summary;
mod workflow;

// Public API of the practice subsystem.
pub use crate::error::PracticeError;
pub use run::PracticeRun;
pub use summary::CatalogSummary;
pub use workflow::{PracticeLoopService, ReportOutcome};
