//! Bundled sample catalog used by the `seed` commands and tests.

use practice_core::model::DialogueScript;

const SAMPLE_CATALOG: &str = include_str!("../seed/catalog.json");

/// Parse the bundled sample scripts.
///
/// # Errors
///
/// Returns the `serde_json` error if the bundled catalog fails validation.
pub fn sample_scripts() -> Result<Vec<DialogueScript>, serde_json::Error> {
    serde_json::from_str(SAMPLE_CATALOG)
}
