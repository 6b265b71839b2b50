mod ids;
mod run;
mod script;
mod text;

pub use ids::{OptionId, ParseIdError, ScriptId};
pub use run::{CatalogEntry, ProgressUpdate, RunRecord, RunState, SCORE_PER_CORRECT};
pub use script::{
    ContentIssue, DialogueOption, DialogueScript, DialogueStep, NonEmptyOptions, OptionDraft,
    OptionsError, ScriptDraft, ScriptError, Speaker, StepDraft,
};
pub use text::{BilingualText, TextError};
