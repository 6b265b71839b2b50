use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{OptionId, ScriptId};
use crate::model::script::DialogueScript;

/// Points awarded for a correct first choice on a step.
pub const SCORE_PER_CORRECT: u32 = 10;

/// Snapshot of one learner's run through one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub script_id: ScriptId,
    pub current_step_index: usize,
    pub cumulative_score: u32,
    pub completed: bool,
    pub selected_option: Option<OptionId>,
}

impl RunState {
    #[must_use]
    pub fn initial(script_id: ScriptId) -> Self {
        Self {
            script_id,
            current_step_index: 0,
            cumulative_score: 0,
            completed: false,
            selected_option: None,
        }
    }
}

/// Payload of a best-effort progress report, issued once per advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub script_id: ScriptId,
    pub current_step: usize,
    pub score_delta: u32,
    pub score: u32,
    pub completed: bool,
    pub reported_at: DateTime<Utc>,
}

/// Latest known progress for a script, as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub script_id: ScriptId,
    pub current_step: usize,
    pub score: u32,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl RunRecord {
    #[must_use]
    pub fn from_update(update: &ProgressUpdate) -> Self {
        Self {
            script_id: update.script_id,
            current_step: update.current_step,
            score: update.score,
            completed: update.completed,
            updated_at: update.reported_at,
        }
    }
}

/// A script offered to the learner together with any earlier run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub script: DialogueScript,
    pub last_run: Option<RunRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn record_mirrors_update() {
        let update = ProgressUpdate {
            script_id: ScriptId::new(2),
            current_step: 3,
            score_delta: 10,
            score: 20,
            completed: false,
            reported_at: fixed_now(),
        };
        let record = RunRecord::from_update(&update);
        assert_eq!(record.current_step, 3);
        assert_eq!(record.score, 20);
        assert_eq!(record.updated_at, fixed_now());
    }

    #[test]
    fn initial_run_state_is_fresh() {
        let state = RunState::initial(ScriptId::new(9));
        assert_eq!(state.current_step_index, 0);
        assert_eq!(state.cumulative_score, 0);
        assert!(!state.completed);
        assert!(state.selected_option.is_none());
    }
}
