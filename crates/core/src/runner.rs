//! Step-by-step runner for authored dialogue scripts.
//!
//! The runner is a plain state machine. Every transition updates local state
//! synchronously and hands back at most one [`Effect`] for the caller to carry
//! out; nothing here waits on the network.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::Clock;
use crate::model::{
    BilingualText, DialogueOption, DialogueScript, DialogueStep, OptionId, ProgressUpdate,
    RunState, SCORE_PER_CORRECT,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RunnerError {
    #[error("cannot start a script without steps")]
    EmptyScript,
}

/// Where the learner is in the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Showing a step that has no options; `advance` moves on.
    Presenting { step: usize },
    AwaitingSelection { step: usize },
    ShowingFeedback { step: usize, selected: OptionId },
    Completed { score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEvent {
    Select(OptionId),
    /// `at` becomes the `reported_at` of the progress report.
    Advance { at: DateTime<Utc> },
    Reset,
}

/// Work the caller should perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PersistProgress(ProgressUpdate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// The event is not valid in the current state and changed nothing.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Transition {
    pub outcome: TransitionOutcome,
    pub effect: Option<Effect>,
}

impl Transition {
    fn applied(effect: Option<Effect>) -> Self {
        Self {
            outcome: TransitionOutcome::Applied,
            effect,
        }
    }

    fn ignored() -> Self {
        Self {
            outcome: TransitionOutcome::Ignored,
            effect: None,
        }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.outcome == TransitionOutcome::Applied
    }

    /// The progress report carried by this transition, if any.
    #[must_use]
    pub fn progress_update(&self) -> Option<&ProgressUpdate> {
        match &self.effect {
            Some(Effect::PersistProgress(update)) => Some(update),
            None => None,
        }
    }
}

/// Mutable part of a run, kept `Copy` so transitions stay pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Machine {
    pub state: RunnerState,
    pub score: u32,
    /// Points earned on the step currently shown.
    pub step_gain: u32,
    pub correct_answers: usize,
}

impl Machine {
    /// Fresh run state: first step, zero score.
    #[must_use]
    pub fn initial(script: &DialogueScript) -> Self {
        Self {
            state: settle(script, 0),
            score: 0,
            step_gain: 0,
            correct_answers: 0,
        }
    }
}

/// Aggregated view of run progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    pub total: usize,
    pub current: usize,
    pub correct_answers: usize,
    pub score: u32,
    pub max_score: u32,
    pub is_complete: bool,
}

/// `Presenting(i)` becomes `AwaitingSelection(i)` straight away when step `i` has options.
fn settle(script: &DialogueScript, step: usize) -> RunnerState {
    match script.step(step) {
        Some(DialogueStep::Branching { .. }) => RunnerState::AwaitingSelection { step },
        _ => RunnerState::Presenting { step },
    }
}

/// Apply one event to a run. Returns the next machine and what happened.
#[must_use]
pub fn transition(
    script: &DialogueScript,
    machine: Machine,
    event: RunnerEvent,
) -> (Machine, Transition) {
    match (machine.state, event) {
        (RunnerState::AwaitingSelection { step }, RunnerEvent::Select(option_id)) => {
            let Some(option) = script.step(step).and_then(|s| s.option(option_id)) else {
                return (machine, Transition::ignored());
            };
            let gain = if option.is_correct() {
                SCORE_PER_CORRECT
            } else {
                0
            };
            let next = Machine {
                state: RunnerState::ShowingFeedback {
                    step,
                    selected: option_id,
                },
                score: machine.score.saturating_add(gain),
                step_gain: gain,
                correct_answers: machine.correct_answers + usize::from(option.is_correct()),
            };
            (next, Transition::applied(None))
        }
        (RunnerState::ShowingFeedback { step, .. }, RunnerEvent::Advance { at }) => {
            advance_from(script, machine, step, at)
        }
        (RunnerState::Presenting { step }, RunnerEvent::Advance { at })
            if script.step(step).is_some_and(DialogueStep::is_terminal) =>
        {
            advance_from(script, machine, step, at)
        }
        (RunnerState::Completed { .. }, RunnerEvent::Reset) => {
            (Machine::initial(script), Transition::applied(None))
        }
        _ => (machine, Transition::ignored()),
    }
}

fn advance_from(
    script: &DialogueScript,
    machine: Machine,
    step: usize,
    now: DateTime<Utc>,
) -> (Machine, Transition) {
    let next_step = step + 1;
    let completed = next_step >= script.len();
    let state = if completed {
        RunnerState::Completed {
            score: machine.score,
        }
    } else {
        settle(script, next_step)
    };

    let update = ProgressUpdate {
        script_id: script.id(),
        current_step: next_step,
        score_delta: machine.step_gain,
        score: machine.score,
        completed,
        reported_at: now,
    };
    let next = Machine {
        state,
        step_gain: 0,
        ..machine
    };
    (
        next,
        Transition::applied(Some(Effect::PersistProgress(update))),
    )
}

/// A single learner's run through one script.
#[derive(Debug, Clone)]
pub struct DialogueRunner {
    script: DialogueScript,
    machine: Machine,
}

impl DialogueRunner {
    /// Begin a fresh run at the first step with a zero score.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::EmptyScript` if the script has no steps.
    pub fn start(script: DialogueScript) -> Result<Self, RunnerError> {
        if script.is_empty() {
            return Err(RunnerError::EmptyScript);
        }
        let machine = Machine::initial(&script);
        Ok(Self { script, machine })
    }

    /// Record the learner's choice on the current step.
    ///
    /// Only the first choice on a step counts; later calls are ignored, as are
    /// calls outside `AwaitingSelection` and unknown option ids.
    pub fn select_option(&mut self, option_id: OptionId) -> Transition {
        self.apply(RunnerEvent::Select(option_id))
    }

    /// Move past the current step and emit one progress report.
    ///
    /// Valid after feedback is shown, or on a step without options.
    pub fn advance(&mut self, clock: &Clock) -> Transition {
        self.apply(RunnerEvent::Advance { at: clock.now() })
    }

    /// Restart a completed run from the first step with the score zeroed.
    pub fn reset(&mut self) -> Transition {
        self.apply(RunnerEvent::Reset)
    }

    pub fn apply(&mut self, event: RunnerEvent) -> Transition {
        let (machine, transition) = transition(&self.script, self.machine, event);
        self.machine = machine;
        transition
    }

    #[must_use]
    pub fn script(&self) -> &DialogueScript {
        &self.script
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.machine.state
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.machine.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.machine.state, RunnerState::Completed { .. })
    }

    /// Index of the visible step; equals the script length once completed.
    #[must_use]
    pub fn step_index(&self) -> usize {
        match self.machine.state {
            RunnerState::Presenting { step }
            | RunnerState::AwaitingSelection { step }
            | RunnerState::ShowingFeedback { step, .. } => step,
            RunnerState::Completed { .. } => self.script.len(),
        }
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&DialogueStep> {
        self.script.step(self.step_index())
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&DialogueOption> {
        match self.machine.state {
            RunnerState::ShowingFeedback { step, selected } => {
                self.script.step(step).and_then(|s| s.option(selected))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn selected_feedback(&self) -> Option<&BilingualText> {
        self.selected_option().and_then(DialogueOption::feedback)
    }

    #[must_use]
    pub fn run_state(&self) -> RunState {
        RunState {
            script_id: self.script.id(),
            current_step_index: self.step_index(),
            cumulative_score: self.machine.score,
            completed: self.is_completed(),
            selected_option: self.selected_option().map(DialogueOption::id),
        }
    }

    #[must_use]
    pub fn progress(&self) -> RunProgress {
        RunProgress {
            total: self.script.len(),
            current: self.step_index(),
            correct_answers: self.machine.correct_answers,
            score: self.machine.score,
            max_score: self.script.max_score(),
            is_complete: self.is_completed(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
