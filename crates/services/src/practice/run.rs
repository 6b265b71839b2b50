use std::fmt;

use practice_core::Clock;
use practice_core::model::{OptionId, RunRecord};
use practice_core::runner::{DialogueRunner, RunProgress, Transition};

/// A learner's live run, owned by the view that started it.
pub struct PracticeRun {
    runner: DialogueRunner,
    clock: Clock,
    previous: Option<RunRecord>,
}

impl PracticeRun {
    pub(crate) fn new(runner: DialogueRunner, clock: Clock, previous: Option<RunRecord>) -> Self {
        Self {
            runner,
            clock,
            previous,
        }
    }

    #[must_use]
    pub fn runner(&self) -> &DialogueRunner {
        &self.runner
    }

    /// Progress recorded before this run started, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&RunRecord> {
        self.previous.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> RunProgress {
        self.runner.progress()
    }

    pub fn select_option(&mut self, option_id: OptionId) -> Transition {
        let transition = self.runner.select_option(option_id);
        log::debug!(
            "script {} select {option_id}: {:?}, score {}",
            self.runner.script().id(),
            transition.outcome,
            self.runner.score()
        );
        transition
    }

    /// Advance the run. The returned effect still has to be dispatched.
    pub fn advance(&mut self) -> Transition {
        let transition = self.runner.advance(&self.clock);
        log::debug!(
            "script {} advance: {:?}, now at step {}",
            self.runner.script().id(),
            transition.outcome,
            self.runner.step_index()
        );
        transition
    }

    pub fn reset(&mut self) -> Transition {
        let transition = self.runner.reset();
        if transition.is_applied() {
            log::debug!("script {} restarted", self.runner.script().id());
        }
        transition
    }
}

impl fmt::Debug for PracticeRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticeRun")
            .field("script_id", &self.runner.script().id())
            .field("state", &self.runner.state())
            .field("score", &self.runner.score())
            .field("previous", &self.previous)
            .finish_non_exhaustive()
    }
}
