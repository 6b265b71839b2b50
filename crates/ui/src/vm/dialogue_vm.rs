use practice_core::model::{OptionId, ScriptId, Speaker, SCORE_PER_CORRECT};
use practice_core::runner::{Effect, RunnerState};
use services::{PracticeError, PracticeLoopService, PracticeRun};

use crate::views::ViewError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogueIntent {
    Select(OptionId),
    Advance,
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialoguePhase {
    /// A line with nothing to answer.
    Reading,
    Choosing,
    Feedback,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: OptionId,
    pub text: String,
    pub translation: String,
    pub mark: OptionMark,
}

impl OptionVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self.mark {
            OptionMark::Plain => "option",
            OptionMark::Correct => "option option-correct",
            OptionMark::Incorrect => "option option-incorrect",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackVm {
    pub correct: bool,
    pub headline: String,
    pub text: Option<String>,
    pub translation: Option<String>,
}

impl FeedbackVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.correct {
            "feedback feedback-correct"
        } else {
            "feedback feedback-incorrect"
        }
    }
}

/// Everything the conversation page renders, detached from the live run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueScreenVm {
    pub title: String,
    pub phase: DialoguePhase,
    pub step_label: String,
    pub score_label: String,
    pub speaker_label: &'static str,
    pub prompt: String,
    pub translation: String,
    pub options: Vec<OptionVm>,
    pub feedback: Option<FeedbackVm>,
    pub advance_label: Option<&'static str>,
    pub summary: Option<String>,
    pub previous_label: Option<String>,
}

impl DialogueScreenVm {
    #[must_use]
    pub fn can_select(&self) -> bool {
        self.phase == DialoguePhase::Choosing
    }
}

pub struct DialogueVm {
    run: PracticeRun,
}

impl DialogueVm {
    #[must_use]
    pub fn new(run: PracticeRun) -> Self {
        Self { run }
    }

    #[must_use]
    pub fn phase(&self) -> DialoguePhase {
        match self.run.runner().state() {
            RunnerState::Presenting { .. } => DialoguePhase::Reading,
            RunnerState::AwaitingSelection { .. } => DialoguePhase::Choosing,
            RunnerState::ShowingFeedback { .. } => DialoguePhase::Feedback,
            RunnerState::Completed { .. } => DialoguePhase::Finished,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.run.runner().score()
    }

    /// Apply a learner action. The returned effect must be dispatched by the caller.
    pub fn apply(&mut self, intent: DialogueIntent) -> Option<Effect> {
        let transition = match intent {
            DialogueIntent::Select(option_id) => self.run.select_option(option_id),
            DialogueIntent::Advance => self.run.advance(),
            DialogueIntent::Restart => self.run.reset(),
        };
        transition.effect
    }

    #[must_use]
    pub fn screen(&self) -> DialogueScreenVm {
        let runner = self.run.runner();
        let script = runner.script();
        let progress = self.run.progress();
        let phase = self.phase();
        let selected = runner.selected_option();

        let (speaker_label, prompt, translation, options) = match runner.current_step() {
            Some(step) => {
                let options = step
                    .options()
                    .iter()
                    .map(|option| {
                        let mark = match selected {
                            Some(chosen) if chosen.id() == option.id() => {
                                if option.is_correct() {
                                    OptionMark::Correct
                                } else {
                                    OptionMark::Incorrect
                                }
                            }
                            _ => OptionMark::Plain,
                        };
                        OptionVm {
                            id: option.id(),
                            text: option.text().primary().to_string(),
                            translation: option.text().translation().to_string(),
                            mark,
                        }
                    })
                    .collect();
                (
                    speaker_name(step.speaker()),
                    step.prompt().primary().to_string(),
                    step.prompt().translation().to_string(),
                    options,
                )
            }
            None => ("", String::new(), String::new(), Vec::new()),
        };

        let feedback = selected.map(|option| {
            let headline = if option.is_correct() {
                format!("Correct! +{SCORE_PER_CORRECT}")
            } else {
                "Not quite.".to_string()
            };
            FeedbackVm {
                correct: option.is_correct(),
                headline,
                text: option.feedback().map(|f| f.primary().to_string()),
                translation: option
                    .feedback()
                    .filter(|f| f.has_translation())
                    .map(|f| f.translation().to_string()),
            }
        });

        let is_last = progress.current + 1 >= progress.total;
        let advance_label = match phase {
            DialoguePhase::Reading | DialoguePhase::Feedback if is_last => Some("Finish"),
            DialoguePhase::Reading => Some("Continue"),
            DialoguePhase::Feedback => Some("Next"),
            DialoguePhase::Choosing | DialoguePhase::Finished => None,
        };

        let summary = progress.is_complete.then(|| {
            format!(
                "You scored {} out of {}. {} of {} answers correct.",
                progress.score,
                progress.max_score,
                progress.correct_answers,
                script.steps().iter().filter(|s| !s.is_terminal()).count()
            )
        });

        let previous_label = self.run.previous().map(|run| {
            if run.completed {
                format!("Last time: finished with {} points", run.score)
            } else {
                format!("Last time: reached step {} with {} points", run.current_step, run.score)
            }
        });

        DialogueScreenVm {
            title: script.title().primary().to_string(),
            phase,
            step_label: format!(
                "Step {} of {}",
                (progress.current + 1).min(progress.total),
                progress.total
            ),
            score_label: format!("Score: {}", progress.score),
            speaker_label,
            prompt,
            translation,
            options,
            feedback,
            advance_label,
            summary,
            previous_label,
        }
    }
}

fn speaker_name(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::System => "Partner",
        Speaker::Student => "You",
    }
}

/// # Errors
///
/// Returns `ViewError::NotFound` when the script is not in the catalog,
/// `ViewError::EmptyScript` when it has no steps, `ViewError::Unknown` otherwise.
pub async fn start_dialogue(
    practice_loop: &PracticeLoopService,
    script_id: ScriptId,
) -> Result<DialogueVm, ViewError> {
    match practice_loop.start_run(script_id).await {
        Ok(run) => Ok(DialogueVm::new(run)),
        Err(PracticeError::UnknownScript(_)) => Err(ViewError::NotFound),
        Err(PracticeError::Runner(_)) => Err(ViewError::EmptyScript),
        Err(_) => Err(ViewError::Unknown),
    }
}
