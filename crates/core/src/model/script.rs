use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{OptionId, ScriptId};
use crate::model::run::SCORE_PER_CORRECT;
use crate::model::text::BilingualText;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionsError {
    #[error("a branching step needs at least one option")]
    Empty,

    #[error("option {0} appears more than once")]
    Duplicate(OptionId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScriptError {
    #[error("script must contain at least one step")]
    Empty,

    #[error("step {step}: {source}")]
    InvalidOptions {
        step: usize,
        #[source]
        source: OptionsError,
    },
}

/// Authoring problems that do not stop a script from running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentIssue {
    NoCorrectOption { step: usize },
    MultipleCorrectOptions { step: usize, count: usize },
}

//
// ─── OPTIONS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    System,
    Student,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueOption {
    id: OptionId,
    text: BilingualText,
    is_correct: bool,
    feedback: Option<BilingualText>,
}

impl DialogueOption {
    #[must_use]
    pub fn new(id: OptionId, text: BilingualText, is_correct: bool) -> Self {
        Self {
            id,
            text,
            is_correct,
            feedback: None,
        }
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: BilingualText) -> Self {
        self.feedback = Some(feedback);
        self
    }

    #[must_use]
    pub fn id(&self) -> OptionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &BilingualText {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&BilingualText> {
        self.feedback.as_ref()
    }
}

/// Options of a branching step: never empty, ids unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyOptions(Vec<DialogueOption>);

impl NonEmptyOptions {
    /// # Errors
    ///
    /// Returns `OptionsError::Empty` for an empty list and
    /// `OptionsError::Duplicate` when two options share an id.
    pub fn new(options: Vec<DialogueOption>) -> Result<Self, OptionsError> {
        if options.is_empty() {
            return Err(OptionsError::Empty);
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.id) {
                return Err(OptionsError::Duplicate(option.id));
            }
        }
        Ok(Self(options))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[DialogueOption] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, id: OptionId) -> Option<&DialogueOption> {
        self.0.iter().find(|option| option.id == id)
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.0.iter().filter(|option| option.is_correct).count()
    }
}

//
// ─── STEPS ─────────────────────────────────────────────────────────────────────
//

/// One point in a script. A step either just shows text or asks for a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueStep {
    Terminal {
        speaker: Speaker,
        prompt: BilingualText,
    },
    Branching {
        speaker: Speaker,
        prompt: BilingualText,
        options: NonEmptyOptions,
    },
}

impl DialogueStep {
    #[must_use]
    pub fn terminal(speaker: Speaker, prompt: BilingualText) -> Self {
        Self::Terminal { speaker, prompt }
    }

    /// # Errors
    ///
    /// Returns `OptionsError` if `options` is empty or repeats an id.
    pub fn branching(
        speaker: Speaker,
        prompt: BilingualText,
        options: Vec<DialogueOption>,
    ) -> Result<Self, OptionsError> {
        Ok(Self::Branching {
            speaker,
            prompt,
            options: NonEmptyOptions::new(options)?,
        })
    }

    #[must_use]
    pub fn speaker(&self) -> Speaker {
        match self {
            Self::Terminal { speaker, .. } | Self::Branching { speaker, .. } => *speaker,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &BilingualText {
        match self {
            Self::Terminal { prompt, .. } | Self::Branching { prompt, .. } => prompt,
        }
    }

    /// Options in authored order; empty for terminal steps.
    #[must_use]
    pub fn options(&self) -> &[DialogueOption] {
        match self {
            Self::Terminal { .. } => &[],
            Self::Branching { options, .. } => options.as_slice(),
        }
    }

    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&DialogueOption> {
        match self {
            Self::Terminal { .. } => None,
            Self::Branching { options, .. } => options.get(id),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }
}

//
// ─── SCRIPT ────────────────────────────────────────────────────────────────────
//

/// An authored dialogue. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScriptDraft", into = "ScriptDraft")]
pub struct DialogueScript {
    id: ScriptId,
    title: BilingualText,
    steps: Vec<DialogueStep>,
}

impl DialogueScript {
    /// Assemble a script from already-built steps.
    ///
    /// An empty step list is accepted here; the runner refuses to start it.
    /// Imported content goes through `ScriptDraft::validate`, which rejects it.
    #[must_use]
    pub fn new(id: ScriptId, title: BilingualText, steps: Vec<DialogueStep>) -> Self {
        Self { id, title, steps }
    }

    #[must_use]
    pub fn id(&self) -> ScriptId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &BilingualText {
        &self.title
    }

    #[must_use]
    pub fn steps(&self) -> &[DialogueStep] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, index: usize) -> Option<&DialogueStep> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Highest score a run can reach when every first choice is correct.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        let scoring_steps = self
            .steps
            .iter()
            .filter(|step| match step {
                DialogueStep::Branching { options, .. } => options.correct_count() > 0,
                DialogueStep::Terminal { .. } => false,
            })
            .count();
        u32::try_from(scoring_steps)
            .unwrap_or(u32::MAX)
            .saturating_mul(SCORE_PER_CORRECT)
    }

    /// Steps whose options do not have exactly one correct answer.
    #[must_use]
    pub fn content_issues(&self) -> Vec<ContentIssue> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(step, s)| match s {
                DialogueStep::Terminal { .. } => None,
                DialogueStep::Branching { options, .. } => match options.correct_count() {
                    0 => Some(ContentIssue::NoCorrectOption { step }),
                    1 => None,
                    count => Some(ContentIssue::MultipleCorrectOptions { step, count }),
                },
            })
            .collect()
    }
}

//
// ─── WIRE SHAPE ────────────────────────────────────────────────────────────────
//

/// Script as authored or received from the backend: a flat option list per
/// step, where no options means the step is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDraft {
    pub id: ScriptId,
    pub title: BilingualText,
    pub steps: Vec<StepDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDraft {
    pub speaker: Speaker,
    pub prompt: BilingualText,
    #[serde(default)]
    pub options: Vec<OptionDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDraft {
    pub id: OptionId,
    pub text: BilingualText,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<BilingualText>,
}

impl ScriptDraft {
    /// Validate authored content into a runnable script.
    ///
    /// # Errors
    ///
    /// Returns `ScriptError::Empty` for a script without steps and
    /// `ScriptError::InvalidOptions` when a step repeats an option id.
    pub fn validate(self) -> Result<DialogueScript, ScriptError> {
        if self.steps.is_empty() {
            return Err(ScriptError::Empty);
        }

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, draft) in self.steps.into_iter().enumerate() {
            let step = if draft.options.is_empty() {
                DialogueStep::terminal(draft.speaker, draft.prompt)
            } else {
                let options = draft
                    .options
                    .into_iter()
                    .map(OptionDraft::into_option)
                    .collect();
                DialogueStep::branching(draft.speaker, draft.prompt, options).map_err(
                    |source| ScriptError::InvalidOptions {
                        step: index,
                        source,
                    },
                )?
            };
            steps.push(step);
        }

        Ok(DialogueScript::new(self.id, self.title, steps))
    }
}

impl OptionDraft {
    fn into_option(self) -> DialogueOption {
        let option = DialogueOption::new(self.id, self.text, self.is_correct);
        match self.feedback {
            Some(feedback) => option.with_feedback(feedback),
            None => option,
        }
    }
}

impl TryFrom<ScriptDraft> for DialogueScript {
    type Error = ScriptError;

    fn try_from(draft: ScriptDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<DialogueScript> for ScriptDraft {
    fn from(script: DialogueScript) -> Self {
        let steps = script
            .steps
            .into_iter()
            .map(|step| match step {
                DialogueStep::Terminal { speaker, prompt } => StepDraft {
                    speaker,
                    prompt,
                    options: Vec::new(),
                },
                DialogueStep::Branching {
                    speaker,
                    prompt,
                    options,
                } => StepDraft {
                    speaker,
                    prompt,
                    options: options
                        .0
                        .into_iter()
                        .map(|option| OptionDraft {
                            id: option.id,
                            text: option.text,
                            is_correct: option.is_correct,
                            feedback: option.feedback,
                        })
                        .collect(),
                },
            })
            .collect();

        Self {
            id: script.id,
            title: script.title,
            steps,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
