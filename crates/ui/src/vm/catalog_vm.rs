use practice_core::model::{CatalogEntry, ScriptId};
use services::CatalogSummary;

/// How far the learner got with a script last time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunBadge {
    New,
    InProgress { step: usize, total: usize },
    Completed,
}

impl RunBadge {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::New => "New".to_string(),
            Self::InProgress { step, total } => format!("In progress: step {step}/{total}"),
            Self::Completed => "Completed".to_string(),
        }
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::New => "badge badge-new",
            Self::InProgress { .. } => "badge badge-progress",
            Self::Completed => "badge badge-done",
        }
    }
}

/// One card in the conversation list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogCardVm {
    pub id: ScriptId,
    pub title: String,
    pub subtitle: String,
    pub steps_label: String,
    pub badge: RunBadge,
    pub score_label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogVm {
    pub cards: Vec<CatalogCardVm>,
    pub summary_label: String,
}

impl CatalogVm {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[must_use]
pub fn map_catalog(entries: &[CatalogEntry]) -> CatalogVm {
    CatalogVm {
        cards: entries.iter().map(map_catalog_card).collect(),
        summary_label: format_summary(CatalogSummary::from_entries(entries)),
    }
}

#[must_use]
pub fn map_catalog_card(entry: &CatalogEntry) -> CatalogCardVm {
    let script = &entry.script;
    let total = script.len();
    let badge = match &entry.last_run {
        Some(run) if run.completed => RunBadge::Completed,
        Some(run) if run.current_step > 0 => RunBadge::InProgress {
            step: run.current_step.min(total),
            total,
        },
        _ => RunBadge::New,
    };
    let score_label = entry
        .last_run
        .as_ref()
        .map(|run| format!("Score: {} / {}", run.score, script.max_score()));

    CatalogCardVm {
        id: script.id(),
        title: script.title().primary().to_string(),
        subtitle: script.title().translation().to_string(),
        steps_label: format_steps(total),
        badge,
        score_label,
    }
}

fn format_steps(total: usize) -> String {
    if total == 1 {
        "1 step".to_string()
    } else {
        format!("{total} steps")
    }
}

fn format_summary(summary: CatalogSummary) -> String {
    format!(
        "{} conversations · {} completed · {} in progress",
        summary.scripts, summary.completed, summary.in_progress
    )
}
