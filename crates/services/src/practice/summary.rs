use practice_core::model::CatalogEntry;

/// Totals across the catalog, for the header of the practice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub scripts: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub total_score: u32,
}

impl CatalogSummary {
    #[must_use]
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        entries
            .iter()
            .fold(Self::default(), |mut acc, entry| {
                acc.scripts += 1;
                if let Some(run) = &entry.last_run {
                    if run.completed {
                        acc.completed += 1;
                    } else if run.current_step > 0 {
                        acc.in_progress += 1;
                    }
                    acc.total_score = acc.total_score.saturating_add(run.score);
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::{
        BilingualText, DialogueScript, DialogueStep, RunRecord, ScriptId, Speaker,
    };
    use practice_core::time::fixed_now;

    fn entry(id: u64, run: Option<(usize, u32, bool)>) -> CatalogEntry {
        let prompt = BilingualText::new("Bonjour", "Hello").unwrap();
        let script = DialogueScript::new(
            ScriptId::new(id),
            prompt.clone(),
            vec![DialogueStep::terminal(Speaker::System, prompt)],
        );
        CatalogEntry {
            script,
            last_run: run.map(|(current_step, score, completed)| RunRecord {
                script_id: ScriptId::new(id),
                current_step,
                score,
                completed,
                updated_at: fixed_now(),
            }),
        }
    }

    #[test]
    fn summary_counts_runs_by_status() {
        let entries = vec![
            entry(1, Some((5, 40, true))),
            entry(2, Some((2, 10, false))),
            entry(3, None),
        ];
        let summary = CatalogSummary::from_entries(&entries);
        assert_eq!(
            summary,
            CatalogSummary {
                scripts: 3,
                completed: 1,
                in_progress: 1,
                total_score: 50,
            }
        );
    }
}
