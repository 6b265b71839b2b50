use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use practice_core::model::{
    BilingualText, CatalogEntry, DialogueOption, DialogueScript, DialogueStep, OptionId,
    ProgressUpdate, ScriptId, Speaker,
};
use practice_core::runner::Effect;
use practice_core::time::fixed_clock;
use services::{
    BackendError, PracticeLoopService, ProgressSink, ReportOutcome, ScriptCatalog,
};

const RIGHT: OptionId = OptionId::new(1);
const WRONG: OptionId = OptionId::new(2);

fn five_step_script() -> DialogueScript {
    let text = |s: &str| BilingualText::new(s, "").unwrap();
    let steps = (1..=5)
        .map(|n| {
            DialogueStep::branching(
                Speaker::System,
                text(&format!("Question {n}")),
                vec![
                    DialogueOption::new(RIGHT, text("oui"), true),
                    DialogueOption::new(WRONG, text("non"), false),
                ],
            )
            .unwrap()
        })
        .collect();
    DialogueScript::new(ScriptId::new(7), text("Quiz"), steps)
}

struct FixedCatalog(Vec<CatalogEntry>);

#[async_trait]
impl ScriptCatalog for FixedCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, BackendError> {
        Ok(self.0.clone())
    }
}

/// Records every report and fails the ones for `fail_step`.
#[derive(Default)]
struct FlakySink {
    fail_step: Option<usize>,
    seen: Mutex<Vec<ProgressUpdate>>,
}

#[async_trait]
impl ProgressSink for FlakySink {
    async fn persist_progress(&self, update: &ProgressUpdate) -> Result<(), BackendError> {
        self.seen.lock().unwrap().push(update.clone());
        if self.fail_step == Some(update.current_step) {
            return Err(BackendError::HttpStatus(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ));
        }
        Ok(())
    }
}

/// Never answers, like a hung request.
struct HungSink;

#[async_trait]
impl ProgressSink for HungSink {
    async fn persist_progress(&self, _update: &ProgressUpdate) -> Result<(), BackendError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

fn service_with(sink: Arc<dyn ProgressSink>) -> PracticeLoopService {
    let catalog = Arc::new(FixedCatalog(vec![CatalogEntry {
        script: five_step_script(),
        last_run: None,
    }]));
    PracticeLoopService::new(fixed_clock(), catalog, sink)
}

#[tokio::test]
async fn failed_report_does_not_block_the_next_step() {
    let sink = Arc::new(FlakySink {
        fail_step: Some(3),
        ..FlakySink::default()
    });
    let service = service_with(sink.clone());
    let mut run = service.start_run(ScriptId::new(7)).await.unwrap();

    let mut outcomes = Vec::new();
    for _ in 0..4 {
        let _ = run.select_option(RIGHT);
        let Some(Effect::PersistProgress(update)) = run.advance().effect else {
            panic!("advance should emit a progress report");
        };
        outcomes.push(service.report_progress(update).await);
    }

    assert_eq!(
        outcomes,
        vec![
            ReportOutcome::Delivered,
            ReportOutcome::Delivered,
            ReportOutcome::Dropped,
            ReportOutcome::Delivered,
        ]
    );
    let state = run.runner().run_state();
    assert_eq!(state.current_step_index, 4);
    assert_eq!(state.cumulative_score, 40);
    assert!(!state.completed);
    assert_eq!(sink.seen.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn scripted_run_scores_forty_and_reports_in_step_order() {
    let sink = Arc::new(FlakySink::default());
    let service = service_with(sink.clone());
    let mut run = service.start_run(ScriptId::new(7)).await.unwrap();

    for choice in [RIGHT, RIGHT, WRONG, RIGHT, RIGHT] {
        let _ = run.select_option(choice);
        let effect = run.advance().effect.expect("one effect per advance");
        let handle = service.dispatch(effect).expect("runtime available");
        assert_eq!(handle.await.unwrap(), ReportOutcome::Delivered);
    }

    assert!(run.runner().is_completed());
    assert_eq!(run.runner().score(), 40);

    let seen = sink.seen.lock().unwrap();
    let steps: Vec<usize> = seen.iter().map(|u| u.current_step).collect();
    assert_eq!(steps, vec![1, 2, 3, 4, 5]);
    let deltas: Vec<u32> = seen.iter().map(|u| u.score_delta).collect();
    assert_eq!(deltas, vec![10, 10, 0, 10, 10]);
    assert!(seen.last().unwrap().completed);
}

#[tokio::test]
async fn hung_report_never_holds_up_the_run() {
    let service = service_with(Arc::new(HungSink));
    let mut run = service.start_run(ScriptId::new(7)).await.unwrap();

    let mut pending = Vec::new();
    for _ in 0..5 {
        let _ = run.select_option(WRONG);
        let effect = run.advance().effect.unwrap();
        pending.push(service.dispatch(effect).unwrap());
    }

    assert!(run.runner().is_completed());
    assert_eq!(run.runner().score(), 0);
    assert!(pending.iter().all(|handle| !handle.is_finished()));
    for handle in pending {
        handle.abort();
    }

    assert!(run.reset().is_applied());
    assert_eq!(run.runner().step_index(), 0);
    assert_eq!(run.runner().score(), 0);
}
