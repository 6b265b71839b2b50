use async_trait::async_trait;
use dioxus::prelude::ReadableExt;
use practice_core::model::{OptionId, ScriptId};
use practice_core::time::fixed_now;
use std::sync::Arc;
use storage::repository::{
    InMemoryRepository, ProgressRepository, ScriptRepository, Storage, StorageError,
};

use super::test_harness::{ViewKind, setup_view_harness, setup_view_harness_with_storage};
use crate::vm::{DialogueIntent, DialoguePhase};

#[tokio::test(flavor = "current_thread")]
async fn catalog_view_smoke_lists_sample_scripts() {
    let mut harness = setup_view_harness(ViewKind::Catalog).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Conversations"), "missing title in {html}");
    assert!(html.contains("Au café"), "missing first script in {html}");
    assert!(html.contains("Test de niveau"), "missing second script in {html}");
    assert!(html.contains("New"), "missing badge in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn catalog_view_smoke_shows_last_run() {
    let mut harness = setup_view_harness(ViewKind::Catalog).await;
    harness
        .storage
        .progress
        .append_progress(&practice_core::model::ProgressUpdate {
            script_id: ScriptId::new(1),
            current_step: 2,
            score_delta: 10,
            score: 20,
            completed: false,
            reported_at: fixed_now(),
        })
        .await
        .expect("append progress");

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("In progress: step 2/5"), "missing progress in {html}");
    assert!(html.contains("Score: 20 / 50"), "missing score in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn conversation_view_smoke_renders_first_step() {
    let mut harness = setup_view_harness(ViewKind::Conversation(1)).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Step 1 of 5"), "missing step label in {html}");
    assert!(html.contains("A coffee, please."), "missing option in {html}");
    assert!(html.contains("Score: 0"), "missing score in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn conversation_view_reports_progress_on_advance() {
    let mut harness = setup_view_harness(ViewKind::Conversation(1)).await;
    harness.rebuild();
    harness.drive_async().await;

    let handles = harness.conversation_handles.clone().expect("handles");
    handles.dispatch().call(DialogueIntent::Select(OptionId::new(1)));
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Correct! +10"), "missing feedback in {html}");

    handles.dispatch().call(DialogueIntent::Advance);
    harness.drive_async().await;
    harness.drive_async().await;

    let phase = handles.vm().read().as_ref().map(crate::vm::DialogueVm::phase);
    assert_eq!(phase, Some(DialoguePhase::Choosing));
    let latest = harness
        .storage
        .progress
        .latest_run(ScriptId::new(1))
        .await
        .expect("read progress")
        .expect("progress reported");
    assert_eq!(latest.current_step, 1);
    assert_eq!(latest.score, 10);
}

#[tokio::test(flavor = "current_thread")]
async fn conversation_view_smoke_unknown_script() {
    let mut harness = setup_view_harness(ViewKind::Conversation(404)).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(
        html.contains("This conversation is no longer available."),
        "missing not-found message in {html}"
    );
}

struct FailingProgressRepo;

#[async_trait]
impl ProgressRepository for FailingProgressRepo {
    async fn append_progress(
        &self,
        _update: &practice_core::model::ProgressUpdate,
    ) -> Result<i64, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn latest_run(
        &self,
        _script_id: ScriptId,
    ) -> Result<Option<practice_core::model::RunRecord>, StorageError> {
        Ok(None)
    }

    async fn latest_runs(
        &self,
        _script_ids: &[ScriptId],
    ) -> Result<Vec<practice_core::model::RunRecord>, StorageError> {
        Ok(Vec::new())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn conversation_view_keeps_going_when_reports_fail() {
    let scripts = InMemoryRepository::new();
    for script in storage::seed::sample_scripts().expect("sample scripts") {
        scripts
            .upsert_script(&script, fixed_now())
            .await
            .expect("seed script");
    }
    let storage = Storage {
        scripts: Arc::new(scripts),
        progress: Arc::new(FailingProgressRepo),
    };
    let mut harness = setup_view_harness_with_storage(ViewKind::Conversation(1), storage);
    harness.rebuild();
    harness.drive_async().await;

    let handles = harness.conversation_handles.clone().expect("handles");
    handles.dispatch().call(DialogueIntent::Select(OptionId::new(1)));
    handles.dispatch().call(DialogueIntent::Advance);
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Step 2 of 5"), "run did not advance in {html}");
    assert!(html.contains("Score: 10"), "missing score in {html}");
    assert!(
        !html.contains("Something went wrong"),
        "report failure leaked into the page: {html}"
    );
}
