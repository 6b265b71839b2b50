use chrono::Duration;
use practice_core::model::{ProgressUpdate, ScriptId};
use practice_core::time::fixed_now;
use storage::repository::{ProgressRepository, ScriptRepository, StorageError};
use storage::seed::sample_scripts;
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn report(script_id: ScriptId, step: usize, score: u32, completed: bool) -> ProgressUpdate {
    ProgressUpdate {
        script_id,
        current_step: step,
        score_delta: 10,
        score,
        completed,
        reported_at: fixed_now() + Duration::seconds(i64::try_from(step).unwrap()),
    }
}

#[tokio::test]
async fn sqlite_round_trips_scripts() {
    let repo = connect("memdb_scripts").await;
    let scripts = sample_scripts().unwrap();
    for script in &scripts {
        repo.upsert_script(script, fixed_now()).await.unwrap();
    }
    // Upserting again replaces rather than duplicating.
    repo.upsert_script(&scripts[0], fixed_now()).await.unwrap();

    let listed = repo.list_scripts(10).await.unwrap();
    assert_eq!(listed, scripts);

    let fetched = repo.get_script(scripts[1].id()).await.unwrap();
    assert_eq!(fetched.len(), scripts[1].len());
    assert!(matches!(
        repo.get_script(ScriptId::new(404)).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_latest_run_prefers_report_time() {
    let repo = connect("memdb_progress").await;
    let scripts = sample_scripts().unwrap();
    for script in &scripts {
        repo.upsert_script(script, fixed_now()).await.unwrap();
    }
    let cafe = scripts[0].id();
    let placement = scripts[1].id();

    // Step 3 arrives before step 2.
    repo.append_progress(&report(cafe, 1, 10, false)).await.unwrap();
    repo.append_progress(&report(cafe, 3, 30, false)).await.unwrap();
    repo.append_progress(&report(cafe, 2, 20, false)).await.unwrap();

    let latest = repo.latest_run(cafe).await.unwrap().expect("run recorded");
    assert_eq!(latest.current_step, 3);
    assert_eq!(latest.score, 30);
    assert!(!latest.completed);

    assert!(repo.latest_run(placement).await.unwrap().is_none());

    repo.append_progress(&report(placement, 4, 30, true)).await.unwrap();
    let runs = repo.latest_runs(&[cafe, placement]).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].script_id, cafe);
    assert_eq!(runs[1].script_id, placement);
    assert!(runs[1].completed);
}

#[tokio::test]
async fn sqlite_rejects_progress_for_unknown_script() {
    let repo = connect("memdb_orphan").await;
    let res = repo
        .append_progress(&report(ScriptId::new(77), 1, 10, false))
        .await;
    assert!(matches!(res, Err(StorageError::Connection(_))));
}
