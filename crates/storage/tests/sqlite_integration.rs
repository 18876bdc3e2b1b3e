use chrono::NaiveDate;
use storage::KeyValueStore;
use storage::records::ENTRIES_KEY;
use storage::repository::{EntryRepository, GoalRepository, SessionRepository, StoredSession};
use storage::sqlite::SqliteRepository;
use storage::{KvEntryStore, Storage};
use std::sync::Arc;
use tracker_core::model::{EntryId, GoalDraft, WeeklyEntry, WeeklyEntryDraft};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_entry(id: u64, day: u32, weight: f64) -> WeeklyEntry {
    let mut draft = WeeklyEntryDraft::new(date(2024, 2, day));
    draft.weight = Some(weight);
    draft.waist = Some(96.0);
    draft.sleep = 7.5;
    draft.water = 2.0;
    draft.validate(EntryId::new(id)).unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_kv_upserts_and_removes() {
    let repo = connect("memdb_kv").await;
    assert_eq!(repo.get("k").await.unwrap(), None);

    repo.set("k", "one").await.unwrap();
    repo.set("k", "two").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("two"));

    repo.remove("k").await.unwrap();
    repo.remove("k").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let (applied,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
    repo.set("k", "v").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn sqlite_storage_round_trips_goal_entries_and_session() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");

    let goal = GoalDraft {
        start_date: Some(date(2024, 1, 1)),
        end_date: Some(date(2024, 5, 1)),
        initial_weight: Some(88.0),
        target_weight: Some(78.0),
        initial_waist: Some(101.0),
        target_waist: Some(91.0),
        height: Some(170.0),
    }
    .validate()
    .unwrap();
    storage.goals.save_goal(&goal).await.unwrap();
    assert_eq!(storage.goals.load_goal().await.unwrap(), Some(goal));

    let entries = [
        build_entry(10, 5, 87.0),
        build_entry(11, 12, 86.1),
        build_entry(12, 19, 85.4),
    ];
    for entry in &entries {
        storage.entries.append_entry(entry).await.unwrap();
    }
    let loaded = storage.entries.load_entries().await.unwrap();
    assert_eq!(loaded.entries, entries.to_vec());
    assert!(loaded.skipped.is_empty());

    let session = StoredSession {
        access_token: "token".into(),
        email: Some("pat@example.com".into()),
    };
    storage.sessions.save_session(&session).await.unwrap();
    assert_eq!(storage.sessions.load_session().await.unwrap(), Some(session));
    storage.sessions.clear_session().await.unwrap();
    assert_eq!(storage.sessions.load_session().await.unwrap(), None);
}

#[tokio::test]
async fn malformed_rows_in_sqlite_are_skipped() {
    let repo = connect("memdb_malformed").await;
    repo.set(
        ENTRIES_KEY,
        r#"[{"id":"1","date":"2024-02-05"},{"id":"2","date":"2024-02-12","weight":80,"waist":95,"errors":1,"physicalActivity":true,"sleep":8,"meditation":true,"water":2.5,"bodyWeightPerception":"high","energy":"low","sugarCraving":"none"}]"#,
    )
    .await
    .unwrap();

    let store = KvEntryStore::new(Arc::new(repo));
    let loaded = store.load_entries().await.unwrap();
    assert_eq!(loaded.entries.len(), 1);
    assert_eq!(loaded.entries[0].id(), EntryId::new(2));
    assert_eq!(loaded.skipped.len(), 1);
    assert_eq!(loaded.skipped[0].position, 0);
}
