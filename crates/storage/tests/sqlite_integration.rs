use sqlx::Row;
use storage::repository::LocalProgressStore;
use storage::sqlite::{LOCAL_PROGRESS_KEY, SqliteRepository};
use tracker_core::model::ProblemId;

fn ids(values: &[&str]) -> Vec<ProblemId> {
    values.iter().map(|v| ProblemId::from(*v)).collect()
}

#[tokio::test]
async fn sqlite_local_store_roundtrips_completed_set() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load().await.unwrap().is_none());

    repo.save(&ids(&["two-pointers-0", "stack-2"])).await.unwrap();
    let loaded = repo.load().await.unwrap().expect("saved value present");
    assert_eq!(loaded, ids(&["two-pointers-0", "stack-2"]));

    // Overwrite semantics: the whole value is replaced, not appended.
    repo.save(&ids(&["stack-2"])).await.unwrap();
    let reloaded = repo.load().await.unwrap().unwrap();
    assert_eq!(reloaded, ids(&["stack-2"]));
}

#[tokio::test]
async fn sqlite_local_store_treats_corrupt_value_as_absent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    sqlx::query(
        "INSERT INTO local_progress (key, value, updated_at) VALUES (?1, ?2, ?3)",
    )
    .bind(LOCAL_PROGRESS_KEY)
    .bind("{ not json")
    .bind("2023-11-14T22:13:20Z")
    .execute(repo.pool())
    .await
    .unwrap();

    assert!(repo.load().await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first run");
    repo.migrate().await.expect("second run");

    let row = sqlx::query("SELECT COUNT(*) AS n FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    let n: i64 = row.try_get("n").unwrap();
    assert_eq!(n, 1);
}
