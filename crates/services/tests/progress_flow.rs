//! End-to-end flows for progress resolution, migration, and persistence,
//! driven through in-memory stores.

use std::sync::Arc;

use services::ProgressService;
use storage::repository::{
    InMemoryLocalStore, InMemoryRemoteStore, LocalProgressStore, ProgressRecord,
    RemoteProgressStore, Storage,
};
use tracker_core::model::{Account, AccountId, Identity, ProblemId};
use tracker_core::time::{fixed_clock, fixed_now};
use uuid::Uuid;

fn id(value: &str) -> ProblemId {
    ProblemId::from(value)
}

fn ids(values: &[&str]) -> Vec<ProblemId> {
    values.iter().map(|v| id(v)).collect()
}

fn account() -> Account {
    Account::new(
        AccountId::new(Uuid::parse_str("6f0f9f2e-3b7a-4fd5-9f57-2f6a1f0c9d11").unwrap()),
        "dev@example.com",
    )
}

fn wired(local: InMemoryLocalStore, remote: InMemoryRemoteStore) -> Storage {
    Storage {
        local: Arc::new(local),
        remote: Arc::new(remote),
    }
}

#[tokio::test]
async fn first_sign_in_migrates_local_progress_to_remote() {
    let local = InMemoryLocalStore::seeded(ids(&["a", "b"]));
    let remote = InMemoryRemoteStore::new();
    let storage = wired(local, remote.clone());

    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;

    // Adopted in memory and written through as a new remote record.
    assert_eq!(progress.completed_count(), 2);
    assert!(progress.is_completed(&id("a")));
    assert!(progress.is_completed(&id("b")));

    let record = remote.record(account().id).expect("migration created a record");
    assert_eq!(record.completed_problems, ids(&["a", "b"]));
    assert_eq!(record.updated_at, fixed_now());
}

#[tokio::test]
async fn existing_remote_record_wins_over_local() {
    let local = InMemoryLocalStore::seeded(ids(&["a"]));
    let remote = InMemoryRemoteStore::new();
    remote
        .upsert(&ProgressRecord::new(account().id, ids(&["b", "c"]), fixed_now()))
        .await
        .unwrap();
    let storage = wired(local, remote.clone());

    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;

    // Remote wins when present; local is not merged in.
    assert_eq!(progress.completed_count(), 2);
    assert!(progress.is_completed(&id("b")));
    assert!(progress.is_completed(&id("c")));
    assert!(!progress.is_completed(&id("a")));

    // And the remote record is untouched by resolution.
    let record = remote.record(account().id).unwrap();
    assert_eq!(record.completed_problems, ids(&["b", "c"]));
}

#[tokio::test]
async fn authenticated_toggle_upserts_the_full_set() {
    let remote = InMemoryRemoteStore::new();
    remote
        .upsert(&ProgressRecord::new(account().id, ids(&["a"]), fixed_now()))
        .await
        .unwrap();
    let storage = wired(InMemoryLocalStore::new(), remote.clone());

    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;

    assert!(progress.toggle(&id("b")).await);

    let record = remote.record(account().id).unwrap();
    assert_eq!(record.completed_problems, ids(&["a", "b"]));

    assert!(!progress.toggle(&id("a")).await);
    let record = remote.record(account().id).unwrap();
    assert_eq!(record.completed_problems, ids(&["b"]));
}

#[tokio::test]
async fn authenticated_toggle_does_not_touch_the_local_store() {
    let local = InMemoryLocalStore::new();
    let remote = InMemoryRemoteStore::new();
    let storage = wired(local.clone(), remote.clone());

    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;
    progress.toggle(&id("x")).await;

    assert!(local.load().await.unwrap().is_none());
    assert!(remote.record(account().id).is_some());
}

#[tokio::test]
async fn sign_out_resolves_back_to_local_progress() {
    let local = InMemoryLocalStore::seeded(ids(&["local-0"]));
    let remote = InMemoryRemoteStore::new();
    remote
        .upsert(&ProgressRecord::new(account().id, ids(&["remote-0"]), fixed_now()))
        .await
        .unwrap();
    let storage = wired(local, remote);

    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;
    assert!(progress.is_completed(&id("remote-0")));

    progress.identity_changed(Identity::Anonymous).await;
    assert!(progress.is_completed(&id("local-0")));
    assert!(!progress.is_completed(&id("remote-0")));
}

#[tokio::test]
async fn persistence_failure_keeps_in_memory_state() {
    let remote = InMemoryRemoteStore::new();
    remote
        .upsert(&ProgressRecord::new(account().id, vec![], fixed_now()))
        .await
        .unwrap();
    let storage = wired(InMemoryLocalStore::new(), remote.clone());

    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;

    remote.set_failing(true);
    assert!(progress.toggle(&id("x")).await);

    // Write failed, state did not roll back; row still holds the old set.
    assert!(progress.is_completed(&id("x")));
    let record = remote.record(account().id).unwrap();
    assert!(record.completed_problems.is_empty());
}

#[tokio::test]
async fn failed_migration_write_still_adopts_local_for_the_session() {
    let local = InMemoryLocalStore::seeded(ids(&["a"]));
    let remote = InMemoryRemoteStore::new();
    remote.set_failing_writes(true);
    let storage = wired(local.clone(), remote.clone());

    // Fetch reports a genuine not-found, the follow-up migration write
    // fails. The local set is still adopted in memory; no remote record
    // exists, so a later session would re-detect not-found and migrate
    // again.
    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;

    assert!(progress.is_completed(&id("a")));
    assert!(remote.record(account().id).is_none());
    assert_eq!(local.load().await.unwrap().unwrap(), ids(&["a"]));
}

#[tokio::test]
async fn remote_read_failure_degrades_to_empty_without_migrating() {
    let local = InMemoryLocalStore::seeded(ids(&["a"]));
    let remote = InMemoryRemoteStore::new();
    remote.set_failing(true);
    let storage = wired(local.clone(), remote.clone());

    let mut progress = ProgressService::new(fixed_clock(), storage);
    progress.identity_changed(Identity::Account(account())).await;

    // A query failure is not the migration trigger; resolution degrades
    // to empty and the local store is untouched for the next session.
    assert!(progress.completed_ids().is_empty());
    assert!(!progress.is_loading());
    assert_eq!(local.load().await.unwrap().unwrap(), ids(&["a"]));
}
