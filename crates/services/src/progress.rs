//! The progress store: owns the completed set, decides which physical
//! home it lives in, and migrates anonymous progress to a freshly
//! authenticated account.

use std::collections::HashSet;

use tracing::{debug, warn};

use storage::repository::{ProgressRecord, Storage};
use tracker_core::Clock;
use tracker_core::model::{AccountId, Identity, ProblemId};

/// Stateful progress store consumed by the presentation layer.
///
/// Operations assume a cooperative, single-active-call-at-a-time usage
/// pattern driven by user interaction; the store is not designed for
/// concurrent invocation. Persistence-layer failures never escape this
/// type — they degrade to an empty set (reads) or a logged no-op
/// (writes), and the in-memory set stays the source of truth for the
/// session.
pub struct ProgressService {
    clock: Clock,
    storage: Storage,
    completed: HashSet<ProblemId>,
    loading: bool,
    identity: Identity,
}

impl ProgressService {
    /// Creates an unresolved store. `loading` stays true until the first
    /// [`identity_changed`](Self::identity_changed) call completes.
    #[must_use]
    pub fn new(clock: Clock, storage: Storage) -> Self {
        Self {
            clock,
            storage,
            completed: HashSet::new(),
            loading: true,
            identity: Identity::Anonymous,
        }
    }

    /// Re-runs initial resolution for a new identity.
    ///
    /// Called once on mount and again on every identity transition the
    /// authentication collaborator reports. Never fails: every
    /// persistence error degrades to an empty completed set.
    ///
    /// Resolution order for an authenticated account:
    /// - an existing remote record wins outright, even when empty; the
    ///   local store is not consulted and never merged in;
    /// - a genuine not-found triggers the one-shot migration: a non-empty
    ///   local set is adopted and written through to a new remote record.
    ///   If that write silently fails, a later session will re-detect
    ///   not-found and migrate again, which can resurrect stale local
    ///   data over remote edits made elsewhere in the interim.
    pub async fn identity_changed(&mut self, identity: Identity) {
        self.loading = true;
        self.identity = identity;
        self.completed = self.resolve().await;
        self.loading = false;
    }

    async fn resolve(&self) -> HashSet<ProblemId> {
        match &self.identity {
            Identity::Anonymous => self.load_local().await,
            Identity::Account(account) => match self.storage.remote.fetch(account.id).await {
                Ok(Some(record)) => {
                    debug!(
                        account = %account.id,
                        count = record.completed_problems.len(),
                        "adopted remote progress record"
                    );
                    record.completed_problems.into_iter().collect()
                }
                Ok(None) => self.migrate_local(account.id).await,
                Err(err) => {
                    warn!(account = %account.id, error = %err, "progress fetch failed");
                    HashSet::new()
                }
            },
        }
    }

    async fn load_local(&self) -> HashSet<ProblemId> {
        match self.storage.local.load().await {
            Ok(Some(ids)) => ids.into_iter().collect(),
            Ok(None) => HashSet::new(),
            Err(err) => {
                warn!(error = %err, "local progress read failed");
                HashSet::new()
            }
        }
    }

    /// One-shot migration for an account with no remote record yet: adopt
    /// the local set and write it through. An empty or absent local store
    /// means starting empty with no write.
    async fn migrate_local(&self, account_id: AccountId) -> HashSet<ProblemId> {
        let local = self.load_local().await;
        if local.is_empty() {
            return local;
        }

        let record = ProgressRecord::new(account_id, sorted(&local), self.clock.now());
        match self.storage.remote.upsert(&record).await {
            Ok(()) => {
                debug!(account = %account_id, count = local.len(), "migrated local progress");
            }
            Err(err) => {
                warn!(account = %account_id, error = %err, "progress migration write failed");
            }
        }
        local
    }

    /// Toggles completion for a problem.
    ///
    /// Returns true iff `id` was absent before the call — this call is
    /// the one that completed it. The in-memory set updates before any
    /// persistence is attempted, and a persistence failure neither rolls
    /// it back nor surfaces to the caller.
    ///
    /// Persistence always sends the full set as computed at call time, so
    /// a stale in-flight write that completes after a newer one restores
    /// older state: last network response wins, not last logical write.
    /// Known, accepted race.
    pub async fn toggle(&mut self, id: &ProblemId) -> bool {
        let was_completed = self.completed.contains(id);
        if was_completed {
            self.completed.remove(id);
        } else {
            self.completed.insert(id.clone());
        }

        // Snapshot and account are captured before the await so a stale
        // write can only ever target the identity that issued it.
        let snapshot = sorted(&self.completed);
        match &self.identity {
            Identity::Anonymous => {
                if let Err(err) = self.storage.local.save(&snapshot).await {
                    warn!(error = %err, "local progress write failed");
                }
            }
            Identity::Account(account) => {
                let record = ProgressRecord::new(account.id, snapshot, self.clock.now());
                if let Err(err) = self.storage.remote.upsert(&record).await {
                    warn!(account = %account.id, error = %err, "remote progress write failed");
                }
            }
        }

        !was_completed
    }

    /// The current completed set, read-only.
    #[must_use]
    pub fn completed_ids(&self) -> &HashSet<ProblemId> {
        &self.completed
    }

    #[must_use]
    pub fn is_completed(&self, id: &ProblemId) -> bool {
        self.completed.contains(id)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// True only while initial resolution is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

fn sorted(ids: &HashSet<ProblemId>) -> Vec<ProblemId> {
    let mut out: Vec<ProblemId> = ids.iter().cloned().collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use storage::repository::{
        InMemoryLocalStore, InMemoryRemoteStore, LocalProgressStore, RemoteProgressStore,
    };
    use tracker_core::model::Account;
    use tracker_core::time::fixed_clock;
    use uuid::Uuid;

    fn id(value: &str) -> ProblemId {
        ProblemId::from(value)
    }

    fn account() -> Account {
        Account::new(AccountId::new(Uuid::nil()), "dev@example.com")
    }

    fn in_memory() -> (Storage, InMemoryLocalStore, InMemoryRemoteStore) {
        let local = InMemoryLocalStore::new();
        let remote = InMemoryRemoteStore::new();
        let storage = Storage {
            local: Arc::new(local.clone()),
            remote: Arc::new(remote.clone()),
        };
        (storage, local, remote)
    }

    #[tokio::test]
    async fn starts_loading_until_first_resolution() {
        let (storage, _, _) = in_memory();
        let mut service = ProgressService::new(fixed_clock(), storage);
        assert!(service.is_loading());

        service.identity_changed(Identity::Anonymous).await;
        assert!(!service.is_loading());
        assert!(service.completed_ids().is_empty());
    }

    #[tokio::test]
    async fn toggle_reports_completion_direction() {
        let (storage, _, _) = in_memory();
        let mut service = ProgressService::new(fixed_clock(), storage);
        service.identity_changed(Identity::Anonymous).await;

        assert!(service.toggle(&id("stack-0")).await);
        assert!(service.is_completed(&id("stack-0")));

        assert!(!service.toggle(&id("stack-0")).await);
        assert!(!service.is_completed(&id("stack-0")));
    }

    #[tokio::test]
    async fn toggle_twice_is_idempotent_on_membership() {
        let (storage, _, _) = in_memory();
        let mut service = ProgressService::new(fixed_clock(), storage);
        service.identity_changed(Identity::Anonymous).await;

        let before = service.completed_ids().clone();
        service.toggle(&id("heap-1")).await;
        service.toggle(&id("heap-1")).await;
        assert_eq!(service.completed_ids(), &before);
    }

    #[tokio::test]
    async fn anonymous_toggle_survives_fresh_resolution() {
        let (storage, _, _) = in_memory();
        let mut service = ProgressService::new(fixed_clock(), storage.clone());
        service.identity_changed(Identity::Anonymous).await;
        service.toggle(&id("x")).await;

        // Simulate a fresh session over the same device-local store.
        let mut reloaded = ProgressService::new(fixed_clock(), storage);
        reloaded.identity_changed(Identity::Anonymous).await;
        assert!(reloaded.is_completed(&id("x")));
    }

    #[tokio::test]
    async fn remote_fetch_failure_degrades_to_empty_set() {
        let (storage, local, remote) = in_memory();
        local.save(&[id("a")]).await.unwrap();
        remote.set_failing(true);

        let mut service = ProgressService::new(fixed_clock(), storage);
        service
            .identity_changed(Identity::Account(account()))
            .await;

        assert!(!service.is_loading());
        assert!(service.completed_ids().is_empty());
    }

    #[tokio::test]
    async fn empty_local_store_migrates_nothing() {
        let (storage, _, remote) = in_memory();
        let mut service = ProgressService::new(fixed_clock(), storage);
        service
            .identity_changed(Identity::Account(account()))
            .await;

        assert!(service.completed_ids().is_empty());
        assert!(remote.record(account().id).is_none());
    }

    #[tokio::test]
    async fn existing_empty_remote_record_is_not_a_migration_trigger() {
        let (storage, local, remote) = in_memory();
        local.save(&[id("a")]).await.unwrap();

        use tracker_core::time::fixed_now;
        remote
            .upsert(&ProgressRecord::new(account().id, vec![], fixed_now()))
            .await
            .unwrap();

        let mut service = ProgressService::new(fixed_clock(), storage);
        service
            .identity_changed(Identity::Account(account()))
            .await;

        // Found-but-empty wins over the local store.
        assert!(service.completed_ids().is_empty());
        assert!(remote.record(account().id).unwrap().completed_problems.is_empty());
    }
}
