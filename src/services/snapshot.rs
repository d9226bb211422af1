//! Shared working snapshot and its reconciliation with the remote store

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    error::{AppError, AppResult},
    models::snapshot::Snapshot,
    repository::RemoteStore,
};

/// Handle on the snapshot every service reads and the mutating services write.
///
/// Mutations follow one discipline: take the mutation gate, keep a copy of
/// the snapshot, apply the change locally, write to the store, and on any
/// store failure resync everything from the store (or, if that fails too,
/// put the copy back).
#[derive(Clone)]
pub struct SnapshotHandle {
    store: Arc<dyn RemoteStore>,
    state: Arc<RwLock<Snapshot>>,
    gate: Arc<Mutex<()>>,
}

impl SnapshotHandle {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(Snapshot::default())),
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.state.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.state.write().await
    }

    /// Serialize writers for the whole optimistic window
    pub async fn begin_mutation(&self) -> OwnedMutexGuard<()> {
        self.gate.clone().lock_owned().await
    }

    /// Replace the snapshot with the store's current content
    pub async fn refresh(&self) -> AppResult<()> {
        let (users, inventory, transactions) = tokio::try_join!(
            self.store.fetch_profiles(),
            self.store.fetch_equipment(),
            self.store.fetch_transactions(),
        )?;

        tracing::debug!(
            "Snapshot refreshed: {} items, {} operators, {} transactions",
            inventory.len(),
            users.len(),
            transactions.len()
        );

        *self.state.write().await = Snapshot {
            inventory,
            users,
            transactions,
        };
        Ok(())
    }

    /// Reload only the directory
    pub async fn refresh_users(&self) -> AppResult<()> {
        let users = self.store.fetch_profiles().await?;
        self.state.write().await.users = users;
        Ok(())
    }

    /// Discard optimistic changes after a failed remote write
    pub async fn rollback(&self, known_good: Snapshot, cause: &AppError) {
        tracing::warn!("Rolling back local state after remote failure: {}", cause);
        if let Err(e) = self.refresh().await {
            tracing::error!("Resync failed ({}), restoring last known-good snapshot", e);
            *self.state.write().await = known_good;
        }
    }
}
