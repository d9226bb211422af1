//! Business logic services

pub mod directory;
pub mod ledger;
pub mod lifecycle;
pub mod registry;
pub mod snapshot;
pub mod vision;

use std::sync::Arc;

use crate::{error::AppResult, repository::RemoteStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub snapshot: snapshot::SnapshotHandle,
    pub directory: directory::DirectoryService,
    pub registry: registry::RegistryService,
    pub lifecycle: lifecycle::LifecycleService,
    pub ledger: ledger::LedgerService,
    /// Absent when no vision service is configured
    pub vision: Option<Arc<dyn vision::VisionClassifier>>,
    pub analyst: Option<Arc<dyn vision::StockAnalyst>>,
}

impl Services {
    /// Wire the services over one store and load the first snapshot
    pub async fn new(
        store: Arc<dyn RemoteStore>,
        recent_limit: usize,
        vision: Option<Arc<dyn vision::VisionClassifier>>,
        analyst: Option<Arc<dyn vision::StockAnalyst>>,
    ) -> AppResult<Self> {
        let snapshot = snapshot::SnapshotHandle::new(store);
        snapshot.refresh().await?;

        Ok(Self {
            directory: directory::DirectoryService::new(snapshot.clone()),
            registry: registry::RegistryService::new(snapshot.clone()),
            lifecycle: lifecycle::LifecycleService::new(snapshot.clone()),
            ledger: ledger::LedgerService::new(snapshot.clone(), recent_limit),
            snapshot,
            vision,
            analyst,
        })
    }
}
