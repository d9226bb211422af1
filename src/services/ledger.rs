//! Transaction ledger queries and dashboard figures

use serde_json::json;
use uuid::Uuid;

use super::{snapshot::SnapshotHandle, vision::StockAnalyst};
use crate::{
    error::AppResult,
    models::{
        enums::{EquipmentStatus, EquipmentType},
        stats::{StockInsight, StockStats, TypeCount},
        transaction::Transaction,
    },
};

#[derive(Clone)]
pub struct LedgerService {
    snapshot: SnapshotHandle,
    default_limit: usize,
}

impl LedgerService {
    pub fn new(snapshot: SnapshotHandle, default_limit: usize) -> Self {
        Self {
            snapshot,
            default_limit,
        }
    }

    /// Every entry for one item, newest first. The item may no longer exist.
    pub async fn history_for(&self, equipment_id: Uuid) -> Vec<Transaction> {
        self.snapshot
            .read()
            .await
            .transactions
            .iter()
            .filter(|t| t.equipment_id == equipment_id)
            .cloned()
            .collect()
    }

    /// Latest entries across the whole registry
    pub async fn recent(&self, limit: Option<usize>) -> Vec<Transaction> {
        let limit = limit.unwrap_or(self.default_limit);
        self.snapshot
            .read()
            .await
            .transactions
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn status_counts(&self) -> StockStats {
        let snap = self.snapshot.read().await;
        let mut stats = StockStats {
            by_type: EquipmentType::ALL
                .iter()
                .map(|t| (t.as_str().to_string(), TypeCount::default()))
                .collect(),
            ..StockStats::default()
        };

        for item in &snap.inventory {
            stats.total += 1;
            match item.status {
                EquipmentStatus::Available => stats.available += 1,
                EquipmentStatus::Loaned => stats.loaned += 1,
                EquipmentStatus::Damaged => stats.damaged += 1,
                EquipmentStatus::Maintenance => stats.maintenance += 1,
            }
            let entry = stats
                .by_type
                .entry(item.equipment_type.as_str().to_string())
                .or_default();
            entry.total += 1;
            if item.status == EquipmentStatus::Available {
                entry.available += 1;
            }
        }
        stats
    }

    /// Compact `[{t, s, c}]` view of the registry handed to the analyst
    pub async fn inventory_digest(&self) -> String {
        let snap = self.snapshot.read().await;
        let rows: Vec<_> = snap
            .inventory
            .iter()
            .map(|e| {
                json!({
                    "t": e.equipment_type.label(),
                    "s": e.status.label(),
                    "c": e.condition.label(),
                })
            })
            .collect();
        serde_json::Value::Array(rows).to_string()
    }

    pub async fn insight(&self, analyst: &dyn StockAnalyst) -> AppResult<StockInsight> {
        let digest = self.inventory_digest().await;
        let text = analyst.analyze(&digest).await?;
        Ok(StockInsight { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::enums::LoanReason,
        repository::{MemoryStore, RemoteStore},
    };
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::{Arc, Mutex};

    async fn ledger_over(store: Arc<MemoryStore>) -> LedgerService {
        let snapshot = SnapshotHandle::new(store);
        snapshot.refresh().await.unwrap();
        LedgerService::new(snapshot, 5)
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_survives_deletion() {
        let store = Arc::new(MemoryStore::new());
        let gone = Uuid::new_v4();
        let user = Uuid::new_v4();
        let t0 = Utc::now() - Duration::hours(2);
        let out = Transaction::checkout(gone, user, LoanReason::Intervention, None, t0);
        let back = Transaction::checkin(gone, user, None, t0 + Duration::hours(1));
        let other = Transaction::checkin(Uuid::new_v4(), user, None, t0);
        for t in [&out, &back, &other] {
            store.insert_transaction(t).await.unwrap();
        }

        let ledger = ledger_over(store).await;
        let ids: Vec<Uuid> = ledger.history_for(gone).await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![back.id, out.id]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_list_latest_insert_first() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let first = Transaction::checkout(Uuid::new_v4(), Uuid::new_v4(), LoanReason::Other, None, now);
        let second = Transaction::checkout(Uuid::new_v4(), Uuid::new_v4(), LoanReason::Other, None, now);
        store.insert_transaction(&first).await.unwrap();
        store.insert_transaction(&second).await.unwrap();

        let recent = ledger_over(store).await.recent(None).await;
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].id, first.id);
    }

    #[tokio::test]
    async fn test_recent_is_truncated() {
        let store = Arc::new(MemoryStore::new());
        let start = Utc::now() - Duration::days(1);
        for n in 0..8 {
            let t = Transaction::checkin(Uuid::new_v4(), Uuid::new_v4(), None, start + Duration::minutes(n));
            store.insert_transaction(&t).await.unwrap();
        }

        let ledger = ledger_over(store).await;
        assert_eq!(ledger.recent(None).await.len(), 5);
        assert_eq!(ledger.recent(Some(2)).await.len(), 2);
        assert_eq!(ledger.recent(Some(50)).await.len(), 8);
    }

    #[tokio::test]
    async fn test_status_counts_on_demo_station() {
        let stats = ledger_over(Arc::new(MemoryStore::demo())).await.status_counts().await;
        assert_eq!(stats.total, 7);
        assert_eq!(stats.loaned, 1);
        assert_eq!(stats.damaged, 1);
        assert_eq!(stats.available, 5);
        assert_eq!(stats.maintenance, 0);
        assert_eq!(stats.by_type["gloves"], TypeCount { total: 3, available: 2 });
        assert_eq!(stats.by_type.len(), EquipmentType::ALL.len());
    }

    struct EchoAnalyst {
        seen: Mutex<Option<String>>,
    }

    #[async_trait]
    impl StockAnalyst for EchoAnalyst {
        async fn analyze(&self, inventory_json: &str) -> AppResult<String> {
            *self.seen.lock().unwrap() = Some(inventory_json.to_string());
            Ok("Stock correct.".to_string())
        }
    }

    struct DownAnalyst;

    #[async_trait]
    impl StockAnalyst for DownAnalyst {
        async fn analyze(&self, _: &str) -> AppResult<String> {
            Err(AppError::Vision("HTTP 503".to_string()))
        }
    }

    #[tokio::test]
    async fn test_insight_gets_compact_digest() {
        let ledger = ledger_over(Arc::new(MemoryStore::demo())).await;
        let analyst = EchoAnalyst { seen: Mutex::new(None) };

        let insight = ledger.insight(&analyst).await.unwrap();
        assert_eq!(insight.text, "Stock correct.");

        let seen = analyst.seen.lock().unwrap().clone().unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&seen).unwrap();
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().any(|r| r["t"] == "Veste textile" && r["s"] == "Sorti"));
        assert_eq!(rows[0].as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_insight_failure_is_reported() {
        let ledger = ledger_over(Arc::new(MemoryStore::demo())).await;
        assert!(matches!(ledger.insight(&DownAnalyst).await, Err(AppError::Vision(_))));
    }
}
