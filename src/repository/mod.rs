//! Repository layer: access to the remote system of record
//!
//! The lifecycle core only talks to [`RemoteStore`]. [`Repository`] is the
//! PostgreSQL-backed implementation; [`memory::MemoryStore`] keeps rows in
//! process for tests and the demo backend.

pub mod equipment;
pub mod memory;
pub mod profiles;
pub mod transactions;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{equipment::Equipment, transaction::Transaction, user::User},
};

pub use memory::MemoryStore;

/// Remote tables the core reads and writes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Cheap connectivity probe
    async fn ping(&self) -> AppResult<()>;

    /// All operator profiles
    async fn fetch_profiles(&self) -> AppResult<Vec<User>>;

    /// All equipment rows
    async fn fetch_equipment(&self) -> AppResult<Vec<Equipment>>;

    async fn find_equipment_by_barcode(&self, barcode: &str) -> AppResult<Option<Equipment>>;

    /// Insert a new row. Fails with `DuplicateBarcode` on the unique constraint.
    async fn insert_equipment(&self, item: &Equipment) -> AppResult<Equipment>;

    /// Replace the row with the same id
    async fn update_equipment(&self, item: &Equipment) -> AppResult<Equipment>;

    async fn delete_equipment(&self, id: Uuid) -> AppResult<()>;

    /// Whole ledger, newest first
    async fn fetch_transactions(&self) -> AppResult<Vec<Transaction>>;

    async fn insert_transaction(&self, transaction: &Transaction) -> AppResult<Transaction>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RemoteStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch_profiles(&self) -> AppResult<Vec<User>> {
        self.profiles_list().await
    }

    async fn fetch_equipment(&self) -> AppResult<Vec<Equipment>> {
        self.equipment_list().await
    }

    async fn find_equipment_by_barcode(&self, barcode: &str) -> AppResult<Option<Equipment>> {
        self.equipment_find_by_barcode(barcode).await
    }

    async fn insert_equipment(&self, item: &Equipment) -> AppResult<Equipment> {
        self.equipment_create(item).await
    }

    async fn update_equipment(&self, item: &Equipment) -> AppResult<Equipment> {
        self.equipment_update(item).await
    }

    async fn delete_equipment(&self, id: Uuid) -> AppResult<()> {
        self.equipment_delete(id).await
    }

    async fn fetch_transactions(&self) -> AppResult<Vec<Transaction>> {
        self.transactions_list().await
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> AppResult<Transaction> {
        self.transactions_create(transaction).await
    }
}

/// Turn a unique-constraint violation on the barcode into a user-facing conflict
pub(crate) fn map_barcode_conflict(err: sqlx::Error, barcode: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::DuplicateBarcode(barcode.to_string())
        }
        _ => AppError::Database(err),
    }
}
