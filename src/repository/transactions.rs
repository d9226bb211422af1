//! Ledger methods on Repository (insert and read only)

use super::Repository;
use crate::{
    error::AppResult,
    models::transaction::{Transaction, TransactionRow},
};

impl Repository {
    /// Whole ledger, newest first (latest insert first on equal timestamps)
    pub async fn transactions_list(&self) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions ORDER BY timestamp DESC, seq DESC"
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Append one transaction
    pub async fn transactions_create(&self, transaction: &Transaction) -> AppResult<Transaction> {
        let row = TransactionRow::from(transaction);
        let stored = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (id, equipment_id, user_id, kind, reason, note, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(row.equipment_id)
        .bind(row.user_id)
        .bind(&row.kind)
        .bind(&row.reason)
        .bind(&row.note)
        .bind(row.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Transaction::try_from(stored)
    }
}
