//! Equipment domain methods on Repository

use chrono::Utc;
use uuid::Uuid;

use super::{map_barcode_conflict, Repository};
use crate::{
    error::{AppError, AppResult},
    models::equipment::{Equipment, EquipmentRow},
};

impl Repository {
    /// List all equipment
    pub async fn equipment_list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>(
            "SELECT * FROM equipment ORDER BY equipment_type, barcode"
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Equipment::try_from).collect()
    }

    /// Get equipment by exact barcode
    pub async fn equipment_find_by_barcode(&self, barcode: &str) -> AppResult<Option<Equipment>> {
        sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE barcode = $1")
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?
            .map(Equipment::try_from)
            .transpose()
    }

    /// Create equipment
    pub async fn equipment_create(&self, item: &Equipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, EquipmentRow>(
            r#"
            INSERT INTO equipment (
                id, equipment_type, size, barcode, status, condition,
                assigned_to, pair_id, image_url, last_inspection, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.equipment_type.as_str())
        .bind(&item.size)
        .bind(&item.barcode)
        .bind(item.status.as_str())
        .bind(item.condition.as_str())
        .bind(item.assigned_to)
        .bind(item.pair_id)
        .bind(&item.image_url)
        .bind(item.last_inspection)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_barcode_conflict(e, &item.barcode))?;

        Equipment::try_from(row)
    }

    /// Update equipment (whole row, last write wins)
    pub async fn equipment_update(&self, item: &Equipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, EquipmentRow>(
            r#"
            UPDATE equipment SET
                equipment_type = $2, size = $3, barcode = $4, status = $5, condition = $6,
                assigned_to = $7, pair_id = $8, image_url = $9, last_inspection = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.equipment_type.as_str())
        .bind(&item.size)
        .bind(&item.barcode)
        .bind(item.status.as_str())
        .bind(item.condition.as_str())
        .bind(item.assigned_to)
        .bind(item.pair_id)
        .bind(&item.image_url)
        .bind(item.last_inspection)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_barcode_conflict(e, &item.barcode))?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", item.id)))?;

        Equipment::try_from(row)
    }

    /// Delete equipment. Transactions referencing it are kept.
    pub async fn equipment_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }
}
