//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Condition, EquipmentStatus, EquipmentType};
use crate::error::AppError;

/// One physical PPE unit
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    pub equipment_type: EquipmentType,
    /// Free-form size label (L, XL, 43...)
    pub size: String,
    /// Scanned identifier, unique across the registry
    pub barcode: String,
    pub status: EquipmentStatus,
    pub condition: Condition,
    /// Operator holding the item; set iff status is `loaned`
    pub assigned_to: Option<Uuid>,
    /// Partner item (left/right glove)
    pub pair_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub last_inspection: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// Hand the item to an operator
    pub fn loan_to(&mut self, assignee: Uuid) {
        self.status = EquipmentStatus::Loaned;
        self.assigned_to = Some(assignee);
        self.updated_at = Utc::now();
    }

    /// Put the item back on the shelf
    pub fn mark_returned(&mut self) {
        self.status = EquipmentStatus::Available;
        self.assigned_to = None;
        self.updated_at = Utc::now();
    }

    /// Status change outside the loan flow. Any status but `loaned` releases the holder.
    pub fn set_status(&mut self, status: EquipmentStatus) {
        self.status = status;
        if status != EquipmentStatus::Loaned {
            self.assigned_to = None;
        }
    }

    /// `assigned_to` is present exactly when the item is loaned
    pub fn assignment_is_consistent(&self) -> bool {
        (self.status == EquipmentStatus::Loaned) == self.assigned_to.is_some()
    }
}

/// Equipment row as stored in the remote table
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentRow {
    pub id: Uuid,
    pub equipment_type: String,
    pub size: String,
    pub barcode: String,
    pub status: String,
    pub condition: String,
    pub assigned_to: Option<Uuid>,
    pub pair_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub last_inspection: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EquipmentRow> for Equipment {
    type Error = AppError;

    fn try_from(row: EquipmentRow) -> Result<Self, Self::Error> {
        let bad = |e: String| AppError::Internal(format!("equipment {}: {}", row.id, e));
        Ok(Equipment {
            equipment_type: row.equipment_type.parse().map_err(bad)?,
            status: row.status.parse().map_err(bad)?,
            condition: row.condition.parse().map_err(bad)?,
            id: row.id,
            size: row.size,
            barcode: row.barcode,
            assigned_to: row.assigned_to,
            pair_id: row.pair_id,
            image_url: row.image_url,
            last_inspection: row.last_inspection,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Create equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    pub equipment_type: EquipmentType,
    #[validate(length(min = 1, max = 16, message = "Size must be 1-16 characters"))]
    pub size: String,
    /// Leave empty to have one generated
    #[validate(length(min = 1, max = 64, message = "Barcode must be 1-64 characters"))]
    pub barcode: Option<String>,
    pub condition: Option<Condition>,
    pub image_url: Option<String>,
    pub last_inspection: Option<NaiveDate>,
    /// Barcode of the partner glove
    pub pair_barcode: Option<String>,
}

/// Update equipment request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    pub equipment_type: Option<EquipmentType>,
    #[validate(length(min = 1, max = 16, message = "Size must be 1-16 characters"))]
    pub size: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Barcode must be 1-64 characters"))]
    pub barcode: Option<String>,
    pub condition: Option<Condition>,
    pub status: Option<EquipmentStatus>,
    pub image_url: Option<String>,
    pub last_inspection: Option<NaiveDate>,
    /// Absent keeps the pairing, empty string unpairs, a barcode re-pairs
    pub pair_barcode: Option<String>,
}

/// Equipment list filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    /// Only items in this status
    pub status: Option<EquipmentStatus>,
    /// Matches type, barcode or assignee name, ignoring case and accents
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, assigned_to: Option<Uuid>) -> EquipmentRow {
        EquipmentRow {
            id: Uuid::new_v4(),
            equipment_type: "helmet".to_string(),
            size: "M".to_string(),
            barcode: "CAS-001".to_string(),
            status: status.to_string(),
            condition: "good".to_string(),
            assigned_to,
            pair_id: None,
            image_url: None,
            last_inspection: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let item = Equipment::try_from(row("available", None)).unwrap();
        assert_eq!(item.equipment_type, EquipmentType::Helmet);
        assert_eq!(item.status, EquipmentStatus::Available);
        assert_eq!(item.condition, Condition::Good);
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        assert!(Equipment::try_from(row("stolen", None)).is_err());
    }

    #[test]
    fn test_set_status_releases_holder() {
        let mut item = Equipment::try_from(row("available", None)).unwrap();
        item.loan_to(Uuid::new_v4());
        assert!(item.assignment_is_consistent());

        item.set_status(EquipmentStatus::Damaged);
        assert_eq!(item.assigned_to, None);
        assert!(item.assignment_is_consistent());
    }

    #[test]
    fn test_blank_size_fails_validation() {
        let data = CreateEquipment {
            equipment_type: EquipmentType::Boots,
            size: String::new(),
            barcode: None,
            condition: None,
            image_url: None,
            last_inspection: None,
            pair_barcode: None,
        };
        assert!(data.validate().is_err());
    }
}
