//! In-process store: the same contract as the PostgreSQL tables, kept in memory

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RemoteStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{Condition, EquipmentStatus, EquipmentType, LoanReason, Role},
        equipment::Equipment,
        transaction::Transaction,
        user::User,
    },
};

#[derive(Default)]
struct Tables {
    profiles: Vec<User>,
    equipment: Vec<Equipment>,
    /// Append order
    transactions: Vec<Transaction>,
}

/// Memory-backed [`RemoteStore`]
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a pre-filled directory
    pub fn with_profiles(profiles: Vec<User>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                profiles,
                ..Tables::default()
            }),
        }
    }

    /// Small station used by the `memory` backend
    pub fn demo() -> Self {
        let dupont = demo_user(1, "DUPONT Jean", "Sergent", Role::Operator, "SP-2934");
        let martin = demo_user(2, "MARTIN Paul", "Caporal", Role::Operator, "SP-1102");
        let leroy = demo_user(3, "LEROY Lucas", "Sapeur", Role::Operator, "SP-4455");
        let chef = demo_user(4, "BERNARD Sophie", "Adjudant-chef", Role::Admin, "SP-0001");

        let mut jacket = demo_item(EquipmentType::Jacket, "L", "VES-042", Condition::Worn);
        jacket.loan_to(dupont.id);
        let mut damaged = demo_item(EquipmentType::Gloves, "9", "GAN-007", Condition::Critical);
        damaged.set_status(EquipmentStatus::Damaged);
        let mut left = demo_item(EquipmentType::Gloves, "9", "2024GCG000494", Condition::New);
        let mut right = demo_item(EquipmentType::Gloves, "9", "2024GCD000494", Condition::New);
        left.pair_id = Some(right.id);
        right.pair_id = Some(left.id);

        let jacket_out = Transaction::checkout(
            jacket.id,
            dupont.id,
            LoanReason::Intervention,
            None,
            Utc::now() - Duration::hours(3),
        );

        let equipment = vec![
            demo_item(EquipmentType::Helmet, "M", "CAS-001", Condition::Good),
            jacket,
            demo_item(EquipmentType::Boots, "43", "BOT-101", Condition::New),
            damaged,
            demo_item(EquipmentType::Helmet, "L", "CAS-005", Condition::New),
            left,
            right,
        ];

        Self {
            tables: RwLock::new(Tables {
                profiles: vec![dupont, martin, leroy, chef],
                equipment,
                transactions: vec![jacket_out],
            }),
        }
    }

    /// Add or replace a directory entry
    pub async fn put_profile(&self, user: User) {
        let mut tables = self.tables.write().await;
        tables.profiles.retain(|u| u.id != user.id);
        tables.profiles.push(user);
    }
}

fn demo_user(n: u128, name: &str, rank: &str, role: Role, matricule: &str) -> User {
    User {
        id: Uuid::from_u128(0x0f1e_5700_0000_0000_0000_0000_0000_0000 + n),
        name: name.to_string(),
        rank: rank.to_string(),
        role,
        email: None,
        matricule: Some(matricule.to_string()),
        caserne: Some("CIS Principal".to_string()),
    }
}

fn demo_item(equipment_type: EquipmentType, size: &str, barcode: &str, condition: Condition) -> Equipment {
    let now = Utc::now();
    Equipment {
        id: Uuid::new_v4(),
        equipment_type,
        size: size.to_string(),
        barcode: barcode.to_string(),
        status: EquipmentStatus::Available,
        condition,
        assigned_to: None,
        pair_id: None,
        image_url: None,
        last_inspection: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_profiles(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.profiles.clone())
    }

    async fn fetch_equipment(&self) -> AppResult<Vec<Equipment>> {
        Ok(self.tables.read().await.equipment.clone())
    }

    async fn find_equipment_by_barcode(&self, barcode: &str) -> AppResult<Option<Equipment>> {
        let tables = self.tables.read().await;
        Ok(tables.equipment.iter().find(|e| e.barcode == barcode).cloned())
    }

    async fn insert_equipment(&self, item: &Equipment) -> AppResult<Equipment> {
        let mut tables = self.tables.write().await;
        if tables.equipment.iter().any(|e| e.barcode == item.barcode) {
            return Err(AppError::DuplicateBarcode(item.barcode.clone()));
        }
        if tables.equipment.iter().any(|e| e.id == item.id) {
            return Err(AppError::RemoteIo(format!("Equipment {} already exists", item.id)));
        }
        tables.equipment.push(item.clone());
        Ok(item.clone())
    }

    async fn update_equipment(&self, item: &Equipment) -> AppResult<Equipment> {
        let mut tables = self.tables.write().await;
        if tables
            .equipment
            .iter()
            .any(|e| e.barcode == item.barcode && e.id != item.id)
        {
            return Err(AppError::DuplicateBarcode(item.barcode.clone()));
        }
        let row = tables
            .equipment
            .iter_mut()
            .find(|e| e.id == item.id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", item.id)))?;
        *row = Equipment {
            updated_at: Utc::now(),
            ..item.clone()
        };
        Ok(row.clone())
    }

    async fn delete_equipment(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.equipment.len();
        tables.equipment.retain(|e| e.id != id);
        if tables.equipment.len() == before {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    async fn fetch_transactions(&self) -> AppResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Transaction> = tables.transactions.iter().rev().cloned().collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> AppResult<Transaction> {
        let mut tables = self.tables.write().await;
        if tables.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(AppError::RemoteIo(format!(
                "Transaction {} already exists",
                transaction.id
            )));
        }
        tables.transactions.push(transaction.clone());
        Ok(transaction.clone())
    }
}
