//! In-memory working set mirrored from the remote store

use serde::Serialize;
use uuid::Uuid;

use super::{equipment::Equipment, transaction::Transaction, user::User};

/// Inventory, roster and ledger as last seen (plus any in-flight optimistic change)
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub inventory: Vec<Equipment>,
    pub users: Vec<User>,
    /// Newest first
    pub transactions: Vec<Transaction>,
}

impl Snapshot {
    pub fn equipment(&self, id: Uuid) -> Option<&Equipment> {
        self.inventory.iter().find(|e| e.id == id)
    }

    pub fn equipment_by_barcode(&self, barcode: &str) -> Option<&Equipment> {
        self.inventory.iter().find(|e| e.barcode == barcode)
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Insert or replace an item by id
    pub fn put_equipment(&mut self, item: Equipment) {
        match self.inventory.iter_mut().find(|e| e.id == item.id) {
            Some(existing) => *existing = item,
            None => self.inventory.push(item),
        }
    }

    pub fn remove_equipment(&mut self, id: Uuid) -> Option<Equipment> {
        let pos = self.inventory.iter().position(|e| e.id == id)?;
        Some(self.inventory.remove(pos))
    }

    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
    }
}
