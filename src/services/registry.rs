//! Equipment registry: CRUD, barcode lookup and glove pairing

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::snapshot::SnapshotHandle;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{Condition, EquipmentStatus},
        equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment},
        normalize_text,
        snapshot::Snapshot,
    },
    repository::RemoteStore,
};

#[derive(Clone)]
pub struct RegistryService {
    snapshot: SnapshotHandle,
}

impl RegistryService {
    pub fn new(snapshot: SnapshotHandle) -> Self {
        Self { snapshot }
    }

    /// Filter by status and free text (type label, barcode, assignee name)
    pub async fn list(&self, query: &EquipmentQuery) -> Vec<Equipment> {
        let snap = self.snapshot.read().await;
        let needle = query
            .search
            .as_deref()
            .map(|s| normalize_text(s.trim()))
            .filter(|s| !s.is_empty());

        snap.inventory
            .iter()
            .filter(|item| query.status.map_or(true, |s| item.status == s))
            .filter(|item| match &needle {
                Some(needle) => matches_search(&snap, item, needle),
                None => true,
            })
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Equipment> {
        self.snapshot
            .read()
            .await
            .equipment(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Exact barcode lookup, used by manual search and the scanner
    pub async fn find_by_barcode(&self, code: &str) -> AppResult<Equipment> {
        let code = code.trim();
        self.snapshot
            .read()
            .await
            .equipment_by_barcode(code)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No equipment with barcode {}", code)))
    }

    /// Register a new item, optionally paired with an existing glove
    pub async fn add(&self, data: CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        let _gate = self.snapshot.begin_mutation().await;

        let barcode = match data.barcode.as_deref() {
            Some(code) => required_barcode(code)?,
            None => generate_barcode("MAN"),
        };
        let pair_barcode = data
            .pair_barcode
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(pair) = pair_barcode {
            if !data.equipment_type.is_pairable() {
                return Err(AppError::Validation(format!(
                    "{} cannot be paired",
                    data.equipment_type
                )));
            }
            if pair == barcode {
                return Err(AppError::SelfPair);
            }
        }

        let store = self.snapshot.store().clone();
        if store.find_equipment_by_barcode(&barcode).await?.is_some() {
            return Err(AppError::DuplicateBarcode(barcode));
        }
        let partner = match pair_barcode {
            Some(code) => Some(self.pair_target(code).await?),
            None => None,
        };

        let now = Utc::now();
        let item = Equipment {
            id: Uuid::new_v4(),
            equipment_type: data.equipment_type,
            size: data.size.trim().to_string(),
            barcode,
            status: EquipmentStatus::Available,
            condition: data.condition.unwrap_or(Condition::New),
            assigned_to: None,
            pair_id: None,
            image_url: data.image_url,
            last_inspection: data.last_inspection,
            created_at: now,
            updated_at: now,
        };

        let known_good = self.snapshot.read().await.clone();

        let mut paired = item.clone();
        let linked = {
            let mut snap = self.snapshot.write().await;
            snap.put_equipment(item.clone());
            let linked = match &partner {
                Some(p) => plan_pairing(&snap, &mut paired, Some(p)),
                None => Vec::new(),
            };
            snap.put_equipment(paired.clone());
            for other in &linked {
                snap.put_equipment(other.clone());
            }
            linked
        };

        let mut saved = match store.insert_equipment(&item).await {
            Ok(saved) => saved,
            Err(e) => {
                self.snapshot.rollback(known_good, &e).await;
                return Err(e);
            }
        };

        if partner.is_some() {
            // Pairing is a second write, once the item exists
            match write_rows(store.as_ref(), &paired, &linked).await {
                Ok(row) => saved = row,
                Err(e) => {
                    let mut fallback = known_good;
                    fallback.put_equipment(saved.clone());
                    self.snapshot.rollback(fallback, &e).await;
                    return Err(AppError::PartialWrite {
                        equipment: saved.id,
                        persisted: format!("{} is registered but not paired", saved.barcode),
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.snapshot.write().await.put_equipment(saved.clone());
        tracing::info!(
            "Equipment {} ({}) added{}",
            saved.barcode,
            saved.equipment_type.as_str(),
            partner
                .as_ref()
                .map(|p| format!(", paired with {}", p.barcode))
                .unwrap_or_default()
        );
        Ok(saved)
    }

    /// Edit an item. `pair_barcode`: absent keeps the pairing, empty unpairs, a code re-pairs.
    pub async fn update(&self, id: Uuid, data: UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        let _gate = self.snapshot.begin_mutation().await;

        let current = self.get(id).await?;
        let mut item = current.clone();

        if let Some(t) = data.equipment_type {
            item.equipment_type = t;
        }
        if let Some(size) = data.size.as_deref() {
            item.size = size.trim().to_string();
        }
        if let Some(condition) = data.condition {
            item.condition = condition;
        }
        if data.image_url.is_some() {
            item.image_url = data.image_url.clone();
        }
        if data.last_inspection.is_some() {
            item.last_inspection = data.last_inspection;
        }
        if let Some(status) = data.status {
            if status == EquipmentStatus::Loaned && current.status != EquipmentStatus::Loaned {
                return Err(AppError::Validation(
                    "Use the loan action to hand out equipment".to_string(),
                ));
            }
            item.set_status(status);
        }

        let store = self.snapshot.store().clone();
        if let Some(code) = data.barcode.as_deref() {
            let code = required_barcode(code)?;
            if code != current.barcode {
                if let Some(other) = store.find_equipment_by_barcode(&code).await? {
                    if other.id != id {
                        return Err(AppError::DuplicateBarcode(code));
                    }
                }
            }
            item.barcode = code;
        }

        // None: pairing untouched. Some(None): unpair. Some(Some(p)): pair with p.
        let requested = data.pair_barcode.as_deref().map(str::trim);
        let pairing: Option<Option<Equipment>> = match requested {
            None if item.pair_id.is_some() && !item.equipment_type.is_pairable() => Some(None),
            None => None,
            Some("") => Some(None),
            Some(code) => {
                if !item.equipment_type.is_pairable() {
                    return Err(AppError::Validation(format!(
                        "{} cannot be paired",
                        item.equipment_type
                    )));
                }
                if code == item.barcode {
                    return Err(AppError::SelfPair);
                }
                let partner = self.pair_target(code).await?;
                if partner.id == item.id {
                    return Err(AppError::SelfPair);
                }
                Some(Some(partner))
            }
        };

        let known_good = self.snapshot.read().await.clone();

        let linked = {
            let mut snap = self.snapshot.write().await;
            let linked = match &pairing {
                Some(partner) => plan_pairing(&snap, &mut item, partner.as_ref()),
                None => Vec::new(),
            };
            snap.put_equipment(item.clone());
            for other in &linked {
                snap.put_equipment(other.clone());
            }
            linked
        };

        let saved = match store.update_equipment(&item).await {
            Ok(saved) => saved,
            Err(e) => {
                self.snapshot.rollback(known_good, &e).await;
                return Err(e);
            }
        };

        if let Some((first, rest)) = linked.split_first() {
            if let Err(e) = write_rows(store.as_ref(), first, rest).await {
                let mut fallback = known_good;
                fallback.put_equipment(saved.clone());
                self.snapshot.rollback(fallback, &e).await;
                return Err(AppError::PartialWrite {
                    equipment: saved.id,
                    persisted: format!("{} was saved but its pairing is incomplete", saved.barcode),
                    reason: e.to_string(),
                });
            }
        }

        self.snapshot.write().await.put_equipment(saved.clone());
        tracing::info!("Equipment {} updated", saved.barcode);
        Ok(saved)
    }

    /// Remove an item and release its partner. Ledger entries are kept.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let _gate = self.snapshot.begin_mutation().await;
        let known_good = self.snapshot.read().await.clone();

        let item = known_good
            .equipment(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        let partner = item
            .pair_id
            .and_then(|p| released(&known_good, p, item.id));

        {
            let mut snap = self.snapshot.write().await;
            snap.remove_equipment(id);
            if let Some(partner) = &partner {
                snap.put_equipment(partner.clone());
            }
        }

        let store = self.snapshot.store().clone();
        if let Err(e) = store.delete_equipment(id).await {
            self.snapshot.rollback(known_good, &e).await;
            return Err(e);
        }

        if let Some(partner) = &partner {
            if let Err(e) = store.update_equipment(partner).await {
                let mut fallback = known_good;
                fallback.remove_equipment(id);
                self.snapshot.rollback(fallback, &e).await;
                return Err(AppError::PartialWrite {
                    equipment: id,
                    persisted: format!(
                        "{} was deleted but {} still points to it",
                        item.barcode, partner.barcode
                    ),
                    reason: e.to_string(),
                });
            }
        }

        tracing::info!("Equipment {} deleted", item.barcode);
        Ok(())
    }

    /// Partner lookup against the system of record
    async fn pair_target(&self, code: &str) -> AppResult<Equipment> {
        let partner = self
            .snapshot
            .store()
            .find_equipment_by_barcode(code)
            .await?
            .ok_or_else(|| AppError::PairNotFound(code.to_string()))?;

        if !partner.equipment_type.is_pairable() {
            return Err(AppError::Validation(format!(
                "{} ({}) cannot be paired",
                partner.barcode, partner.equipment_type
            )));
        }
        Ok(partner)
    }
}

/// Rewrite `first`, then each of `rest`, stopping at the first failure
async fn write_rows(store: &dyn RemoteStore, first: &Equipment, rest: &[Equipment]) -> AppResult<Equipment> {
    let saved = store.update_equipment(first).await?;
    for other in rest {
        store.update_equipment(other).await?;
    }
    Ok(saved)
}

/// Point `item` at `partner` (or at nothing) and return the other rows that
/// must be rewritten to keep the relation symmetric: the old partner, the new
/// partner, and whoever the new partner was paired with before.
fn plan_pairing(snap: &Snapshot, item: &mut Equipment, partner: Option<&Equipment>) -> Vec<Equipment> {
    let new_id = partner.map(|p| p.id);
    if item.pair_id == new_id && partner.map_or(true, |p| p.pair_id == Some(item.id)) {
        return Vec::new();
    }

    let mut writes = Vec::new();
    if let Some(old) = item.pair_id.filter(|old| Some(*old) != new_id) {
        writes.extend(released(snap, old, item.id));
    }
    if let Some(p) = partner {
        if let Some(previous) = p.pair_id.filter(|prev| *prev != item.id) {
            writes.extend(released(snap, previous, p.id));
        }
        writes.push(Equipment {
            pair_id: Some(item.id),
            ..p.clone()
        });
    }

    item.pair_id = new_id;
    writes
}

/// `id` with its back-reference to `owner` cleared, if it still points there
fn released(snap: &Snapshot, id: Uuid, owner: Uuid) -> Option<Equipment> {
    snap.equipment(id)
        .filter(|o| o.pair_id == Some(owner))
        .map(|o| Equipment {
            pair_id: None,
            ..o.clone()
        })
}

fn matches_search(snap: &Snapshot, item: &Equipment, needle: &str) -> bool {
    normalize_text(item.equipment_type.label()).contains(needle)
        || normalize_text(&item.barcode).contains(needle)
        || item
            .assigned_to
            .and_then(|id| snap.user(id))
            .map_or(false, |u| normalize_text(&u.name).contains(needle))
}

fn required_barcode(code: &str) -> AppResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::Validation("Barcode cannot be empty".to_string()));
    }
    Ok(code.to_string())
}

/// `PREFIX-123456` from the clock, for items registered without a label
pub fn generate_barcode(prefix: &str) -> String {
    format!("{}-{:06}", prefix, Utc::now().timestamp_millis().rem_euclid(1_000_000))
}
