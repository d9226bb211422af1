//! Loan and return flow, with the glove pair cascade

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::snapshot::SnapshotHandle;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentStatus, LifecycleAction},
        equipment::Equipment,
        snapshot::Snapshot,
        transaction::{LoanRequest, ReturnRequest, Transaction, TransitionOutcome},
        user::User,
    },
};

/// One item's planned transition: the row to write, then its ledger entry
type Step = (Equipment, Transaction);

#[derive(Clone)]
pub struct LifecycleService {
    snapshot: SnapshotHandle,
}

impl LifecycleService {
    pub fn new(snapshot: SnapshotHandle) -> Self {
        Self { snapshot }
    }

    /// Hand an available item to an operator
    pub async fn request_loan(
        &self,
        actor: &User,
        id: Uuid,
        request: LoanRequest,
    ) -> AppResult<TransitionOutcome> {
        request.validate()?;

        let _gate = self.snapshot.begin_mutation().await;
        let known_good = self.snapshot.read().await.clone();

        let item = find(&known_good, id)?;
        if !item.status.is_loanable() {
            tracing::warn!("Loan refused: {} is {}", item.barcode, item.status.as_str());
            return Err(invalid(item, LifecycleAction::Loan));
        }

        let assignee = request.assignee_id.unwrap_or(actor.id);
        if assignee != actor.id && !actor.is_admin() {
            tracing::warn!(
                "Operator {} tried to assign {} to someone else",
                actor.id,
                item.barcode
            );
            return Err(AppError::Authorization(
                "Only an administrator can assign equipment to another operator".to_string(),
            ));
        }
        if known_good.user(assignee).is_none() {
            return Err(AppError::Validation(format!("Unknown operator {}", assignee)));
        }

        let now = Utc::now();
        let loan = |source: &Equipment| -> Step {
            let mut row = source.clone();
            row.loan_to(assignee);
            let tx = Transaction::checkout(
                row.id,
                assignee,
                request.reason.clone(),
                request.note.clone(),
                now,
            );
            (row, tx)
        };

        let primary = loan(item);
        let partner = request
            .include_pair
            .then(|| eligible_partner(&known_good, item, LifecycleAction::Loan))
            .flatten()
            .map(loan);

        self.apply(known_good, primary, partner).await
    }

    /// Take a loaned item back. Anyone may record a return.
    pub async fn request_return(
        &self,
        actor: &User,
        id: Uuid,
        request: ReturnRequest,
    ) -> AppResult<TransitionOutcome> {
        request.validate()?;

        let _gate = self.snapshot.begin_mutation().await;
        let known_good = self.snapshot.read().await.clone();

        let item = find(&known_good, id)?;
        if item.status != EquipmentStatus::Loaned {
            tracing::warn!("Return refused: {} is {}", item.barcode, item.status.as_str());
            return Err(invalid(item, LifecycleAction::Return));
        }

        let now = Utc::now();
        let give_back = |source: &Equipment| -> AppResult<Step> {
            let holder = source.assigned_to.ok_or_else(|| {
                AppError::Internal(format!("{} is loaned without a holder", source.barcode))
            })?;
            let mut row = source.clone();
            row.mark_returned();
            let tx = Transaction::checkin(row.id, holder, request.note.clone(), now);
            Ok((row, tx))
        };

        let primary = give_back(item)?;
        let partner = request
            .include_pair
            .then(|| eligible_partner(&known_good, item, LifecycleAction::Return))
            .flatten()
            .map(give_back)
            .transpose()?;

        tracing::debug!("Return of {} recorded by {}", item.barcode, actor.id);
        self.apply(known_good, primary, partner).await
    }

    /// Partner the cascade would carry along, so the caller can ask once
    pub async fn pair_offer(&self, id: Uuid, action: LifecycleAction) -> AppResult<Option<Equipment>> {
        let snap = self.snapshot.read().await;
        let item = find(&snap, id)?;
        Ok(eligible_partner(&snap, item, action).cloned())
    }

    /// Apply both steps locally, then write them to the store one item at a time
    async fn apply(
        &self,
        known_good: Snapshot,
        primary: Step,
        partner: Option<Step>,
    ) -> AppResult<TransitionOutcome> {
        {
            let mut snap = self.snapshot.write().await;
            for (row, tx) in std::iter::once(&primary).chain(partner.as_ref()) {
                snap.put_equipment(row.clone());
                snap.record(tx.clone());
            }
        }

        let (equipment, transaction) = match self.commit(&primary).await {
            Ok(saved) => saved,
            Err(e) => {
                self.snapshot.rollback(known_good, &e).await;
                return Err(e);
            }
        };
        self.snapshot.write().await.put_equipment(equipment.clone());
        tracing::info!(
            "{} {} for operator {}",
            if transaction.is_checkout() { "Loaned" } else { "Returned" },
            equipment.barcode,
            transaction.user_id
        );

        let (partner, partner_transaction) = match partner {
            None => (None, None),
            Some(step) => match self.commit(&step).await {
                Ok((row, tx)) => {
                    self.snapshot.write().await.put_equipment(row.clone());
                    tracing::info!("Cascaded to paired item {}", row.barcode);
                    (Some(row), Some(tx))
                }
                Err(e) => {
                    // The primary transition is real; keep it if the resync fails
                    let mut fallback = known_good;
                    fallback.put_equipment(equipment.clone());
                    fallback.record(transaction.clone());
                    self.snapshot.rollback(fallback, &e).await;
                    tracing::error!(
                        "Pair cascade failed on {} after {} succeeded: {}",
                        step.0.barcode,
                        equipment.barcode,
                        e
                    );
                    return Err(AppError::PartialCascade {
                        completed: transaction.id,
                        failed_equipment: step.0.id,
                        reason: e.to_string(),
                    });
                }
            },
        };

        Ok(TransitionOutcome {
            equipment,
            transaction,
            partner,
            partner_transaction,
        })
    }

    /// Equipment row first, ledger entry second
    async fn commit(&self, (row, tx): &Step) -> AppResult<Step> {
        let store = self.snapshot.store();
        let saved = store.update_equipment(row).await?;
        let recorded = store.insert_transaction(tx).await?;
        Ok((saved, recorded))
    }
}

fn find(snap: &Snapshot, id: Uuid) -> AppResult<&Equipment> {
    snap.equipment(id)
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
}

fn invalid(item: &Equipment, action: LifecycleAction) -> AppError {
    AppError::InvalidTransition {
        barcode: item.barcode.clone(),
        status: item.status,
        action,
    }
}

/// The paired item, when it can follow `item` through `action`
fn eligible_partner<'a>(
    snap: &'a Snapshot,
    item: &Equipment,
    action: LifecycleAction,
) -> Option<&'a Equipment> {
    let partner = snap
        .equipment(item.pair_id?)
        .filter(|p| p.pair_id == Some(item.id))?;

    let eligible = match action {
        LifecycleAction::Loan => partner.status.is_loanable(),
        LifecycleAction::Return => {
            partner.status == EquipmentStatus::Loaned && partner.assigned_to == item.assigned_to
        }
    };
    eligible.then_some(partner)
}
