//! Ledger transaction model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{enums::LoanReason, equipment::Equipment};
use crate::error::AppError;

/// One immutable loan (OUT) or return (IN) event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub equipment_id: Uuid,
    /// Assignee for OUT, previous holder for IN
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

/// Event-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum TransactionKind {
    #[serde(rename = "OUT")]
    Out {
        #[schema(value_type = String, example = "intervention")]
        reason: LoanReason,
        note: Option<String>,
    },
    #[serde(rename = "IN")]
    In { note: Option<String> },
}

impl Transaction {
    /// Check-out record
    pub fn checkout(
        equipment_id: Uuid,
        assignee: Uuid,
        reason: LoanReason,
        note: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment_id,
            user_id: assignee,
            timestamp,
            kind: TransactionKind::Out {
                reason,
                note: clean_note(note),
            },
        }
    }

    /// Check-in record
    pub fn checkin(
        equipment_id: Uuid,
        holder: Uuid,
        note: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment_id,
            user_id: holder,
            timestamp,
            kind: TransactionKind::In {
                note: clean_note(note),
            },
        }
    }

    pub fn is_checkout(&self) -> bool {
        matches!(self.kind, TransactionKind::Out { .. })
    }

    pub fn note(&self) -> Option<&str> {
        match &self.kind {
            TransactionKind::Out { note, .. } | TransactionKind::In { note } => note.as_deref(),
        }
    }

    pub fn reason(&self) -> Option<&LoanReason> {
        match &self.kind {
            TransactionKind::Out { reason, .. } => Some(reason),
            TransactionKind::In { .. } => None,
        }
    }
}

/// Blank notes are not worth keeping
fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Loan request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct LoanRequest {
    /// Defaults to the acting operator; only admins may name someone else
    pub assignee_id: Option<Uuid>,
    /// Category slug or label (`intervention`, `Entraînement`...) or free text
    #[serde(default)]
    #[schema(value_type = String, example = "intervention")]
    pub reason: LoanReason,
    #[validate(length(max = 500, message = "Note is limited to 500 characters"))]
    pub note: Option<String>,
    /// Also hand out the paired glove
    #[serde(default)]
    pub include_pair: bool,
}

/// Return request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReturnRequest {
    #[validate(length(max = 500, message = "Note is limited to 500 characters"))]
    pub note: Option<String>,
    /// Also take back the paired glove
    #[serde(default)]
    pub include_pair: bool,
}

/// Result of a loan or return, with the cascaded partner if there was one
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionOutcome {
    pub equipment: Equipment,
    pub transaction: Transaction,
    pub partner: Option<Equipment>,
    pub partner_transaction: Option<Transaction>,
}

/// Flat transaction row as stored in the remote table
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "OUT" => TransactionKind::Out {
                reason: row.reason.as_deref().map(LoanReason::from).unwrap_or(LoanReason::Other),
                note: row.note,
            },
            "IN" => TransactionKind::In { note: row.note },
            other => {
                return Err(AppError::Internal(format!(
                    "transaction {} has unknown type {}",
                    row.id, other
                )))
            }
        };

        Ok(Transaction {
            id: row.id,
            equipment_id: row.equipment_id,
            user_id: row.user_id,
            timestamp: row.timestamp,
            kind,
        })
    }
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        let (kind, reason) = match &t.kind {
            TransactionKind::Out { reason, .. } => ("OUT", Some(reason.as_str().to_string())),
            TransactionKind::In { .. } => ("IN", None),
        };
        TransactionRow {
            id: t.id,
            equipment_id: t.equipment_id,
            user_id: t.user_id,
            kind: kind.to_string(),
            reason,
            note: t.note().map(String::from),
            timestamp: t.timestamp,
        }
    }
}
