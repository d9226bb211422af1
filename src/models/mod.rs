//! Data models for FireStock

pub mod classification;
pub mod enums;
pub mod equipment;
pub mod snapshot;
pub mod stats;
pub mod transaction;
pub mod user;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

// Re-export commonly used types
pub use classification::Classification;
pub use enums::{Condition, EquipmentStatus, EquipmentType, LifecycleAction, LoanReason, Role};
pub use equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment};
pub use snapshot::Snapshot;
pub use stats::{StockInsight, StockStats, TypeCount};
pub use transaction::{LoanRequest, ReturnRequest, Transaction, TransactionKind, TransitionOutcome};
pub use user::{User, UserClaims};

/// Lowercase and strip accents, so "Usé" and "USE" compare equal
pub fn normalize_text(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Usé"), "use");
        assert_eq!(normalize_text("DUPONT Éric"), "dupont eric");
        assert_eq!(normalize_text("CAS-001"), "cas-001");
    }
}
