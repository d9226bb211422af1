//! Shared domain enums
//!
//! Every enum serializes as a stable lowercase slug (what the API and the
//! store exchange) and displays as the label used on the station floor.
//! Parsing accepts either form, ignoring case and accents, plus the labels
//! used by earlier releases of the mobile app.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::normalize_text;

// ---------------------------------------------------------------------------
// EquipmentType
// ---------------------------------------------------------------------------

/// Kind of PPE unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Helmet,
    Jacket,
    Trousers,
    Boots,
    Gloves,
    Bag,
    Belt,
    Hood,
}

impl EquipmentType {
    pub const ALL: [EquipmentType; 8] = [
        EquipmentType::Helmet,
        EquipmentType::Jacket,
        EquipmentType::Trousers,
        EquipmentType::Boots,
        EquipmentType::Gloves,
        EquipmentType::Bag,
        EquipmentType::Belt,
        EquipmentType::Hood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::Helmet => "helmet",
            EquipmentType::Jacket => "jacket",
            EquipmentType::Trousers => "trousers",
            EquipmentType::Boots => "boots",
            EquipmentType::Gloves => "gloves",
            EquipmentType::Bag => "bag",
            EquipmentType::Belt => "belt",
            EquipmentType::Hood => "hood",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentType::Helmet => "Casque F1",
            EquipmentType::Jacket => "Veste textile",
            EquipmentType::Trousers => "Pantalon textile",
            EquipmentType::Boots => "Bottes",
            EquipmentType::Gloves => "Gants",
            EquipmentType::Bag => "Sac de transport",
            EquipmentType::Belt => "Ceinturon",
            EquipmentType::Hood => "Cagoule",
        }
    }

    /// Only gloves come in left/right pairs
    pub fn is_pairable(&self) -> bool {
        matches!(self, EquipmentType::Gloves)
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for EquipmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = normalize_text(s.trim());
        if let Some(t) = EquipmentType::ALL
            .into_iter()
            .find(|t| t.as_str() == folded || normalize_text(t.label()) == folded)
        {
            return Ok(t);
        }
        match folded.as_str() {
            "veste de feu" => Ok(EquipmentType::Jacket),
            "surpantalon" => Ok(EquipmentType::Trousers),
            "rangers" => Ok(EquipmentType::Boots),
            "gants d'attaque" => Ok(EquipmentType::Gloves),
            _ => Err(format!("Invalid equipment type: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a PPE unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Available,
    Loaned,
    Damaged,
    Maintenance,
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 4] = [
        EquipmentStatus::Available,
        EquipmentStatus::Loaned,
        EquipmentStatus::Damaged,
        EquipmentStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::Loaned => "loaned",
            EquipmentStatus::Damaged => "damaged",
            EquipmentStatus::Maintenance => "maintenance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "Disponible",
            EquipmentStatus::Loaned => "Sorti",
            EquipmentStatus::Damaged => "Inutilisable",
            EquipmentStatus::Maintenance => "En maintenance",
        }
    }

    /// Maintenance counts as out of service for loans
    pub fn is_loanable(&self) -> bool {
        matches!(self, EquipmentStatus::Available)
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = normalize_text(s.trim());
        if let Some(st) = EquipmentStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == folded || normalize_text(st.label()) == folded)
        {
            return Ok(st);
        }
        match folded.as_str() {
            "emprunte" => Ok(EquipmentStatus::Loaned),
            "hors service" => Ok(EquipmentStatus::Damaged),
            _ => Err(format!("Invalid equipment status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Coarse wear rating, independent of the status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    Good,
    Worn,
    Critical,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::New,
        Condition::Good,
        Condition::Worn,
        Condition::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Good => "good",
            Condition::Worn => "worn",
            Condition::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::New => "Neuf",
            Condition::Good => "Bon",
            Condition::Worn => "Usé",
            Condition::Critical => "Critique",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = normalize_text(s.trim());
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == folded || normalize_text(c.label()) == folded)
            .ok_or_else(|| format!("Invalid condition: {}", s))
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Operator role. Profiles in the wild carry `ADMIN`, `admin`, `USER` or
/// nothing at all; only an admin spelling grants admin rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Option<&str>> for Role {
    fn from(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_lowercase()) {
            Some(ref r) if r == "admin" => Role::Admin,
            _ => Role::Operator,
        }
    }
}

// ---------------------------------------------------------------------------
// LoanReason
// ---------------------------------------------------------------------------

/// Why an item left the store
///
/// Travels as a plain string: known categories by slug, anything else verbatim.
/// Text matching a category (in any case or language) is that category, so
/// `Custom` never carries a category's name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoanReason {
    #[default]
    Intervention,
    Training,
    Maintenance,
    Other,
    /// Free text typed by the operator
    Custom(String),
}

impl LoanReason {
    pub fn as_str(&self) -> &str {
        match self {
            LoanReason::Intervention => "intervention",
            LoanReason::Training => "training",
            LoanReason::Maintenance => "maintenance",
            LoanReason::Other => "other",
            LoanReason::Custom(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for LoanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanReason::Intervention => "Intervention",
            LoanReason::Training => "Entraînement / Manœuvre",
            LoanReason::Maintenance => "Maintenance / Entretien",
            LoanReason::Other => "Autre",
            LoanReason::Custom(s) => s.as_str(),
        };
        write!(f, "{}", label)
    }
}

impl From<&str> for LoanReason {
    fn from(s: &str) -> Self {
        match normalize_text(s.trim()).as_str() {
            "intervention" => LoanReason::Intervention,
            "training" | "entrainement" | "entrainement / manœuvre" => LoanReason::Training,
            "maintenance" | "maintenance / entretien" => LoanReason::Maintenance,
            "other" | "autre" | "" => LoanReason::Other,
            _ => LoanReason::Custom(s.trim().to_string()),
        }
    }
}

impl From<String> for LoanReason {
    fn from(s: String) -> Self {
        LoanReason::from(s.as_str())
    }
}

impl From<LoanReason> for String {
    fn from(reason: LoanReason) -> Self {
        match reason {
            LoanReason::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleAction
// ---------------------------------------------------------------------------

/// Transition requested through the loan/return flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Loan,
    Return,
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleAction::Loan => write!(f, "loan"),
            LifecycleAction::Return => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equipment_type() {
        assert_eq!("gloves".parse::<EquipmentType>(), Ok(EquipmentType::Gloves));
        assert_eq!("Casque F1".parse::<EquipmentType>(), Ok(EquipmentType::Helmet));
        assert_eq!("  casque f1 ".parse::<EquipmentType>(), Ok(EquipmentType::Helmet));
        assert_eq!("Gants d'attaque".parse::<EquipmentType>(), Ok(EquipmentType::Gloves));
        assert!("Lance".parse::<EquipmentType>().is_err());
    }

    #[test]
    fn test_parse_condition_ignores_accents() {
        assert_eq!("Usé".parse::<Condition>(), Ok(Condition::Worn));
        assert_eq!("USE".parse::<Condition>(), Ok(Condition::Worn));
        assert_eq!("critical".parse::<Condition>(), Ok(Condition::Critical));
        assert!("Inconnu".parse::<Condition>().is_err());
    }

    #[test]
    fn test_parse_status_legacy_labels() {
        assert_eq!("Emprunté".parse::<EquipmentStatus>(), Ok(EquipmentStatus::Loaned));
        assert_eq!("Hors service".parse::<EquipmentStatus>(), Ok(EquipmentStatus::Damaged));
        assert_eq!("maintenance".parse::<EquipmentStatus>(), Ok(EquipmentStatus::Maintenance));
    }

    #[test]
    fn test_only_available_is_loanable() {
        assert!(EquipmentStatus::Available.is_loanable());
        assert!(!EquipmentStatus::Loaned.is_loanable());
        assert!(!EquipmentStatus::Damaged.is_loanable());
        assert!(!EquipmentStatus::Maintenance.is_loanable());
    }

    #[test]
    fn test_role_is_case_insensitive() {
        assert_eq!(Role::from(Some("ADMIN")), Role::Admin);
        assert_eq!(Role::from(Some("admin")), Role::Admin);
        assert_eq!(Role::from(Some("USER")), Role::Operator);
        assert_eq!(Role::from(Some("superuser")), Role::Operator);
        assert_eq!(Role::from(None), Role::Operator);
    }

    #[test]
    fn test_loan_reason_from_text() {
        assert_eq!(LoanReason::from("Intervention"), LoanReason::Intervention);
        assert_eq!(LoanReason::from("Entraînement"), LoanReason::Training);
        assert_eq!(LoanReason::from("Autre"), LoanReason::Other);
        assert_eq!(
            LoanReason::from("Prêt inter-CIS"),
            LoanReason::Custom("Prêt inter-CIS".to_string())
        );
    }

    #[test]
    fn test_loan_reason_travels_as_string() {
        let parsed: LoanReason = serde_json::from_str(r#""Intervention""#).unwrap();
        assert_eq!(parsed, LoanReason::Intervention);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""intervention""#);

        let free: LoanReason = serde_json::from_str(r#""Feu de cave""#).unwrap();
        assert_eq!(free, LoanReason::Custom("Feu de cave".to_string()));
        assert_eq!(serde_json::to_string(&free).unwrap(), r#""Feu de cave""#);
    }

    #[test]
    fn test_loan_reason_text_is_stable() {
        for text in ["intervention", "Entraînement / Manœuvre", "Autre", "Feu de cave", "Training"] {
            let reason = LoanReason::from(text);
            assert_eq!(LoanReason::from(String::from(reason.clone())), reason);
        }
        assert_eq!(LoanReason::from("Training"), LoanReason::Training);
    }
}
