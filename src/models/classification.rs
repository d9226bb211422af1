//! Photo classification result

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::{Condition, EquipmentType};

/// Best guess from the vision service. Advisory only: the operator confirms
/// or edits it before anything is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Classification {
    pub equipment_type: Option<EquipmentType>,
    pub condition: Option<Condition>,
    /// 0.0 - 1.0
    pub confidence: f32,
}
