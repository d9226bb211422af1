//! Dashboard figures

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Item counts by status, plus a per-type breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockStats {
    pub total: usize,
    pub available: usize,
    pub loaned: usize,
    pub damaged: usize,
    pub maintenance: usize,
    /// Keyed by type slug, in catalogue order
    #[schema(value_type = Object)]
    pub by_type: IndexMap<String, TypeCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TypeCount {
    pub total: usize,
    pub available: usize,
}

/// Advisory text from the stock analyst
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockInsight {
    pub text: String,
}
