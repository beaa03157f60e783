//! Request DTOs for pricing API endpoints.

use serde::Deserialize;

use super::catalog::OptionMap;

/// One service in an ad-hoc selection
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSelectionRequest {
    /// Catalog service key
    pub id: String,
    #[serde(default)]
    pub options: OptionMap,
}

/// Request to price a selection without a cart
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default)]
    pub services: Vec<ServiceSelectionRequest>,
    #[serde(default)]
    pub add_ons: Vec<String>,
    #[serde(default = "default_duration_days")]
    pub duration_days: i64,
    /// Report unknown ids and invalid option values instead of skipping them
    #[serde(default)]
    pub strict: bool,
}

fn default_duration_days() -> i64 {
    1
}
