//! Response DTOs for pricing API endpoints.

use serde::Serialize;

use super::services::PricingError;

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&PricingError> for PricingErrorResponse {
    fn from(err: &PricingError) -> Self {
        let (error_type, details) = match err {
            PricingError::UnknownService { service_key } => (
                "unknown_service",
                Some(serde_json::json!({ "serviceKey": service_key })),
            ),
            PricingError::UnknownAddOn { add_on_id } => (
                "unknown_add_on",
                Some(serde_json::json!({ "addOnId": add_on_id })),
            ),
            PricingError::UnknownChoice {
                service_key,
                option_id,
                value,
            } => (
                "unknown_choice",
                Some(serde_json::json!({
                    "serviceKey": service_key,
                    "optionId": option_id,
                    "value": value,
                })),
            ),
            PricingError::InvalidOptionValue {
                service_key,
                option_id,
                expected,
                ..
            } => (
                "invalid_option_value",
                Some(serde_json::json!({
                    "serviceKey": service_key,
                    "optionId": option_id,
                    "expected": expected,
                })),
            ),
            PricingError::OutOfRange {
                service_key,
                option_id,
                min,
                max,
                ..
            } => (
                "out_of_range",
                Some(serde_json::json!({
                    "serviceKey": service_key,
                    "optionId": option_id,
                    "min": min,
                    "max": max,
                })),
            ),
            PricingError::InvalidCatalog { errors, .. } => {
                ("invalid_catalog", Some(serde_json::json!(errors)))
            }
            PricingError::CatalogLoad { .. } => ("catalog_load", None),
        };

        PricingErrorResponse {
            error_type: error_type.to_string(),
            message: err.to_string(),
            details,
        }
    }
}
