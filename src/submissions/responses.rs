//! Response DTOs for submission endpoints.

use serde::Serialize;

/// Acknowledgment of a quote request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmissionResponse {
    pub success: bool,
    pub quote_id: String,
    /// The client's figure, unchanged
    pub estimated_total: f64,
}

/// Acknowledgment of a contact message
#[derive(Debug, Serialize)]
pub struct ContactSubmissionResponse {
    pub success: bool,
    pub message: String,
}
