//! Submission route handlers

use axum::{routing::post, Json, Router};
use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::AppState;

use super::requests::{ContactSubmission, QuoteSubmission};
use super::responses::{ContactSubmissionResponse, QuoteSubmissionResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/quote", post(submit_quote))
        .route("/api/contact", post(submit_contact))
}

/// Opaque tracking id, e.g. `Q-20261019-1A2B3C4D`
pub fn new_quote_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("Q-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

/// Accept a quote request and acknowledge it with a tracking id
async fn submit_quote(
    ValidatedJson(submission): ValidatedJson<QuoteSubmission>,
) -> Result<Json<QuoteSubmissionResponse>> {
    let quote_id = new_quote_id();

    // The estimate is non-binding; it is not recomputed against the catalog
    tracing::info!(
        quote_id = %quote_id,
        event_type = %submission.event.event_type,
        duration = submission.event.duration,
        services = submission.services.len(),
        add_ons = submission.add_ons.len(),
        estimated_total = submission.estimated_total,
        "Quote request received"
    );

    Ok(Json(QuoteSubmissionResponse {
        success: true,
        quote_id,
        estimated_total: submission.estimated_total,
    }))
}

/// Accept a contact message
async fn submit_contact(
    ValidatedJson(submission): ValidatedJson<ContactSubmission>,
) -> Result<Json<ContactSubmissionResponse>> {
    tracing::info!(
        subject = submission.subject.as_deref().unwrap_or(""),
        company = submission.company.as_deref().unwrap_or(""),
        "Contact message received"
    );

    Ok(Json(ContactSubmissionResponse {
        success: true,
        message: "Thank you. We will be in touch shortly.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_id_format() {
        let id = new_quote_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "Q");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_quote_ids_differ() {
        assert_ne!(new_quote_id(), new_quote_id());
    }
}
