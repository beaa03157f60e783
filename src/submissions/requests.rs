//! Request DTOs for submission endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pricing::OptionMap;

/// Event section of a quote submission
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Event type is required"))]
    pub event_type: String,
    #[validate(range(min = 1, max = 365, message = "Duration must be between 1 and 365 days"))]
    pub duration: i64,
    #[validate(range(min = 1, max = 100000, message = "Attendees must be between 1 and 100000"))]
    pub attendees: Option<i64>,
    #[validate(length(max = 50))]
    pub venue_size: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 50))]
    pub date: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// One selected service in a quote submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceSubmission {
    #[validate(length(min = 1, max = 50, message = "Service id is required"))]
    pub id: String,
    #[serde(default)]
    pub options: OptionMap,
}

/// Contact section of a quote submission
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub company: Option<String>,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

/// Body of `POST /api/quote`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    #[validate(nested)]
    pub event: EventInfo,
    #[validate(length(min = 1, message = "Select at least one service"), nested)]
    pub services: Vec<ServiceSubmission>,
    #[serde(default)]
    pub add_ons: Vec<String>,
    #[validate(nested)]
    pub contact: ContactInfo,
    #[validate(range(min = 0.0, message = "Estimated total cannot be negative"))]
    pub estimated_total: f64,
}

/// Body of `POST /api/contact`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub company: Option<String>,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(min = 10, max = 5000, message = "Message must be 10 to 5000 characters"))]
    pub message: String,
}
