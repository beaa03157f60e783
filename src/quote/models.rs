//! Quote cart state.
//!
//! This is the shape persisted by [`super::persistence`] and returned by the
//! cart API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::pricing::OptionMap;

/// A service placed in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedService {
    /// Instance id, unique within the cart
    pub id: String,
    pub service_key: String,
    pub options: OptionMap,
    /// Cached price of `service_key` with `options`
    pub subtotal: i64,
}

/// Event-level context for the quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDetails {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Length of the event in days
    pub duration: i64,
    pub attendees: i64,
    pub venue_size: String,
    pub location: String,
    pub date: String,
    pub description: String,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            event_type: String::new(),
            duration: 1,
            attendees: 0,
            venue_size: String::new(),
            location: String::new(),
            date: String::new(),
            description: String::new(),
        }
    }
}

/// Partial update of [`EventDetails`]; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsPatch {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub duration: Option<i64>,
    pub attendees: Option<i64>,
    pub venue_size: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

impl EventDetailsPatch {
    pub fn apply(self, details: &mut EventDetails) {
        if let Some(v) = self.event_type {
            details.event_type = v;
        }
        if let Some(v) = self.duration {
            details.duration = v;
        }
        if let Some(v) = self.attendees {
            details.attendees = v;
        }
        if let Some(v) = self.venue_size {
            details.venue_size = v;
        }
        if let Some(v) = self.location {
            details.location = v;
        }
        if let Some(v) = self.date {
            details.date = v;
        }
        if let Some(v) = self.description {
            details.description = v;
        }
    }
}

/// The whole cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteState {
    /// Insertion order is display order; at most one entry per service key
    pub services: Vec<SelectedService>,
    pub event_details: EventDetails,
    pub selected_add_ons: BTreeSet<String>,
}

impl QuoteState {
    pub fn service_by_key(&self, service_key: &str) -> Option<&SelectedService> {
        self.services.iter().find(|s| s.service_key == service_key)
    }

    pub fn service(&self, instance_id: &str) -> Option<&SelectedService> {
        self.services.iter().find(|s| s.id == instance_id)
    }
}
