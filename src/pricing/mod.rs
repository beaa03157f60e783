//! Quote pricing engine.
//!
//! Turns a selection of services, option values and add-ons plus an event
//! duration into a non-binding KRW estimate. Everything except `routes` is
//! pure and usable without an HTTP or storage environment.

pub mod calculators;
pub mod catalog;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{duration_multiplier, quote_total, round_krw, Estimate};
pub use catalog::{AddOn, Catalog, OptionKind, OptionMap, OptionSpec, OptionValue, ServiceCatalogEntry};
pub use routes::router;
pub use services::{compute_service_price, Pricer, PricingError, ResolutionMode};
