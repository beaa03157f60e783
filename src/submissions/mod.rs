//! Quote and contact submission endpoints.
//!
//! Both endpoints validate the payload's structure, log it and acknowledge
//! it. Nothing is stored and the client's estimated total is echoed as sent.

pub mod requests;
pub mod responses;
pub mod routes;

pub use routes::router;
