//! Quote cart: state model, store, persistence and session API.

pub mod models;
pub mod persistence;
pub mod routes;
pub mod store;

pub use models::{EventDetails, EventDetailsPatch, QuoteState, SelectedService};
pub use persistence::{JsonFilePersistence, MemoryPersistence, PersistenceError, QuotePersistence};
pub use routes::router;
pub use store::QuoteStore;
