//! Durable store adapters for `code -> url` mappings.

pub mod memory;
pub mod postgres;

pub use linkmint_core::{StoreError, UrlMapping, UrlStore};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
