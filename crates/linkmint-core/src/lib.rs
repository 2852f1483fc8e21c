//! Core types and traits for the linkmint URL shortener.
//!
//! This crate holds the vocabulary shared by every other crate: the
//! [`ShortCode`] identifier, the stored [`UrlMapping`], and the two seams the
//! shortener talks to, [`UrlStore`] for durable storage and [`SharedCache`]
//! for the optional distributed cache.

pub mod cache;
pub mod error;
pub mod mapping;
pub mod shortcode;
pub mod store;
pub mod validate;

pub use cache::SharedCache;
pub use error::{CacheError, CoreError, StoreError};
pub use mapping::UrlMapping;
pub use shortcode::ShortCode;
pub use store::UrlStore;
pub use validate::validate_url;
