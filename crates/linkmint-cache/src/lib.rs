//! The two-layer cache in front of the durable store.
//!
//! [`CacheTier`] consults an optional [`SharedCache`](linkmint_core::SharedCache)
//! (Redis in production, see [`RedisSharedCache`]) and then the process-local
//! [`LocalCache`]. Both layers are written through on every `put`. Shared
//! cache failures are logged and treated as misses; they never reach callers.

pub mod local;
pub mod redis_cache;
pub mod tier;

pub use local::LocalCache;
pub use redis_cache::RedisSharedCache;
pub use tier::{CacheSettings, CacheTier};
