//! In-memory caching with time-based expiry.
//!
//! [`TtlCache`] is the only shared mutable state in the crate. The quote aggregator and
//! series fetcher each own their caches; expiry is driven by an injected [`Clock`].

mod clock;
mod ttl_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl_cache::{CacheEntry, TtlCache};
