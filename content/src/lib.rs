//! # Content
//!
//! Lazy loading and caching of document bodies.
//!
//! - [`ContentStore`]: key/value capability over whatever persistent storage is
//!   available. Every call reports success or failure explicitly.
//! - [`ContentCache`]: bounded, access-ordered cache of bodies on top of a store.
//!   Store failures degrade to "not cached", never to an error.
//! - [`Fetch`]: where bodies come from ([`FsFetcher`], [`HttpFetcher`]).
//! - [`ContentLoader`]: cache tiers, request coalescing, timeout and stale
//!   fallback. `load` never fails; the worst case is an empty body.

mod cache;
mod error;
mod fetch;
mod loader;
mod session;
mod store;

pub use cache::CacheConfig;
pub use cache::CacheEntryInfo;
pub use cache::ContentCache;
pub use cache::cache_key;
pub use error::FetchError;
pub use error::StoreError;
pub use fetch::Fetch;
pub use fetch::FsFetcher;
pub use fetch::HttpFetcher;
pub use loader::ContentLoader;
pub use loader::DEFAULT_FETCH_TIMEOUT;
pub use session::SessionCache;
pub use store::ContentStore;
pub use store::FileStore;
pub use store::MemoryStore;
pub use store::UnavailableStore;
