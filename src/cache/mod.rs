//! Time-boxed in-memory caching for backend responses.
//!
//! This module provides the pieces the stores are built from:
//! - Whole lists cached under one fetch timestamp and a TTL
//! - Keyed lookups cached until explicitly cleared
//! - A layer deciding whether to serve from memory or call the fetcher

mod entries;
mod layer;
mod traits;

pub use entries::{FetchStatus, KeyedCache, TtlList};
pub use layer::CacheLayer;
pub(crate) use layer::lock;
pub use traits::{CacheResult, CacheSource, Clock, ManualClock, SystemClock};
