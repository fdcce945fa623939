//! In-memory cache containers used by the stores.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// A whole collection cached under a single fetch timestamp.
#[derive(Debug, Clone)]
pub struct TtlList<T> {
  items: Vec<T>,
  fetched_at: Option<DateTime<Utc>>,
  ttl: Duration,
}

impl<T> TtlList<T> {
  pub fn new(ttl: Duration) -> Self {
    Self {
      items: Vec::new(),
      fetched_at: None,
      ttl,
    }
  }

  /// Whether the last fetch happened less than one TTL ago.
  pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
    match self.fetched_at {
      Some(at) => now - at < self.ttl,
      None => false,
    }
  }

  /// Cached items if they are still within the TTL and non-empty.
  pub fn fresh(&self, now: DateTime<Utc>) -> Option<&[T]> {
    if self.is_valid(now) && !self.items.is_empty() {
      Some(&self.items)
    } else {
      None
    }
  }

  pub fn replace(&mut self, items: Vec<T>, fetched_at: DateTime<Utc>) {
    self.items = items;
    self.fetched_at = Some(fetched_at);
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
    self.fetched_at
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.fetched_at = None;
  }
}

/// Lookups that never expire; only [`KeyedCache::clear`] empties them.
#[derive(Debug, Clone)]
pub struct KeyedCache<V> {
  entries: HashMap<String, V>,
}

impl<V> Default for KeyedCache<V> {
  fn default() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }
}

impl<V: Clone> KeyedCache<V> {
  pub fn get(&self, key: &str) -> Option<V> {
    self.entries.get(key).cloned()
  }

  pub fn insert(&mut self, key: impl Into<String>, value: V) {
    self.entries.insert(key.into(), value);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

/// Requests in flight and last error message of a store.
#[derive(Debug, Clone, Default)]
pub struct FetchStatus {
  pub in_flight: usize,
  pub error: Option<String>,
}

impl FetchStatus {
  pub fn is_loading(&self) -> bool {
    self.in_flight > 0
  }
}
