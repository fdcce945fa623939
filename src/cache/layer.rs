//! Cache layer that orchestrates caching logic with network fetching.

use color_eyre::{eyre::eyre, Result};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::entries::{KeyedCache, TtlList};
use super::traits::{CacheResult, Clock, SystemClock};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between a store and its service, deciding whether a
/// request can be answered from memory.
pub struct CacheLayer {
  clock: Arc<dyn Clock>,
}

impl Default for CacheLayer {
  fn default() -> Self {
    Self::new()
  }
}

impl CacheLayer {
  pub fn new() -> Self {
    Self {
      clock: Arc::new(SystemClock),
    }
  }

  /// Use a different clock for staleness checks.
  pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
    Self { clock }
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Unless `force_refresh`, return cached items while fresh and non-empty
  /// 2. Otherwise fetch from network
  /// 3. Replace the cached items and record the fetch time
  ///
  /// Errors from the fetcher leave the cache untouched.
  pub async fn fetch_list<T, F, Fut>(
    &self,
    slot: &Mutex<TtlList<T>>,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Vec<T>>>
  where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
  {
    if !force_refresh {
      let list = lock(slot)?;
      if let Some(items) = list.fresh(self.clock.now()) {
        debug!(count = items.len(), "list served from cache");
        return Ok(CacheResult::from_cache(items.to_vec(), list.fetched_at()));
      }
    }

    let data = fetcher().await?;
    lock(slot)?.replace(data.clone(), self.clock.now());
    debug!(count = data.len(), force_refresh, "list fetched");

    Ok(CacheResult::from_network(data))
  }

  /// Fetch a single value, caching it under `key` until the cache is cleared.
  pub async fn fetch_keyed<V, F, Fut>(
    &self,
    cache: &Mutex<KeyedCache<V>>,
    key: &str,
    fetcher: F,
  ) -> Result<CacheResult<V>>
  where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V>>,
  {
    if let Some(value) = lock(cache)?.get(key) {
      debug!(key, "served from cache");
      return Ok(CacheResult::from_cache(value, None));
    }

    let value = fetcher().await?;
    lock(cache)?.insert(key, value.clone());
    debug!(key, "fetched");

    Ok(CacheResult::from_network(value))
  }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
  mutex.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::traits::{CacheSource, ManualClock};
  use chrono::{DateTime, Duration};
  use std::sync::atomic::{AtomicU32, Ordering};

  fn layer() -> (CacheLayer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
      DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
    ));
    (CacheLayer::with_clock(clock.clone()), clock)
  }

  #[tokio::test]
  async fn test_second_fetch_within_ttl_is_cached() {
    let (layer, clock) = layer();
    let slot = Mutex::new(TtlList::new(Duration::minutes(30)));
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let fetch = || async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(vec![1, 2, 3])
    };

    let first = layer.fetch_list(&slot, false, fetch).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);

    clock.advance(Duration::minutes(10));
    let second = layer.fetch_list(&slot, false, fetch).await.unwrap();
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(second.data, vec![1, 2, 3]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_expired_or_forced_refetches() {
    let (layer, clock) = layer();
    let slot = Mutex::new(TtlList::new(Duration::minutes(30)));
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let fetch = || async move { Ok(vec![counter.fetch_add(1, Ordering::SeqCst)]) };

    layer.fetch_list(&slot, false, fetch).await.unwrap();
    let forced = layer.fetch_list(&slot, true, fetch).await.unwrap();
    assert_eq!(forced.data, vec![1]);

    clock.advance(Duration::minutes(30));
    let expired = layer.fetch_list(&slot, false, fetch).await.unwrap();
    assert_eq!(expired.source, CacheSource::Network);
    assert_eq!(expired.data, vec![2]);
  }

  #[tokio::test]
  async fn test_empty_result_is_refetched() {
    let (layer, _clock) = layer();
    let slot: Mutex<TtlList<u32>> = Mutex::new(TtlList::new(Duration::minutes(30)));
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let fetch = || async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(Vec::new())
    };

    layer.fetch_list(&slot, false, fetch).await.unwrap();
    layer.fetch_list(&slot, false, fetch).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_failed_fetch_keeps_previous_items() {
    let (layer, clock) = layer();
    let slot = Mutex::new(TtlList::new(Duration::minutes(30)));

    layer
      .fetch_list(&slot, false, || async { Ok(vec!["old"]) })
      .await
      .unwrap();
    clock.advance(Duration::hours(1));

    let err = layer
      .fetch_list(&slot, false, || async { Err::<Vec<&str>, _>(eyre!("Request failed: 500")) })
      .await
      .unwrap_err();
    assert!(err.to_string().contains("500"));
    assert_eq!(lock(&slot).unwrap().items(), &["old"]);
  }

  #[tokio::test]
  async fn test_keyed_fetch_ignores_ttl() {
    let (layer, clock) = layer();
    let cache = Mutex::new(KeyedCache::default());
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let fetch = || async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok("info".to_string())
    };

    layer.fetch_keyed(&cache, "a", fetch).await.unwrap();
    clock.advance(Duration::days(30));
    let again = layer.fetch_keyed(&cache, "a", fetch).await.unwrap();
    assert_eq!(again.source, CacheSource::Cache);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    layer.fetch_keyed(&cache, "b", fetch).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }
}
