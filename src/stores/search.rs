//! Search index categories and term lookups.

use chrono::Duration;
use color_eyre::Result;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Mutex;
use tracing::{debug, warn};

use super::StatusTracker;
use crate::api::types::{IndexKindResponse, IndexSearchResult};
use crate::api::SearchService;
use crate::cache::{lock, CacheLayer, TtlList};

/// One index kind and the outcome of loading its terms.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryData {
  pub kind: String,
  pub kind_info: Option<IndexKindResponse>,
  pub error: Option<String>,
}

pub struct SearchStore<S> {
  service: S,
  cache: CacheLayer,
  kinds: BTreeSet<String>,
  categories: Mutex<TtlList<CategoryData>>,
  status: StatusTracker,
}

impl<S: SearchService> SearchStore<S> {
  /// `kinds` limits which advertised indexes are loaded.
  pub fn new(service: S, kinds: BTreeSet<String>, ttl: Duration) -> Self {
    Self::with_cache_layer(service, kinds, ttl, CacheLayer::new())
  }

  pub fn with_cache_layer(
    service: S,
    kinds: BTreeSet<String>,
    ttl: Duration,
    cache: CacheLayer,
  ) -> Self {
    Self {
      service,
      cache,
      kinds,
      categories: Mutex::new(TtlList::new(ttl)),
      status: StatusTracker::default(),
    }
  }

  /// Load the index list, then every wanted kind concurrently.
  ///
  /// A kind that fails to load keeps its error on the category. Only a
  /// failure to list the indexes fails the whole call.
  pub async fn fetch_categories(&self, force_refresh: bool) -> Result<Vec<CategoryData>> {
    self.status.begin()?;

    let service = &self.service;
    let kinds = &self.kinds;
    let result = self
      .cache
      .fetch_list(&self.categories, force_refresh, move || async move {
        let indexes = service.get_indexes().await?;
        let wanted: Vec<String> = indexes
          .indexes
          .into_iter()
          .filter(|kind| kinds.contains(kind.trim()))
          .collect();
        debug!(count = wanted.len(), "loading search categories");

        let loaded = join_all(
          wanted
            .iter()
            .map(move |kind| async move { (kind, service.get_index_kind(kind).await) }),
        )
        .await;

        Ok(
          loaded
            .into_iter()
            .map(|(kind, outcome)| match outcome {
              Ok(info) => CategoryData {
                kind: kind.clone(),
                kind_info: Some(info),
                error: None,
              },
              Err(e) => {
                warn!(kind = %kind, error = %e, "failed to load category");
                CategoryData {
                  kind: kind.clone(),
                  kind_info: None,
                  error: Some(e.to_string()),
                }
              }
            })
            .collect(),
        )
      })
      .await
      .map(|r| r.data);

    self.status.finish("search", result)
  }

  pub async fn refresh_categories(&self) -> Result<Vec<CategoryData>> {
    self.fetch_categories(true).await
  }

  /// Entries indexed under `term`; always fetched fresh.
  pub async fn search_term(&self, kind: &str, term: &str) -> Result<IndexSearchResult> {
    self.status.begin()?;
    let result = self.service.search_index_term(kind, term).await;
    self.status.finish("search", result)
  }

  /// Currently cached categories, regardless of age.
  pub fn categories(&self) -> Vec<CategoryData> {
    lock(&self.categories)
      .map(|c| c.items().to_vec())
      .unwrap_or_default()
  }

  pub fn clear_cache(&self) -> Result<()> {
    lock(&self.categories)?.clear();
    self.status.reset()
  }

  pub fn error(&self) -> Option<String> {
    self.status.error()
  }

  pub fn is_loading(&self) -> bool {
    self.status.is_loading()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{IndexesResponse, KindInfo};
  use crate::cache::ManualClock;
  use async_trait::async_trait;
  use chrono::DateTime;
  use color_eyre::eyre::eyre;
  use serde_json::json;
  use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
  use std::sync::Arc;

  #[derive(Default)]
  struct FakeSearch {
    index_calls: AtomicU32,
    kind_calls: AtomicU32,
    term_calls: AtomicU32,
    fail_indexes: AtomicBool,
  }

  #[async_trait]
  impl SearchService for FakeSearch {
    async fn get_indexes(&self) -> Result<IndexesResponse> {
      self.index_calls.fetch_add(1, Ordering::SeqCst);
      if self.fail_indexes.load(Ordering::SeqCst) {
        return Err(eyre!("Request failed: 500 Internal Server Error"));
      }
      Ok(IndexesResponse {
        indexes: vec![
          "cellml_keyword".into(),
          "model_author".into(),
          "citation_id".into(),
        ],
      })
    }

    async fn get_index_kind(&self, kind: &str) -> Result<IndexKindResponse> {
      self.kind_calls.fetch_add(1, Ordering::SeqCst);
      if kind == "citation_id" {
        return Err(eyre!("Request failed: 503 Service Unavailable"));
      }
      Ok(IndexKindResponse {
        kind: KindInfo {
          id: 1,
          description: kind.to_string(),
        },
        terms: vec!["cardiac".into(), "calcium".into()],
      })
    }

    async fn search_index_term(&self, kind: &str, term: &str) -> Result<IndexSearchResult> {
      self.term_calls.fetch_add(1, Ordering::SeqCst);
      let mut result = IndexSearchResult::new();
      result.insert("kind".into(), json!(kind));
      result.insert("term".into(), json!(term));
      Ok(result)
    }
  }

  fn kinds(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
  }

  fn store(wanted: &[&str]) -> (SearchStore<FakeSearch>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
      DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
    ));
    let store = SearchStore::with_cache_layer(
      FakeSearch::default(),
      kinds(wanted),
      Duration::minutes(30),
      CacheLayer::with_clock(clock.clone()),
    );
    (store, clock)
  }

  #[tokio::test]
  async fn test_only_configured_kinds_loaded() {
    let (store, _clock) = store(&["cellml_keyword"]);
    let categories = store.fetch_categories(false).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].kind, "cellml_keyword");
    assert_eq!(categories[0].kind_info.as_ref().unwrap().terms.len(), 2);
    assert_eq!(store.service.kind_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_category_failure_recorded_on_category() {
    let (store, _clock) = store(&["cellml_keyword", "citation_id"]);
    let categories = store.fetch_categories(false).await.unwrap();
    assert_eq!(categories.len(), 2);

    let failed = categories.iter().find(|c| c.kind == "citation_id").unwrap();
    assert!(failed.kind_info.is_none());
    assert!(failed.error.as_deref().unwrap().contains("503"));
    assert_eq!(store.error(), None);
  }

  #[tokio::test]
  async fn test_index_failure_recorded_on_store() {
    let (store, _clock) = store(&["cellml_keyword"]);
    store.service.fail_indexes.store(true, Ordering::SeqCst);
    assert!(store.fetch_categories(false).await.is_err());
    assert!(store.error().unwrap().contains("500"));
    assert!(store.categories().is_empty());
  }

  #[tokio::test]
  async fn test_cached_within_ttl_and_refresh_forces() {
    let (store, clock) = store(&["cellml_keyword"]);
    store.fetch_categories(false).await.unwrap();
    clock.advance(Duration::minutes(5));
    store.fetch_categories(false).await.unwrap();
    assert_eq!(store.service.index_calls.load(Ordering::SeqCst), 1);

    store.refresh_categories().await.unwrap();
    assert_eq!(store.service.index_calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.categories().len(), 1);
  }

  #[tokio::test]
  async fn test_search_term_is_not_cached() {
    let (store, _clock) = store(&["cellml_keyword"]);
    let result = store.search_term("cellml_keyword", "cardiac").await.unwrap();
    assert_eq!(result["term"], json!("cardiac"));
    store.search_term("cellml_keyword", "cardiac").await.unwrap();
    assert_eq!(store.service.term_calls.load(Ordering::SeqCst), 2);
  }
}
