//! Workspace listing and per-commit lookups.

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use std::sync::Mutex;

use super::StatusTracker;
use crate::api::types::{Workspace, WorkspaceInfo};
use crate::api::WorkspaceService;
use crate::cache::{lock, CacheLayer, KeyedCache, TtlList};
use crate::sort::{sort_entities, SortOption};

pub struct WorkspaceStore<S> {
  service: S,
  cache: CacheLayer,
  workspaces: Mutex<TtlList<Workspace>>,
  info: Mutex<KeyedCache<WorkspaceInfo>>,
  status: StatusTracker,
}

impl<S: WorkspaceService> WorkspaceStore<S> {
  pub fn new(service: S, ttl: Duration) -> Self {
    Self::with_cache_layer(service, ttl, CacheLayer::new())
  }

  pub fn with_cache_layer(service: S, ttl: Duration, cache: CacheLayer) -> Self {
    Self {
      service,
      cache,
      workspaces: Mutex::new(TtlList::new(ttl)),
      info: Mutex::new(KeyedCache::default()),
      status: StatusTracker::default(),
    }
  }

  /// All aliased workspaces, ordered by description.
  pub async fn fetch_workspaces(&self, force_refresh: bool) -> Result<Vec<Workspace>> {
    self.status.begin()?;

    let service = &self.service;
    let result = self
      .cache
      .fetch_list(&self.workspaces, force_refresh, move || async move {
        let workspaces = service.list_aliased_workspaces().await?;
        Ok(sort_entities(&workspaces, SortOption::default()))
      })
      .await
      .map(|r| r.data);

    self.status.finish("workspaces", result)
  }

  pub async fn get_workspace_info(
    &self,
    alias: &str,
    commit_id: &str,
    path: &str,
  ) -> Result<WorkspaceInfo> {
    self.status.begin()?;

    let key = format!("{}:{}:{}", alias, commit_id, path);
    let service = &self.service;
    let result = self
      .cache
      .fetch_keyed(&self.info, &key, move || async move {
        service.get_workspace_info(alias, commit_id, path).await
      })
      .await
      .map(|r| r.data);

    self.status.finish("workspaces", result)
  }

  /// File contents are not cached; they can be large and are read once.
  pub async fn get_raw_file(&self, alias: &str, commit_id: &str, path: &str) -> Result<String> {
    self.service.get_raw_file(alias, commit_id, path).await
  }

  pub fn clear_cache(&self) -> Result<()> {
    lock(&self.workspaces)?.clear();
    lock(&self.info)?.clear();
    self.status.reset()
  }

  pub fn error(&self) -> Option<String> {
    self.status.error()
  }

  pub fn is_loading(&self) -> bool {
    self.status.is_loading()
  }

  pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
    lock(&self.workspaces).ok().and_then(|w| w.fetched_at())
  }
}
