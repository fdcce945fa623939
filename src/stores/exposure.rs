//! Exposure listing, detail and rendered view content.

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use std::sync::Mutex;

use super::StatusTracker;
use crate::api::types::{Exposure, ExposureFileInfo, ExposureInfo};
use crate::api::ExposureService;
use crate::cache::{lock, CacheLayer, KeyedCache, TtlList};

pub struct ExposureStore<S> {
  service: S,
  cache: CacheLayer,
  exposures: Mutex<TtlList<Exposure>>,
  info: Mutex<KeyedCache<ExposureInfo>>,
  file_info: Mutex<KeyedCache<ExposureFileInfo>>,
  /// Safe HTML and raw view content share one map; raw keys end in `:raw`.
  content: Mutex<KeyedCache<String>>,
  status: StatusTracker,
}

impl<S: ExposureService> ExposureStore<S> {
  pub fn new(service: S, ttl: Duration) -> Self {
    Self::with_cache_layer(service, ttl, CacheLayer::new())
  }

  pub fn with_cache_layer(service: S, ttl: Duration, cache: CacheLayer) -> Self {
    Self {
      service,
      cache,
      exposures: Mutex::new(TtlList::new(ttl)),
      info: Mutex::new(KeyedCache::default()),
      file_info: Mutex::new(KeyedCache::default()),
      content: Mutex::new(KeyedCache::default()),
      status: StatusTracker::default(),
    }
  }

  pub async fn fetch_exposures(&self, force_refresh: bool) -> Result<Vec<Exposure>> {
    self.status.begin()?;

    let service = &self.service;
    let result = self
      .cache
      .fetch_list(&self.exposures, force_refresh, move || async move {
        service.list_aliased_exposures().await
      })
      .await
      .map(|r| r.data);

    self.status.finish("exposures", result)
  }

  pub async fn get_exposure_info(&self, alias: &str) -> Result<ExposureInfo> {
    self.status.begin()?;

    let service = &self.service;
    let result = self
      .cache
      .fetch_keyed(&self.info, alias, move || async move {
        service.get_exposure_info(alias).await
      })
      .await
      .map(|r| r.data);

    self.status.finish("exposures", result)
  }

  pub async fn get_exposure_file_info(&self, alias: &str, file: &str) -> Result<ExposureFileInfo> {
    self.status.begin()?;

    let key = format!("{}:{}", alias, file);
    let service = &self.service;
    let result = self
      .cache
      .fetch_keyed(&self.file_info, &key, move || async move {
        service.get_exposure_file_info(alias, file).await
      })
      .await
      .map(|r| r.data);

    self.status.finish("exposures", result)
  }

  /// View HTML with relative links resolved under `route_path`.
  pub async fn get_exposure_safe_html(
    &self,
    exposure_id: i64,
    exposure_file_id: i64,
    view_key: &str,
    path: &str,
    route_path: &str,
  ) -> Result<String> {
    self.status.begin()?;

    let key = format!(
      "{}:{}:{}:{}:{}",
      exposure_id, exposure_file_id, view_key, path, route_path
    );
    let service = &self.service;
    let result = self
      .cache
      .fetch_keyed(&self.content, &key, move || async move {
        service
          .get_exposure_safe_html(exposure_id, exposure_file_id, view_key, path, route_path)
          .await
      })
      .await
      .map(|r| r.data);

    self.status.finish("exposures", result)
  }

  pub async fn get_exposure_raw_content(
    &self,
    exposure_id: i64,
    exposure_file_id: i64,
    view_key: &str,
    path: &str,
  ) -> Result<String> {
    self.status.begin()?;

    let key = format!(
      "{}:{}:{}:{}:raw",
      exposure_id, exposure_file_id, view_key, path
    );
    let service = &self.service;
    let result = self
      .cache
      .fetch_keyed(&self.content, &key, move || async move {
        service
          .get_exposure_raw_content(exposure_id, exposure_file_id, view_key, path)
          .await
      })
      .await
      .map(|r| r.data);

    self.status.finish("exposures", result)
  }

  pub fn clear_cache(&self) -> Result<()> {
    lock(&self.exposures)?.clear();
    lock(&self.info)?.clear();
    lock(&self.file_info)?.clear();
    lock(&self.content)?.clear();
    self.status.reset()
  }

  pub fn error(&self) -> Option<String> {
    self.status.error()
  }

  pub fn is_loading(&self) -> bool {
    self.status.is_loading()
  }

  pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
    lock(&self.exposures).ok().and_then(|e| e.fetched_at())
  }
}
