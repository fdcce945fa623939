//! Application stores: cached views over the backend services.
//!
//! Each store owns its cache state and a service implementation. Stores are
//! plain values held by the caller; nothing here is global.

pub mod auth;
pub mod exposure;
pub mod search;
pub mod workspace;

pub use auth::AuthStore;
pub use exposure::ExposureStore;
pub use search::{CategoryData, SearchStore};
pub use workspace::WorkspaceStore;

use color_eyre::Result;
use std::sync::Mutex;
use tracing::warn;

use crate::cache::{lock, FetchStatus};

/// Request count and last error shared by the store operations.
#[derive(Debug, Default)]
pub(crate) struct StatusTracker {
  status: Mutex<FetchStatus>,
}

impl StatusTracker {
  /// Mark a request as started and forget the previous error.
  pub(crate) fn begin(&self) -> Result<()> {
    let mut status = lock(&self.status)?;
    status.in_flight += 1;
    status.error = None;
    Ok(())
  }

  /// Record the outcome of a request and hand it back unchanged.
  pub(crate) fn finish<T>(&self, store: &str, result: Result<T>) -> Result<T> {
    let mut status = lock(&self.status)?;
    status.in_flight = status.in_flight.saturating_sub(1);
    if let Err(e) = &result {
      warn!(store, error = %e, "request failed");
      status.error = Some(e.to_string());
    }
    result
  }

  pub(crate) fn error(&self) -> Option<String> {
    lock(&self.status).ok().and_then(|s| s.error.clone())
  }

  pub(crate) fn is_loading(&self) -> bool {
    lock(&self.status).map(|s| s.is_loading()).unwrap_or(false)
  }

  pub(crate) fn reset(&self) -> Result<()> {
    *lock(&self.status)? = FetchStatus::default();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use color_eyre::eyre::eyre;

  #[test]
  fn test_status_records_and_clears_error() {
    let tracker = StatusTracker::default();

    tracker.begin().unwrap();
    assert!(tracker.is_loading());

    let failed: Result<()> = tracker.finish("test", Err(eyre!("Request failed: 503")));
    assert!(failed.is_err());
    assert!(!tracker.is_loading());
    assert_eq!(tracker.error().as_deref(), Some("Request failed: 503"));

    tracker.begin().unwrap();
    assert_eq!(tracker.error(), None);
    assert_eq!(tracker.finish("test", Ok(5)).unwrap(), 5);

    tracker.finish::<()>("test", Err(eyre!("x"))).ok();
    tracker.reset().unwrap();
    assert_eq!(tracker.error(), None);
  }

  #[test]
  fn test_overlapping_requests_keep_loading() {
    let tracker = StatusTracker::default();

    tracker.begin().unwrap();
    tracker.begin().unwrap();
    assert_eq!(tracker.finish("test", Ok(1)).unwrap(), 1);
    assert!(tracker.is_loading());

    assert_eq!(tracker.finish("test", Ok(2)).unwrap(), 2);
    assert!(!tracker.is_loading());

    // An unmatched finish does not wrap the counter
    tracker.finish("test", Ok(())).unwrap();
    assert!(!tracker.is_loading());
  }
}
