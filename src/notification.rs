//! Dismissible site notice.

use chrono::{Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

use crate::storage::SessionStorage;

pub const NOTIFICATION_DISMISSED_KEY: &str = "pmr_notification_dismissed";
pub const DEFAULT_DISMISS_DAYS: i64 = 7;

/// Tracks whether the user has hidden the notice, for a number of days.
pub struct Notification {
  storage: Arc<dyn SessionStorage>,
  key: String,
}

impl Notification {
  pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
    Self::with_key(storage, NOTIFICATION_DISMISSED_KEY)
  }

  pub fn with_key(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
    Self {
      storage,
      key: key.into(),
    }
  }

  pub fn is_dismissed(&self) -> Result<bool> {
    Ok(self.storage.get(&self.key)?.as_deref() == Some("true"))
  }

  /// Hide the notice for `days` days.
  pub fn dismiss(&self, days: i64) -> Result<()> {
    let expires_at = Duration::try_days(days)
      .and_then(|period| Utc::now().checked_add_signed(period))
      .ok_or_else(|| eyre!("Invalid dismissal period: {} days", days))?;
    self.storage.set(&self.key, "true", Some(expires_at))
  }
}
