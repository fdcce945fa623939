//! Session storage trait with in-memory and SQLite implementations.
//!
//! Holds the small amount of state that has to survive between runs: the
//! bearer token of a logged-in user and dismissal flags. Entries may carry an
//! expiry; expired entries read as absent.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::cache::lock;

/// Trait for session storage backends.
pub trait SessionStorage: Send + Sync {
  /// Get a value, or `None` if it is missing or expired.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store a value, replacing any previous one.
  fn set(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) -> Result<()>;

  fn remove(&self, key: &str) -> Result<()>;
}

fn is_expired(expires_at: Option<DateTime<Utc>>) -> bool {
  expires_at.is_some_and(|at| at <= Utc::now())
}

/// Storage that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, (String, Option<DateTime<Utc>>)>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl SessionStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let mut entries = lock(&self.entries)?;
    match entries.get(key) {
      Some((_, expires_at)) if is_expired(*expires_at) => {
        entries.remove(key);
        Ok(None)
      }
      Some((value, _)) => Ok(Some(value.clone())),
      None => Ok(None),
    }
  }

  fn set(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) -> Result<()> {
    lock(&self.entries)?.insert(key.to_string(), (value.to_string(), expires_at));
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    lock(&self.entries)?.remove(key);
    Ok(())
  }
}

/// SQLite-based session storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open session database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Storage backed by a private in-memory database.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory session database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("pmrview").join("session.db"))
  }

  /// Run database migrations for session tables.
  fn run_migrations(&self) -> Result<()> {
    lock(&self.conn)?
      .execute_batch(SESSION_SCHEMA)
      .map_err(|e| eyre!("Failed to run session migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for session tables.
const SESSION_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS session_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    expires_at TEXT,
    stored_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SessionStorage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = lock(&self.conn)?;

    let row: Option<(String, Option<String>)> = conn
      .query_row(
        "SELECT value, expires_at FROM session_store WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read session key {}: {}", key, e))?;

    let Some((value, expires_at)) = row else {
      return Ok(None);
    };

    let expires_at = expires_at.as_deref().map(parse_datetime).transpose()?;
    if is_expired(expires_at) {
      conn
        .execute("DELETE FROM session_store WHERE key = ?", params![key])
        .map_err(|e| eyre!("Failed to drop expired session key {}: {}", key, e))?;
      return Ok(None);
    }

    Ok(Some(value))
  }

  fn set(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) -> Result<()> {
    let expires_at = expires_at.map(|at| at.to_rfc3339());

    lock(&self.conn)?
      .execute(
        "INSERT OR REPLACE INTO session_store (key, value, expires_at, stored_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![key, value, expires_at],
      )
      .map_err(|e| eyre!("Failed to store session key {}: {}", key, e))?;

    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    lock(&self.conn)?
      .execute("DELETE FROM session_store WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to remove session key {}: {}", key, e))?;

    Ok(())
  }
}

/// Parse an RFC 3339 expiry stored by [`SqliteStorage::set`].
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn exercise(storage: &dyn SessionStorage) {
    assert_eq!(storage.get("auth_token").unwrap(), None);

    storage.set("auth_token", "t1", None).unwrap();
    assert_eq!(storage.get("auth_token").unwrap().as_deref(), Some("t1"));

    storage.set("auth_token", "t2", None).unwrap();
    assert_eq!(storage.get("auth_token").unwrap().as_deref(), Some("t2"));

    storage.remove("auth_token").unwrap();
    assert_eq!(storage.get("auth_token").unwrap(), None);

    let tomorrow = Utc::now() + Duration::days(1);
    storage.set("notice", "dismissed", Some(tomorrow)).unwrap();
    assert_eq!(storage.get("notice").unwrap().as_deref(), Some("dismissed"));

    let yesterday = Utc::now() - Duration::days(1);
    storage.set("notice", "dismissed", Some(yesterday)).unwrap();
    assert_eq!(storage.get("notice").unwrap(), None);
  }

  #[test]
  fn test_memory_storage() {
    exercise(&MemoryStorage::new());
  }

  #[test]
  fn test_sqlite_storage() {
    exercise(&SqliteStorage::open_in_memory().unwrap());
  }

  #[test]
  fn test_sqlite_expired_row_is_deleted() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage
      .set("k", "v", Some(Utc::now() - Duration::seconds(1)))
      .unwrap();
    assert_eq!(storage.get("k").unwrap(), None);

    let count: i64 = lock(&storage.conn)
      .unwrap()
      .query_row("SELECT COUNT(*) FROM session_store", [], |row| row.get(0))
      .unwrap();
    assert_eq!(count, 0);
  }
}
