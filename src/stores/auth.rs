//! Signed-in session state, persisted through [`SessionStorage`].

use color_eyre::Result;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::api::types::LoginCredentials;
use crate::api::AuthService;
use crate::cache::lock;
use crate::storage::SessionStorage;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USERNAME_KEY: &str = "username";

#[derive(Debug, Clone, Default)]
struct AuthState {
  token: Option<String>,
  username: Option<String>,
}

pub struct AuthStore<S> {
  service: S,
  storage: Arc<dyn SessionStorage>,
  state: Mutex<AuthState>,
}

impl<S: AuthService> AuthStore<S> {
  pub fn new(service: S, storage: Arc<dyn SessionStorage>) -> Self {
    Self {
      service,
      storage,
      state: Mutex::new(AuthState::default()),
    }
  }

  /// Restore a stored session. Both the token and the username must be present.
  pub fn init_auth(&self) -> Result<bool> {
    let token = self.storage.get(AUTH_TOKEN_KEY)?.filter(|t| !t.is_empty());
    let username = self.storage.get(USERNAME_KEY)?.filter(|u| !u.is_empty());

    match (token, username) {
      (Some(token), Some(username)) => {
        self.service.set_token(Some(token.clone()))?;
        *lock(&self.state)? = AuthState {
          token: Some(token),
          username: Some(username),
        };
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  pub async fn login(&self, username: &str, password: &str) -> Result<()> {
    let credentials = LoginCredentials {
      login: username.to_string(),
      password: password.to_string(),
    };
    let token = self.service.login(&credentials).await?;
    self.set_auth(&token, username)?;
    info!(username, "signed in");
    Ok(())
  }

  /// Sign out remotely, then forget the local session even if that failed.
  pub async fn logout(&self) -> Result<()> {
    let remote = self.service.logout().await;
    if let Err(e) = &remote {
      warn!(error = %e, "remote sign out failed");
    }
    self.clear_auth()?;
    remote
  }

  pub fn set_auth(&self, token: &str, username: &str) -> Result<()> {
    self.storage.set(AUTH_TOKEN_KEY, token, None)?;
    self.storage.set(USERNAME_KEY, username, None)?;
    self.service.set_token(Some(token.to_string()))?;
    *lock(&self.state)? = AuthState {
      token: Some(token.to_string()),
      username: Some(username.to_string()),
    };
    Ok(())
  }

  pub fn clear_auth(&self) -> Result<()> {
    self.storage.remove(AUTH_TOKEN_KEY)?;
    self.storage.remove(USERNAME_KEY)?;
    self.service.set_token(None)?;
    *lock(&self.state)? = AuthState::default();
    Ok(())
  }

  pub fn is_authenticated(&self) -> bool {
    lock(&self.state).map(|s| s.token.is_some()).unwrap_or(false)
  }

  pub fn token(&self) -> Option<String> {
    lock(&self.state).ok().and_then(|s| s.token.clone())
  }

  pub fn username(&self) -> Option<String> {
    lock(&self.state).ok().and_then(|s| s.username.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::MemoryStorage;
  use async_trait::async_trait;
  use color_eyre::eyre::eyre;

  #[derive(Default)]
  struct FakeAuth {
    token: Mutex<Option<String>>,
    fail_logout: bool,
  }

  #[async_trait]
  impl AuthService for FakeAuth {
    async fn login(&self, credentials: &LoginCredentials) -> Result<String> {
      if credentials.password == "secret" {
        Ok(format!("token-for-{}", credentials.login))
      } else {
        Err(eyre!("Login failed: 401 Unauthorized"))
      }
    }

    async fn logout(&self) -> Result<()> {
      if self.fail_logout {
        Err(eyre!("Logout failed: 500 Internal Server Error"))
      } else {
        Ok(())
      }
    }

    fn set_token(&self, token: Option<String>) -> Result<()> {
      *lock(&self.token)? = token;
      Ok(())
    }
  }

  fn store(service: FakeAuth) -> (AuthStore<FakeAuth>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (AuthStore::new(service, storage.clone()), storage)
  }

  #[tokio::test]
  async fn test_login_persists_session() {
    let (store, storage) = store(FakeAuth::default());
    store.login("alice", "secret").await.unwrap();

    assert!(store.is_authenticated());
    assert_eq!(store.username().as_deref(), Some("alice"));
    assert_eq!(store.token().as_deref(), Some("token-for-alice"));
    assert_eq!(
      storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(),
      Some("token-for-alice")
    );
    assert_eq!(
      lock(&store.service.token).unwrap().as_deref(),
      Some("token-for-alice")
    );
  }

  #[tokio::test]
  async fn test_failed_login_leaves_state_alone() {
    let (store, storage) = store(FakeAuth::default());
    let err = store.login("alice", "wrong").await.unwrap_err();
    assert!(err.to_string().contains("401"));
    assert!(!store.is_authenticated());
    assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
  }

  #[tokio::test]
  async fn test_logout_clears_even_when_remote_fails() {
    let (store, storage) = store(FakeAuth {
      fail_logout: true,
      ..Default::default()
    });
    store.set_auth("t", "bob").unwrap();

    assert!(store.logout().await.is_err());
    assert!(!store.is_authenticated());
    assert_eq!(store.username(), None);
    assert_eq!(storage.get(USERNAME_KEY).unwrap(), None);
    assert_eq!(*lock(&store.service.token).unwrap(), None);
  }

  #[test]
  fn test_init_auth_needs_token_and_username() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(AUTH_TOKEN_KEY, "stored", None).unwrap();

    let store = AuthStore::new(FakeAuth::default(), storage.clone());
    assert!(!store.init_auth().unwrap());
    assert!(!store.is_authenticated());

    storage.set(USERNAME_KEY, "carol", None).unwrap();
    assert!(store.init_auth().unwrap());
    assert_eq!(store.username().as_deref(), Some("carol"));
    assert_eq!(
      lock(&store.service.token).unwrap().as_deref(),
      Some("stored")
    );
  }

  #[test]
  fn test_init_auth_ignores_empty_values() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(AUTH_TOKEN_KEY, "", None).unwrap();
    storage.set(USERNAME_KEY, "carol", None).unwrap();

    let store = AuthStore::new(FakeAuth::default(), storage.clone());
    assert!(!store.init_auth().unwrap());
    assert!(!store.is_authenticated());
    assert_eq!(*lock(&store.service.token).unwrap(), None);

    storage.set(AUTH_TOKEN_KEY, "stored", None).unwrap();
    storage.set(USERNAME_KEY, "", None).unwrap();
    assert!(!store.init_auth().unwrap());
    assert_eq!(store.username(), None);
  }
}
