//! Service seams the stores are generic over.
//!
//! [`PmrClient`](super::PmrClient) implements all of them against the backend;
//! tests substitute in-memory fakes.

use async_trait::async_trait;
use color_eyre::Result;

use super::types::{
  Exposure, ExposureFileInfo, ExposureInfo, IndexKindResponse, IndexSearchResult,
  IndexesResponse, LoginCredentials, Workspace, WorkspaceInfo,
};

#[async_trait]
pub trait WorkspaceService: Send + Sync {
  async fn list_aliased_workspaces(&self) -> Result<Vec<Workspace>>;

  async fn get_workspace_info(&self, alias: &str, commit_id: &str, path: &str)
    -> Result<WorkspaceInfo>;

  /// Raw file contents at a commit.
  async fn get_raw_file(&self, alias: &str, commit_id: &str, path: &str) -> Result<String>;
}

#[async_trait]
pub trait ExposureService: Send + Sync {
  async fn list_aliased_exposures(&self) -> Result<Vec<Exposure>>;

  async fn get_exposure_info(&self, alias: &str) -> Result<ExposureInfo>;

  async fn get_exposure_file_info(&self, alias: &str, path: &str) -> Result<ExposureFileInfo>;

  /// Rendered view fragment with relative links rewritten against `route_path`.
  async fn get_exposure_safe_html(
    &self,
    exposure_id: i64,
    exposure_file_id: i64,
    view_key: &str,
    path: &str,
    route_path: &str,
  ) -> Result<String>;

  async fn get_exposure_raw_content(
    &self,
    exposure_id: i64,
    exposure_file_id: i64,
    view_key: &str,
    path: &str,
  ) -> Result<String>;
}

#[async_trait]
pub trait SearchService: Send + Sync {
  async fn get_indexes(&self) -> Result<IndexesResponse>;

  async fn get_index_kind(&self, kind: &str) -> Result<IndexKindResponse>;

  async fn search_index_term(&self, kind: &str, term: &str) -> Result<IndexSearchResult>;
}

#[async_trait]
pub trait AuthService: Send + Sync {
  /// Exchange credentials for a bearer token.
  async fn login(&self, credentials: &LoginCredentials) -> Result<String>;

  async fn logout(&self) -> Result<()>;

  /// Attach (or drop) the bearer token sent with subsequent requests.
  fn set_token(&self, token: Option<String>) -> Result<()>;
}
