use crate::api::api_types::{
  ApiExposureFileInfo, ApiExposureInfo, ApiInner, EmptyRequest, ExposureInfoRequest,
  ResolveExposurePathRequest, WorkspaceInfoRequest,
};
use crate::api::services::{AuthService, ExposureService, SearchService, WorkspaceService};
use crate::api::types::{
  Exposure, ExposureFileInfo, ExposureInfo, IndexKindResponse, IndexSearchResult,
  IndexesResponse, LoginCredentials, Workspace, WorkspaceInfo,
};
use crate::config::ApiConfig;
use crate::render::html::resolve_html_paths;
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, RwLock};
use tracing::debug;
use url::Url;

/// PMR backend API client
#[derive(Clone)]
pub struct PmrClient {
  http: reqwest::Client,
  base_url: String,
  suffix: String,
  token: Arc<RwLock<Option<String>>>,
}

impl PmrClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("pmrview/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    // Validate early so URL building below can only fail on bad segments
    Url::parse(&config.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.base_url, e))?;

    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      suffix: config.suffix.clone(),
      token: Arc::new(RwLock::new(None)),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// URL of a named POST endpoint, e.g. `{base}/api/get_exposure_info{suffix}`.
  fn endpoint(&self, name: &str) -> String {
    format!("{}/api/{}{}", self.base_url, name, self.suffix)
  }

  /// Append percent-encoded path segments to the base URL.
  fn url_with_segments<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let mut url = Url::parse(&self.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", self.base_url, e))?;

    url
      .path_segments_mut()
      .map_err(|_| eyre!("API base URL cannot carry a path: {}", self.base_url))?
      .pop_if_empty()
      .extend(segments);

    Ok(url.into())
  }

  fn exposure_view_url(
    &self,
    exposure_id: i64,
    exposure_file_id: i64,
    view_key: &str,
    path: &str,
  ) -> Result<String> {
    let exposure_id = exposure_id.to_string();
    let exposure_file_id = exposure_file_id.to_string();
    let head = ["exposure", exposure_id.as_str(), exposure_file_id.as_str(), view_key];
    self.url_with_segments(head.into_iter().chain(path_segments(path)))
  }

  fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
    let token = self
      .token
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    Ok(match token.as_deref() {
      Some(t) => request.bearer_auth(t),
      None => request,
    })
  }

  async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
    let response = self
      .authorize(request)?
      .send()
      .await
      .map_err(|e| eyre!("Failed to {}: {}", what, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Request failed: {}", status.as_u16()));
    }

    Ok(response)
  }

  /// POST a JSON body to a named endpoint and unwrap the `inner` envelope.
  async fn post_inner<B, T>(&self, name: &str, body: &B) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let url = self.endpoint(name);
    debug!(%url, "POST");

    let response = self.send(self.http.post(&url).json(body), name).await?;
    let payload: ApiInner<T> = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse {} response: {}", name, e))?;

    Ok(payload.inner)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
    debug!(%url, "GET");

    let response = self.send(self.http.get(url), "fetch").await?;
    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }

  async fn get_text(&self, url: &str) -> Result<String> {
    debug!(%url, "GET");

    let response = self.send(self.http.get(url), "fetch").await?;
    response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read response from {}: {}", url, e))
  }
}

/// Split a repository path into URL segments, dropping empty ones.
fn path_segments(path: &str) -> impl Iterator<Item = &str> {
  path.split('/').filter(|s| !s.is_empty())
}

#[async_trait]
impl WorkspaceService for PmrClient {
  async fn list_aliased_workspaces(&self) -> Result<Vec<Workspace>> {
    self
      .post_inner("list_aliased_workspaces", &EmptyRequest {})
      .await
  }

  async fn get_workspace_info(
    &self,
    alias: &str,
    commit_id: &str,
    path: &str,
  ) -> Result<WorkspaceInfo> {
    let body = WorkspaceInfoRequest {
      alias,
      commit_id,
      path,
    };
    self
      .post_inner("get_workspace_info", &body)
      .await
      .map_err(|e| eyre!("Failed to get workspace info for {}: {}", alias, e))
  }

  async fn get_raw_file(&self, alias: &str, commit_id: &str, path: &str) -> Result<String> {
    let head = ["workspace", alias, "rawfile", commit_id];
    let url = self.url_with_segments(head.into_iter().chain(path_segments(path)))?;
    self.get_text(&url).await
  }
}

#[async_trait]
impl ExposureService for PmrClient {
  async fn list_aliased_exposures(&self) -> Result<Vec<Exposure>> {
    self
      .post_inner("list_aliased_exposures", &EmptyRequest {})
      .await
  }

  async fn get_exposure_info(&self, alias: &str) -> Result<ExposureInfo> {
    let info: ApiExposureInfo = self
      .post_inner("get_exposure_info", &ExposureInfoRequest { alias })
      .await
      .map_err(|e| eyre!("Failed to get exposure info for {}: {}", alias, e))?;
    Ok(info.into())
  }

  async fn get_exposure_file_info(&self, alias: &str, path: &str) -> Result<ExposureFileInfo> {
    let info: ApiExposureFileInfo = self
      .post_inner(
        "resolve_exposure_path",
        &ResolveExposurePathRequest { alias, path },
      )
      .await
      .map_err(|e| eyre!("Failed to resolve exposure path {}/{}: {}", alias, path, e))?;
    Ok(info.into())
  }

  async fn get_exposure_safe_html(
    &self,
    exposure_id: i64,
    exposure_file_id: i64,
    view_key: &str,
    path: &str,
    route_path: &str,
  ) -> Result<String> {
    let url = self.exposure_view_url(exposure_id, exposure_file_id, view_key, path)?;
    let html = self.get_text(&url).await?;
    Ok(resolve_html_paths(&html, &self.base_url, route_path))
  }

  async fn get_exposure_raw_content(
    &self,
    exposure_id: i64,
    exposure_file_id: i64,
    view_key: &str,
    path: &str,
  ) -> Result<String> {
    let url = self.exposure_view_url(exposure_id, exposure_file_id, view_key, path)?;
    self.get_text(&url).await
  }
}

#[async_trait]
impl SearchService for PmrClient {
  async fn get_indexes(&self) -> Result<IndexesResponse> {
    let url = self.url_with_segments(["api", "index"])?;
    self.get_json(&url).await
  }

  async fn get_index_kind(&self, kind: &str) -> Result<IndexKindResponse> {
    let url = self.url_with_segments(["api", "index", kind])?;
    self.get_json(&url).await
  }

  async fn search_index_term(&self, kind: &str, term: &str) -> Result<IndexSearchResult> {
    let url = self.url_with_segments(["api", "index", kind, term])?;
    self.get_json(&url).await
  }
}

#[async_trait]
impl AuthService for PmrClient {
  async fn login(&self, credentials: &LoginCredentials) -> Result<String> {
    let url = format!("{}/api/bearer/from_login_password", self.base_url);
    let response = self
      .http
      .post(&url)
      .json(credentials)
      .send()
      .await
      .map_err(|e| eyre!("Failed to log in: {}", e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Login failed: {}", status.as_u16()));
    }

    response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read login token: {}", e))
  }

  async fn logout(&self) -> Result<()> {
    let url = format!("{}/api/sign_out", self.base_url);
    let response = self
      .authorize(self.http.post(&url).header("Content-Type", "application/json"))?
      .send()
      .await
      .map_err(|e| eyre!("Failed to log out: {}", e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Logout failed: {}", status.as_u16()));
    }

    Ok(())
  }

  fn set_token(&self, token: Option<String>) -> Result<()> {
    let mut slot = self
      .token
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *slot = token;
    Ok(())
  }
}
