use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workspace as returned by the aliased listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
  pub alias: String,
  pub entity: WorkspaceEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceEntity {
  pub id: i64,
  #[serde(default)]
  pub url: String,
  pub superceded_by_id: Option<i64>,
  pub description: Option<String>,
  pub long_description: Option<String>,
  #[serde(default)]
  pub created_ts: i64,
  pub exposures: Option<Value>,
}

/// Exposure as returned by the aliased listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
  pub alias: String,
  pub entity: ExposureEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureEntity {
  pub id: i64,
  pub description: Option<String>,
  #[serde(default)]
  pub workspace_id: i64,
  pub workspace_tag_id: Option<i64>,
  #[serde(default)]
  pub commit_id: String,
  #[serde(default)]
  pub created_ts: i64,
  pub default_file_id: Option<i64>,
  pub files: Option<Value>,
}

/// A workspace at a given commit and path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
  pub workspace: WorkspaceEntity,
  pub commit: CommitInfo,
  #[serde(default)]
  pub path: String,
  pub target: PathTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
  pub commit_id: String,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub committer: String,
}

/// What a workspace path points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathTarget {
  TreeInfo(TreeInfo),
  FileInfo(FileInfo),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeInfo {
  #[serde(default)]
  pub filecount: u64,
  #[serde(default)]
  pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
  pub filemode: String,
  pub kind: String, // "blob" or "tree"
  pub id: String,
  pub name: String,
}

impl TreeEntry {
  pub fn is_tree(&self) -> bool {
    self.kind == "tree"
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
  #[serde(default)]
  pub size: u64,
  #[serde(default)]
  pub binary: bool,
  pub mime_type: Option<String>,
}

/// Exposure detail with its file listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureInfo {
  pub exposure: ExposureEntity,
  /// Workspace file paths and whether each one is exposed
  pub files: Vec<(String, bool)>,
  pub workspace_alias: Option<String>,
}

/// Exposure file resolved from an exposure alias and path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureFileInfo {
  pub exposure_file: ExposureFile,
  pub view_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureFile {
  pub id: i64,
  pub exposure_id: i64,
  pub workspace_file_path: String,
  pub default_view_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexesResponse {
  #[serde(default)]
  pub indexes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindInfo {
  pub id: i64,
  pub description: String,
}

/// Terms recorded under one index kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexKindResponse {
  pub kind: KindInfo,
  #[serde(default)]
  pub terms: Vec<String>,
}

/// Matches for a single index term; the shape is owned by the backend
pub type IndexSearchResult = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
  pub login: String,
  pub password: String,
}
