//! Serde types matching the PMR backend request and response bodies.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::{Deserialize, Serialize};

use super::types::{ExposureEntity, ExposureFile, ExposureFileInfo, ExposureInfo};

/// Envelope used by every POST endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiInner<T> {
  pub inner: T,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EmptyRequest {}

#[derive(Debug, Serialize)]
pub struct WorkspaceInfoRequest<'a> {
  pub alias: &'a str,
  pub commit_id: &'a str,
  pub path: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ExposureInfoRequest<'a> {
  pub alias: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResolveExposurePathRequest<'a> {
  pub alias: &'a str,
  pub path: &'a str,
}

// ============================================================================
// Exposure detail responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiExposureInfo {
  pub exposure: ExposureEntity,
  #[serde(default)]
  pub files: Vec<(String, bool)>,
  pub workspace_alias: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiExposureFileView {
  pub id: i64,
  pub view_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiExposureFile {
  pub id: i64,
  pub exposure_id: i64,
  #[serde(default)]
  pub workspace_file_path: String,
  pub default_view_id: Option<i64>,
  pub views: Option<Vec<ApiExposureFileView>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiExposureFileInfo {
  pub exposure_file: ApiExposureFile,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiExposureInfo> for ExposureInfo {
  fn from(info: ApiExposureInfo) -> Self {
    ExposureInfo {
      exposure: info.exposure,
      files: info.files,
      workspace_alias: info.workspace_alias,
    }
  }
}

impl From<ApiExposureFileInfo> for ExposureFileInfo {
  fn from(info: ApiExposureFileInfo) -> Self {
    let file = info.exposure_file;
    // Views without a key have not been generated yet
    let view_keys = file
      .views
      .unwrap_or_default()
      .into_iter()
      .filter_map(|v| v.view_key)
      .filter(|k| !k.is_empty())
      .collect();

    ExposureFileInfo {
      exposure_file: ExposureFile {
        id: file.id,
        exposure_id: file.exposure_id,
        workspace_file_path: file.workspace_file_path,
        default_view_id: file.default_view_id,
      },
      view_keys,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{PathTarget, Workspace, WorkspaceInfo};

  #[test]
  fn test_workspace_list_envelope() {
    let json = r#"{"inner": [{
      "alias": "baylor_2002",
      "entity": {
        "id": 682,
        "url": "https://models.physiomeproject.org/workspace/baylor_2002/",
        "superceded_by_id": null,
        "description": "Baylor, Hollingworth, Chandler, 2002",
        "long_description": null,
        "created_ts": 1760311706,
        "exposures": null
      }
    }]}"#;
    let parsed: ApiInner<Vec<Workspace>> = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.inner.len(), 1);
    assert_eq!(parsed.inner[0].alias, "baylor_2002");
    assert_eq!(parsed.inner[0].entity.id, 682);
  }

  #[test]
  fn test_workspace_info_tree_target() {
    let json = r#"{
      "workspace": {"id": 1, "url": "", "superceded_by_id": null, "description": null,
                    "long_description": null, "created_ts": 0, "exposures": null},
      "commit": {"commit_id": "d3cc93", "author": "a", "committer": "c"},
      "path": "",
      "target": {"TreeInfo": {"filecount": 1, "entries": [
        {"filemode": "100644", "kind": "blob", "id": "7f7c", "name": "model.cellml"}
      ]}}
    }"#;
    let info: WorkspaceInfo = serde_json::from_str(json).unwrap();
    match info.target {
      PathTarget::TreeInfo(tree) => {
        assert_eq!(tree.filecount, 1);
        assert_eq!(tree.entries[0].name, "model.cellml");
        assert!(!tree.entries[0].is_tree());
      }
      other => panic!("expected tree, got {:?}", other),
    }
  }

  #[test]
  fn test_exposure_file_views_without_key_are_dropped() {
    let json = r#"{"exposure_file": {
      "id": 7, "exposure_id": 3, "workspace_file_path": "model.cellml",
      "default_view_id": 1,
      "views": [{"id": 1, "view_key": "view"}, {"id": 2, "view_key": null}, {"id": 3, "view_key": "cellml_codegen"}]
    }}"#;
    let api: ApiExposureFileInfo = serde_json::from_str(json).unwrap();
    let info = ExposureFileInfo::from(api);
    assert_eq!(info.exposure_file.workspace_file_path, "model.cellml");
    assert_eq!(info.view_keys, vec!["view", "cellml_codegen"]);
  }
}
