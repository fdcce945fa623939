//! Links into the models site: exposure ids and download archives.

use regex::Regex;
use std::sync::LazyLock;

static EXPOSURE_ID: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"/exposure/(\d+)/").expect("valid exposure id regex"));

/// Exposure id embedded in a resource path such as `/exposure/42/1/view`.
pub fn exposure_id_from_resource_path(resource_path: &str) -> Option<i64> {
  EXPOSURE_ID
    .captures(resource_path)
    .and_then(|caps| caps[1].parse().ok())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveUrls {
  pub zip: String,
  pub tgz: String,
}

/// Workspace archive downloads; both empty unless alias and commit are given.
pub fn archive_download_urls(models_url: &str, alias: &str, commit_id: &str) -> ArchiveUrls {
  if alias.is_empty() || commit_id.is_empty() {
    return ArchiveUrls::default();
  }

  let base = format!("{}/workspace/{}/@@archive/{}", models_url, alias, commit_id);
  ArchiveUrls {
    zip: format!("{}/zip", base),
    tgz: format!("{}/tgz", base),
  }
}

/// COMBINE archive generated for an exposure, or `""` without an alias.
pub fn combine_archive_url(models_url: &str, exposure_alias: &str) -> String {
  if exposure_alias.is_empty() {
    return String::new();
  }
  format!("{}/e/{}/download_generated_omex", models_url, exposure_alias)
}

#[cfg(test)]
mod tests {
  use super::*;

  const MODELS: &str = "https://models.physiomeproject.org";

  #[test]
  fn test_exposure_id() {
    assert_eq!(exposure_id_from_resource_path("/exposure/42/1/view"), Some(42));
    assert_eq!(
      exposure_id_from_resource_path("https://x.org/exposure/7/"),
      Some(7)
    );
    assert_eq!(exposure_id_from_resource_path("/exposure/42"), None);
    assert_eq!(exposure_id_from_resource_path("/workspace/42/"), None);
  }

  #[test]
  fn test_archive_urls() {
    let urls = archive_download_urls(MODELS, "beeler_reuter_1977", "abc123");
    assert_eq!(
      urls.zip,
      "https://models.physiomeproject.org/workspace/beeler_reuter_1977/@@archive/abc123/zip"
    );
    assert!(urls.tgz.ends_with("/@@archive/abc123/tgz"));

    assert_eq!(archive_download_urls(MODELS, "", "abc"), ArchiveUrls::default());
    assert_eq!(archive_download_urls(MODELS, "a", ""), ArchiveUrls::default());
  }

  #[test]
  fn test_combine_archive_url() {
    assert_eq!(
      combine_archive_url(MODELS, "beeler_reuter_1977"),
      "https://models.physiomeproject.org/e/beeler_reuter_1977/download_generated_omex"
    );
    assert_eq!(combine_archive_url(MODELS, ""), "");
  }
}
