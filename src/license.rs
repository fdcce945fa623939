//! Human-readable names for licence URLs.

use url::Url;

const LICENSE_NAMES: &[(&str, &str)] = &[
  ("creativecommons.org/licenses/by/3.0", "CC BY 3.0"),
  ("creativecommons.org/licenses/by/4.0", "CC BY 4.0"),
  ("creativecommons.org/licenses/by-sa/3.0", "CC BY-SA 3.0"),
  ("creativecommons.org/licenses/by-sa/4.0", "CC BY-SA 4.0"),
  ("creativecommons.org/licenses/by-nc/3.0", "CC BY-NC 3.0"),
  ("creativecommons.org/licenses/by-nc/4.0", "CC BY-NC 4.0"),
  ("creativecommons.org/licenses/by-nd/3.0", "CC BY-ND 3.0"),
  ("creativecommons.org/licenses/by-nd/4.0", "CC BY-ND 4.0"),
  ("creativecommons.org/licenses/by-nc-sa/3.0", "CC BY-NC-SA 3.0"),
  ("creativecommons.org/licenses/by-nc-sa/4.0", "CC BY-NC-SA 4.0"),
  ("creativecommons.org/licenses/by-nc-nd/3.0", "CC BY-NC-ND 3.0"),
  ("creativecommons.org/licenses/by-nc-nd/4.0", "CC BY-NC-ND 4.0"),
  ("opensource.org/licenses/MIT", "MIT License"),
  ("opensource.org/licenses/Apache-2.0", "Apache License 2.0"),
  ("gnu.org/licenses/gpl-3.0", "GPL 3.0"),
  ("gnu.org/licenses/gpl-2.0", "GPL 2.0"),
  ("gnu.org/licenses/lgpl-3.0", "LGPL 3.0"),
  ("gnu.org/licenses/lgpl-2.0", "LGPL 2.0"),
  ("gnu.org/licenses/agpl-3.0", "AGPL 3.0"),
  ("opensource.org/licenses/BSD-2-Clause", "BSD 2-Clause License"),
  ("opensource.org/licenses/BSD-3-Clause", "BSD 3-Clause License"),
];

/// Name a licence from its URL.
///
/// Unknown URLs fall back to `host - last two path segments` with slashes
/// and hyphens turned into spaces; input that is not a URL is returned as is.
pub fn format_license_url(license_url: &str) -> String {
  if license_url.is_empty() {
    return String::new();
  }

  if let Some((_, name)) = LICENSE_NAMES
    .iter()
    .find(|(fragment, _)| license_url.contains(*fragment))
  {
    return name.to_string();
  }

  let Ok(url) = Url::parse(license_url) else {
    return license_url.to_string();
  };
  let Some(host) = url.host_str() else {
    return license_url.to_string();
  };
  let host = host.replacen("www.", "", 1);

  let segments: Vec<&str> = url
    .path_segments()
    .map(|s| s.filter(|seg| !seg.is_empty()).collect())
    .unwrap_or_default();
  let tail = segments[segments.len().saturating_sub(2)..].join(" ");

  if tail.is_empty() {
    host
  } else {
    format!("{} - {}", host, tail).replace(['/', '-'], " ")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_known_licences() {
    assert_eq!(
      format_license_url("http://creativecommons.org/licenses/by/3.0/"),
      "CC BY 3.0"
    );
    assert_eq!(
      format_license_url("https://opensource.org/licenses/MIT"),
      "MIT License"
    );
    assert_eq!(
      format_license_url("https://www.gnu.org/licenses/gpl-3.0.html"),
      "GPL 3.0"
    );
  }

  #[test]
  fn test_unknown_url_fallback() {
    assert_eq!(
      format_license_url("https://www.example.org/legal/terms/v2"),
      "example.org   terms v2"
    );
    assert_eq!(format_license_url("https://example.org/"), "example.org");
  }

  #[test]
  fn test_not_a_url() {
    assert_eq!(format_license_url(""), "");
    assert_eq!(format_license_url("Public domain"), "Public domain");
  }
}
