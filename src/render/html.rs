//! Rewriting of relative asset and link paths in fetched HTML fragments.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static PARENT_RELATIVE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(src|href)="(?:\.\./)+"#).expect("valid parent path regex"));
static DOT_RELATIVE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(src|href)="\./"#).expect("valid dot path regex"));
static ROOT_RELATIVE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(src|href)="/"#).expect("valid root path regex"));

/// Resolve relative `src`/`href` paths in an HTML fragment against the API.
///
/// - `../` at any depth and `./` become `{base_url}{route_path}/`
/// - a single leading `/` becomes `{base_url}/`
///
/// Dot-relative paths are rewritten before root-relative ones so a rewritten
/// path is never rewritten twice. Absolute (`http://`, `https://`),
/// protocol-relative (`//`), `data:` and `blob:` URLs are left untouched.
pub fn resolve_html_paths(html: &str, base_url: &str, route_path: &str) -> String {
  let route_prefix = format!("{base_url}{route_path}/");

  let result = PARENT_RELATIVE.replace_all(html, |caps: &Captures| {
    format!(r#"{}="{route_prefix}"#, &caps[1])
  });
  let result = DOT_RELATIVE.replace_all(&result, |caps: &Captures| {
    format!(r#"{}="{route_prefix}"#, &caps[1])
  });

  // `replace_all` has no lookahead, so protocol-relative matches are put back
  // unchanged by checking the byte that follows.
  let rest = result.as_ref();
  ROOT_RELATIVE
    .replace_all(rest, |caps: &Captures| {
      let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
      if rest.as_bytes().get(end) == Some(&b'/') {
        caps[0].to_string()
      } else {
        format!(r#"{}="{base_url}/"#, &caps[1])
      }
    })
    .into_owned()
}
