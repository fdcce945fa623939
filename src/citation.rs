//! Citation records attached to exposures and their display form.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
  pub family: String,
  pub given: Option<String>,
  #[serde(default)]
  pub other: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
  pub id: String,
  #[serde(default)]
  pub authors: Vec<Author>,
  /// Date string whose leading `YYYY` is the year
  pub issued: Option<String>,
  pub title: Option<String>,
  pub journal: Option<String>,
  pub volume: Option<String>,
  pub first_page: Option<String>,
  pub last_page: Option<String>,
}

/// `Family, G.`
fn format_author(author: &Author) -> String {
  let initial = author
    .given
    .as_deref()
    .and_then(|given| given.chars().next())
    .map(|c| format!("{}.", c.to_uppercase()));

  match initial {
    Some(initial) => format!("{}, {}", author.family, initial),
    None => author.family.clone(),
  }
}

/// APA-like form: `Authors (Year). Title. Journal, Volume, Pages.`
///
/// Missing fields are skipped along with their punctuation.
pub fn format_citation(citation: &Citation) -> String {
  let mut parts = Vec::new();

  let authors: Vec<String> = citation.authors.iter().map(format_author).collect();
  match authors.as_slice() {
    [] => {}
    [only] => parts.push(only.clone()),
    [init @ .., last] => parts.push(format!("{}, & {}", init.join(", "), last)),
  }

  if let Some(issued) = citation.issued.as_deref().filter(|s| !s.is_empty()) {
    let year = issued.split('-').next().unwrap_or(issued);
    parts.push(format!("({})", year));
  }

  if let Some(title) = non_empty(&citation.title) {
    parts.push(format!("{}.", title));
  }

  if let Some(journal) = non_empty(&citation.journal) {
    parts.push(format!("{},", journal));
  }

  if let Some(volume) = non_empty(&citation.volume) {
    let pages = match (non_empty(&citation.first_page), non_empty(&citation.last_page)) {
      (Some(first), Some(last)) => format!(", {}-{}", first, last),
      (Some(first), None) => format!(", {}", first),
      _ => String::new(),
    };
    parts.push(format!("{}{}.", volume, pages));
  }

  parts.join(" ")
}

fn non_empty(field: &Option<String>) -> Option<&str> {
  field.as_deref().filter(|s| !s.is_empty())
}
