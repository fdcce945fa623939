//! Search index kinds and term filtering.

/// Known index kinds with their display labels, in display order.
pub const SEARCH_CATEGORIES: &[(&str, &str)] = &[
  ("model_author", "Model authors"),
  ("citation_author_family_name", "Publication authors"),
  ("cellml_keyword", "CellML keywords"),
  ("citation_id", "Publication references"),
];

pub const DEFAULT_SEARCH_KIND: &str = "cellml_keyword";

/// Label for an index kind; unknown kinds are shown by name.
pub fn category_label(kind: &str) -> &str {
  SEARCH_CATEGORIES
    .iter()
    .find(|(value, _)| *value == kind)
    .map(|(_, label)| *label)
    .unwrap_or(kind)
}

/// Whether a term is worth offering: non-blank and not a bare `...pubmed:` URN.
pub fn is_valid_term(term: &str) -> bool {
  let trimmed = term.trim();
  !trimmed.is_empty() && !trimmed.ends_with("pubmed:")
}
