//! Sorting for workspace and exposure listings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::api::types::{Exposure, Workspace};

/// Entities that carry an id, an optional description and a creation time.
pub trait SortableEntity {
  fn sort_id(&self) -> i64;
  fn sort_description(&self) -> Option<&str>;
  fn sort_created_ts(&self) -> i64;
}

impl SortableEntity for Workspace {
  fn sort_id(&self) -> i64 {
    self.entity.id
  }

  fn sort_description(&self) -> Option<&str> {
    self.entity.description.as_deref()
  }

  fn sort_created_ts(&self) -> i64 {
    self.entity.created_ts
  }
}

impl SortableEntity for Exposure {
  fn sort_id(&self) -> i64 {
    self.entity.id
  }

  fn sort_description(&self) -> Option<&str> {
    self.entity.description.as_deref()
  }

  fn sort_created_ts(&self) -> i64 {
    self.entity.created_ts
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
  #[default]
  Description,
  Id,
  Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

/// A `{field}-{direction}` sort key such as `description-asc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOption {
  pub field: SortField,
  pub direction: SortDirection,
}

impl SortOption {
  pub const fn new(field: SortField, direction: SortDirection) -> Self {
    Self { field, direction }
  }
}

impl fmt::Display for SortOption {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let field = match self.field {
      SortField::Description => "description",
      SortField::Id => "id",
      SortField::Date => "date",
    };
    let direction = match self.direction {
      SortDirection::Asc => "asc",
      SortDirection::Desc => "desc",
    };
    write!(f, "{}-{}", field, direction)
  }
}

impl FromStr for SortOption {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (field, direction) = s
      .trim()
      .split_once('-')
      .ok_or_else(|| format!("Invalid sort option '{}': expected FIELD-DIRECTION", s))?;

    let field = match field.to_lowercase().as_str() {
      "description" => SortField::Description,
      "id" => SortField::Id,
      "date" => SortField::Date,
      other => return Err(format!("Unknown sort field '{}'", other)),
    };
    let direction = match direction.to_lowercase().as_str() {
      "asc" => SortDirection::Asc,
      "desc" => SortDirection::Desc,
      other => return Err(format!("Unknown sort direction '{}'", other)),
    };

    Ok(Self { field, direction })
  }
}

/// A labelled group of sort choices for pickers.
#[derive(Debug, Clone, Copy)]
pub struct SortOptionGroup {
  pub group: &'static str,
  /// (value, label)
  pub options: &'static [(&'static str, &'static str)],
}

/// Fields and directions offered to users, in display order.
pub const SORT_OPTION_GROUPS: &[SortOptionGroup] = &[
  SortOptionGroup {
    group: "Fields",
    options: &[("description", "Description"), ("id", "ID"), ("date", "Date")],
  },
  SortOptionGroup {
    group: "Direction",
    options: &[("asc", "Ascending"), ("desc", "Descending")],
  },
];

/// Return a sorted copy of `items`; the input is left as it was.
///
/// Missing descriptions sort last in both directions.
pub fn sort_entities<T: SortableEntity + Clone>(items: &[T], sort_by: SortOption) -> Vec<T> {
  let mut sorted = items.to_vec();
  sorted.sort_by(|a, b| compare(a, b, sort_by));
  sorted
}

fn compare<T: SortableEntity>(a: &T, b: &T, sort_by: SortOption) -> Ordering {
  let desc = sort_by.direction == SortDirection::Desc;
  let directed = |ordering: Ordering| if desc { ordering.reverse() } else { ordering };

  match sort_by.field {
    SortField::Description => match (a.sort_description(), b.sort_description()) {
      (None, None) => Ordering::Equal,
      (None, Some(_)) => Ordering::Greater,
      (Some(_), None) => Ordering::Less,
      (Some(x), Some(y)) => directed(locale_compare(x, y)),
    },
    SortField::Id => directed(a.sort_id().cmp(&b.sort_id())),
    SortField::Date => directed(a.sort_created_ts().cmp(&b.sort_created_ts())),
  }
}

/// Collation in three levels: base letters ignoring case and accents, then
/// accents (unaccented first), then case (lowercase first).
pub fn locale_compare(a: &str, b: &str) -> Ordering {
  collation_key(a, false)
    .cmp(&collation_key(b, false))
    .then_with(|| collation_key(a, true).cmp(&collation_key(b, true)))
    .then_with(|| b.cmp(a))
}

/// Lowercased canonical decomposition, optionally without combining marks.
fn collation_key(s: &str, keep_marks: bool) -> String {
  s.nfd()
    .filter(|c| keep_marks || !is_combining_mark(*c))
    .flat_map(char::to_lowercase)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Item {
    id: i64,
    description: Option<&'static str>,
    created_ts: i64,
  }

  impl SortableEntity for Item {
    fn sort_id(&self) -> i64 {
      self.id
    }

    fn sort_description(&self) -> Option<&str> {
      self.description
    }

    fn sort_created_ts(&self) -> i64 {
      self.created_ts
    }
  }

  fn items() -> Vec<Item> {
    vec![
      Item {
        id: 2,
        description: Some("Zebra model"),
        created_ts: 1704153600,
      },
      Item {
        id: 3,
        description: None,
        created_ts: 1704067200,
      },
      Item {
        id: 1,
        description: Some("apple model"),
        created_ts: 1704240000,
      },
    ]
  }

  fn descriptions(items: &[Item]) -> Vec<Option<&'static str>> {
    items.iter().map(|i| i.description).collect()
  }

  #[test]
  fn test_parse_and_display() {
    let option: SortOption = "date-desc".parse().unwrap();
    assert_eq!(option, SortOption::new(SortField::Date, SortDirection::Desc));
    assert_eq!(option.to_string(), "date-desc");
    assert_eq!(SortOption::default().to_string(), "description-asc");
    assert!("name-asc".parse::<SortOption>().is_err());
    assert!("id".parse::<SortOption>().is_err());
  }

  #[test]
  fn test_description_ascending_is_case_insensitive() {
    let sorted = sort_entities(&items(), "description-asc".parse().unwrap());
    assert_eq!(
      descriptions(&sorted),
      vec![Some("apple model"), Some("Zebra model"), None]
    );
  }

  #[test]
  fn test_missing_description_last_when_descending() {
    let sorted = sort_entities(&items(), "description-desc".parse().unwrap());
    assert_eq!(
      descriptions(&sorted),
      vec![Some("Zebra model"), Some("apple model"), None]
    );
  }

  #[test]
  fn test_numeric_fields() {
    let by_id: Vec<i64> = sort_entities(&items(), "id-asc".parse().unwrap())
      .iter()
      .map(|i| i.id)
      .collect();
    assert_eq!(by_id, vec![1, 2, 3]);

    let by_id_desc: Vec<i64> = sort_entities(&items(), "id-desc".parse().unwrap())
      .iter()
      .map(|i| i.id)
      .collect();
    assert_eq!(by_id_desc, vec![3, 2, 1]);

    let by_date: Vec<i64> = sort_entities(&items(), "date-asc".parse().unwrap())
      .iter()
      .map(|i| i.created_ts)
      .collect();
    assert_eq!(by_date, vec![1704067200, 1704153600, 1704240000]);

    let by_date_desc: Vec<i64> = sort_entities(&items(), "date-desc".parse().unwrap())
      .iter()
      .map(|i| i.created_ts)
      .collect();
    assert_eq!(by_date_desc, vec![1704240000, 1704153600, 1704067200]);
  }

  #[test]
  fn test_input_is_not_mutated() {
    let original = items();
    let sorted = sort_entities(&original, "id-asc".parse().unwrap());
    assert_eq!(original, items());
    assert_ne!(sorted, original);
  }

  #[test]
  fn test_locale_compare_ties() {
    assert_eq!(locale_compare("a", "A"), Ordering::Less);
    assert_eq!(locale_compare("b", "A"), Ordering::Greater);
    assert_eq!(locale_compare("same", "same"), Ordering::Equal);
  }

  #[test]
  fn test_locale_compare_folds_accents() {
    assert_eq!(locale_compare("Émile", "Zebra"), Ordering::Less);
    assert_eq!(locale_compare("Östergren", "Zebra"), Ordering::Less);
    assert_eq!(locale_compare("émile", "Emile"), Ordering::Greater);
    assert_eq!(locale_compare("emile", "émile"), Ordering::Less);
    assert_eq!(locale_compare("Émile", "emilf"), Ordering::Less);
    // Precomposed and decomposed forms collate together
    assert_eq!(collation_key("\u{e9}", true), collation_key("e\u{301}", true));
    assert_eq!(collation_key("Émile", false), "emile");
  }

  #[test]
  fn test_accented_descriptions_sort_with_their_base_letter() {
    let mut list = items();
    list.push(Item {
      id: 4,
      description: Some("Ébauche model"),
      created_ts: 1704326400,
    });
    let sorted = sort_entities(&list, "description-asc".parse().unwrap());
    assert_eq!(
      descriptions(&sorted),
      vec![
        Some("apple model"),
        Some("Ébauche model"),
        Some("Zebra model"),
        None
      ]
    );
  }

  #[test]
  fn test_option_groups() {
    assert_eq!(SORT_OPTION_GROUPS.len(), 2);
    assert_eq!(SORT_OPTION_GROUPS[0].group, "Fields");
    assert!(SORT_OPTION_GROUPS[1].options.contains(&("desc", "Descending")));
    for (value, _) in SORT_OPTION_GROUPS[0].options {
      assert!(format!("{}-asc", value).parse::<SortOption>().is_ok());
    }
  }
}
