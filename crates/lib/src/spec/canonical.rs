//! Canonical form of a composite index definition.
//!
//! Standard-edition databases implicitly append a `__name__` field to every
//! composite index. Canonicalizing a definition reproduces that so a definition
//! can be compared field-by-field with what the server reports.

use crate::api::{DatabaseEdition, IndexField, Order};
use crate::consts::NAME_FIELD;

use super::types::IndexSpec;

/// Return the canonical form of `index` for a database of `edition`.
///
/// Under Enterprise the index is returned unchanged. Under Standard a
/// `__name__` field is added unless one is already in place, with the order
/// of the last non-vector field (ascending when there is none). When the
/// index ends with a vector field the name field goes right before it.
///
/// Applying this twice yields the same result as applying it once.
pub fn process_index(index: &IndexSpec, edition: DatabaseEdition) -> IndexSpec {
  let mut result = index.clone();
  if edition == DatabaseEdition::Enterprise {
    return result;
  }

  let Some(last) = index.fields.last() else {
    result.fields.push(IndexField::ordered(NAME_FIELD, Order::Ascending));
    return result;
  };
  if last.field_path == NAME_FIELD {
    return result;
  }

  let order = index
    .fields
    .iter()
    .rev()
    .find(|f| f.field_path != NAME_FIELD && !f.is_vector())
    .and_then(|f| f.order)
    .unwrap_or(Order::Ascending);
  let name_field = IndexField::ordered(NAME_FIELD, order);

  if last.is_vector() {
    let position = index.fields.len() - 1;
    let already_present = position > 0 && index.fields[position - 1].field_path == NAME_FIELD;
    if !already_present {
      result.fields.insert(position, name_field);
    }
  } else {
    result.fields.push(name_field);
  }

  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::QueryScope;

  fn spec(fields: Vec<IndexField>) -> IndexSpec {
    IndexSpec::new("posts", QueryScope::Collection, fields)
  }

  #[test]
  fn appends_ascending_name_field() {
    let index = spec(vec![IndexField::ordered("author", Order::Ascending)]);
    let processed = process_index(&index, DatabaseEdition::Standard);
    assert_eq!(
      processed.fields,
      vec![
        IndexField::ordered("author", Order::Ascending),
        IndexField::ordered(NAME_FIELD, Order::Ascending),
      ]
    );
  }

  #[test]
  fn name_field_follows_last_order() {
    let index = spec(vec![
      IndexField::ordered("author", Order::Ascending),
      IndexField::ordered("date", Order::Descending),
    ]);
    let processed = process_index(&index, DatabaseEdition::Standard);
    assert_eq!(processed.fields[2], IndexField::ordered(NAME_FIELD, Order::Descending));
  }

  #[test]
  fn array_field_defaults_name_to_ascending() {
    let index = spec(vec![
      IndexField::ordered("author", Order::Descending),
      IndexField::array_contains("tags"),
    ]);
    let processed = process_index(&index, DatabaseEdition::Standard);
    assert_eq!(processed.fields[2], IndexField::ordered(NAME_FIELD, Order::Ascending));
  }

  #[test]
  fn inserts_before_trailing_vector_field() {
    let index = spec(vec![
      IndexField::ordered("kind", Order::Descending),
      IndexField::vector("embedding", 768),
    ]);
    let processed = process_index(&index, DatabaseEdition::Standard);
    assert_eq!(
      processed.fields,
      vec![
        IndexField::ordered("kind", Order::Descending),
        IndexField::ordered(NAME_FIELD, Order::Descending),
        IndexField::vector("embedding", 768),
      ]
    );
  }

  #[test]
  fn existing_name_field_is_kept() {
    let index = spec(vec![
      IndexField::ordered("author", Order::Ascending),
      IndexField::ordered(NAME_FIELD, Order::Descending),
    ]);
    assert_eq!(process_index(&index, DatabaseEdition::Standard), index);
  }

  #[test]
  fn is_idempotent() {
    let cases = vec![
      spec(vec![]),
      spec(vec![IndexField::ordered("a", Order::Descending)]),
      spec(vec![IndexField::array_contains("tags")]),
      spec(vec![IndexField::vector("embedding", 3)]),
      spec(vec![
        IndexField::ordered("a", Order::Ascending),
        IndexField::vector("embedding", 3),
      ]),
    ];

    for index in cases {
      let once = process_index(&index, DatabaseEdition::Standard);
      let twice = process_index(&once, DatabaseEdition::Standard);
      assert_eq!(once, twice);
    }
  }

  #[test]
  fn enterprise_is_untouched() {
    let index = spec(vec![IndexField::ordered("author", Order::Ascending)]);
    assert_eq!(process_index(&index, DatabaseEdition::Enterprise), index);
  }
}
