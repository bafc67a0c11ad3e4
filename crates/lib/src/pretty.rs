//! One-line plain-text summaries of indexes and field overrides.
//!
//! ```text
//! (posts) -- (author,ASCENDING) (embedding,VECTOR<768>)
//! [posts.published] -- (ASCENDING) (CONTAINS) TTL(ACTIVE)
//! ```
//!
//! `__name__` fields are implied by every index and never shown.

use crate::api::names::index_collection_group;
use crate::api::{Field, Index, IndexField, WireEnum, parse_field_name};
use crate::consts::NAME_FIELD;
use crate::spec::{FieldOverrideSpec, IndexSpec};

fn field_config(field: &IndexField) -> String {
  if let Some(order) = field.order {
    order.as_str().to_string()
  } else if let Some(config) = field.array_config {
    config.as_str().to_string()
  } else if let Some(vector) = &field.vector_config {
    format!("VECTOR<{}>", vector.dimension)
  } else {
    "?".to_string()
  }
}

fn fields_summary(fields: &[IndexField]) -> String {
  fields
    .iter()
    .filter(|f| f.field_path != NAME_FIELD)
    .map(|f| format!("({},{})", f.field_path, field_config(f)))
    .collect::<Vec<_>>()
    .join(" ")
}

fn modes_summary<I: Iterator<Item = String>>(modes: I) -> String {
  let modes: Vec<String> = modes.map(|m| format!(" ({m})")).collect();
  if modes.is_empty() {
    " (no indexes)".to_string()
  } else {
    modes.concat()
  }
}

/// Summary of a live index. The state is left to the caller, which may color it.
pub fn index_summary(index: &Index) -> String {
  let group = index_collection_group(index.name.as_deref()).unwrap_or_else(|| "?".to_string());
  format!("({group}) -- {}", fields_summary(&index.fields))
}

pub fn spec_index_summary(index: &IndexSpec) -> String {
  format!("({}) -- {}", index.collection_group, fields_summary(&index.fields))
}

/// Summary of a live field override, including its TTL state when it has one.
pub fn field_summary(field: &Field) -> String {
  let (group, path) = match parse_field_name(&field.name) {
    Some(name) => (name.collection_group, name.field_path),
    None => ("?".to_string(), field.name.clone()),
  };

  let modes = field.index_config.indexes.iter().map(|index| {
    index
      .first_mode()
      .map(|m| m.to_string())
      .unwrap_or_else(|| "?".to_string())
  });

  let mut result = format!("[{group}.{path}] --{}", modes_summary(modes));
  if let Some(ttl) = &field.ttl_config {
    let state = ttl.state.map(|s| s.as_str()).unwrap_or("STATE_UNSPECIFIED");
    result.push_str(&format!(" TTL({state})"));
  }
  result
}

pub fn spec_field_summary(field: &FieldOverrideSpec) -> String {
  let modes = field
    .indexes
    .iter()
    .map(|index| index.mode().map(|m| m.to_string()).unwrap_or_else(|| "?".to_string()));

  let mut result = format!(
    "[{}.{}] --{}",
    field.collection_group,
    field.field_path,
    modes_summary(modes)
  );
  match field.ttl {
    Some(true) => result.push_str(" TTL(ENABLED)"),
    Some(false) => result.push_str(" TTL(DISABLED)"),
    None => {}
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{IndexConfig, IndexState, Order, QueryScope, TtlConfig, TtlState};
  use crate::spec::FieldIndexSpec;

  #[test]
  fn index_summary_skips_name_field() {
    let index = Index {
      name: Some("projects/p/databases/(default)/collectionGroups/posts/indexes/abc".to_string()),
      query_scope: QueryScope::Collection,
      fields: vec![
        IndexField::ordered("author", Order::Ascending),
        IndexField::ordered(NAME_FIELD, Order::Ascending),
        IndexField::vector("embedding", 768),
      ],
      api_scope: None,
      density: None,
      multikey: None,
      unique: None,
      state: Some(IndexState::Ready),
    };

    assert_eq!(
      index_summary(&index),
      "(posts) -- (author,ASCENDING) (embedding,VECTOR<768>)"
    );
  }

  #[test]
  fn spec_index_summary_shows_array_config() {
    let index = IndexSpec::new(
      "posts",
      QueryScope::CollectionGroup,
      vec![
        IndexField::array_contains("tags"),
        IndexField::ordered("date", Order::Descending),
      ],
    );
    assert_eq!(spec_index_summary(&index), "(posts) -- (tags,CONTAINS) (date,DESCENDING)");
  }

  #[test]
  fn field_summary_lists_modes_and_ttl() {
    let nested = |field: IndexField| Index {
      name: None,
      query_scope: QueryScope::Collection,
      fields: vec![field],
      api_scope: None,
      density: None,
      multikey: None,
      unique: None,
      state: None,
    };
    let field = Field {
      name: "projects/p/databases/(default)/collectionGroups/posts/fields/published".to_string(),
      index_config: IndexConfig {
        indexes: vec![
          nested(IndexField::ordered("published", Order::Ascending)),
          nested(IndexField::array_contains("published")),
        ],
        ..Default::default()
      },
      ttl_config: Some(TtlConfig {
        state: Some(TtlState::Active),
      }),
    };

    assert_eq!(
      field_summary(&field),
      "[posts.published] -- (ASCENDING) (CONTAINS) TTL(ACTIVE)"
    );
  }

  #[test]
  fn empty_field_override_says_no_indexes() {
    let field = FieldOverrideSpec::new("posts", "body", vec![]);
    assert_eq!(spec_field_summary(&field), "[posts.body] -- (no indexes)");

    let field = FieldOverrideSpec::new(
      "posts",
      "expireAt",
      vec![FieldIndexSpec::ordered(QueryScope::Collection, Order::Ascending)],
    )
    .with_ttl(true);
    assert_eq!(spec_field_summary(&field), "[posts.expireAt] -- (ASCENDING) TTL(ENABLED)");
  }
}
