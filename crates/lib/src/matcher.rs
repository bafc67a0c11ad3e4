//! Semantic equivalence between live resources and index file entries.
//!
//! Both functions are used in both directions of a diff: to decide whether a
//! wanted entry already exists, and whether an existing entry is still wanted.

use tracing::info;

use crate::api::names::index_collection_group;
use crate::api::{ApiScope, DatabaseEdition, Field, Index, IndexMode, parse_field_name};
use crate::spec::{FieldOverrideSpec, IndexSpec, process_index};

const DEFAULT_API_SCOPE: ApiScope = ApiScope::AnyApi;
const DEFAULT_MULTIKEY: bool = false;

/// Whether `live` is the index described by `spec` on a database of `edition`.
///
/// Unset attributes take their server defaults on both sides. Under Standard
/// `spec` is canonicalized first, so callers pass it as written.
pub fn index_matches_spec(live: &Index, spec: &IndexSpec, edition: DatabaseEdition) -> bool {
  if index_collection_group(live.name.as_deref()).as_deref() != Some(spec.collection_group.as_str()) {
    return false;
  }

  if live.query_scope != spec.query_scope {
    return false;
  }

  if live.api_scope.unwrap_or(DEFAULT_API_SCOPE) != spec.api_scope.unwrap_or(DEFAULT_API_SCOPE) {
    return false;
  }

  let default_density = edition.default_density();
  if live.density.unwrap_or(default_density) != spec.density.unwrap_or(default_density) {
    return false;
  }

  if live.multikey.unwrap_or(DEFAULT_MULTIKEY) != spec.multikey.unwrap_or(DEFAULT_MULTIKEY) {
    return false;
  }

  let canonical = match edition {
    DatabaseEdition::Standard => process_index(spec, edition),
    DatabaseEdition::Enterprise => spec.clone(),
  };

  // IndexField equality covers path, order, array config and the full vector config.
  live.fields == canonical.fields
}

/// Whether the live field override `live` already satisfies `spec`.
///
/// An unset `ttl` never fails a match. When the live field has a TTL policy
/// `spec` does not mention, a notice is logged and the policy is left alone.
pub fn field_matches_spec(live: &Field, spec: &FieldOverrideSpec) -> bool {
  let Some(name) = parse_field_name(&live.name) else {
    return false;
  };
  if name.collection_group != spec.collection_group || name.field_path != spec.field_path {
    return false;
  }

  let live_ttl = live.ttl_config.is_some();
  match spec.ttl {
    Some(wanted) if wanted != live_ttl => return false,
    Some(_) => {}
    None if live_ttl => {
      info!(
        collection_group = %spec.collection_group,
        field_path = %spec.field_path,
        "field has a TTL policy that is not in the index file; leaving it in place"
      );
    }
    None => {}
  }

  let live_modes: Vec<Option<IndexMode>> = live.index_config.indexes.iter().map(Index::first_mode).collect();
  let spec_modes: Vec<Option<IndexMode>> = spec.indexes.iter().map(|i| i.mode()).collect();

  live_modes.len() == spec_modes.len()
    && live_modes.iter().all(|mode| spec_modes.contains(mode))
    && spec_modes.iter().all(|mode| live_modes.contains(mode))
}

#[cfg(test)]
mod tests {
  use tracing_test::traced_test;

  use super::*;
  use crate::api::{Density, IndexConfig, IndexField, Order, QueryScope, TtlConfig, TtlState};
  use crate::consts::NAME_FIELD;
  use crate::spec::FieldIndexSpec;

  const POSTS_INDEX: &str = "projects/p/databases/(default)/collectionGroups/posts/indexes/abc";
  const FIELD_PREFIX: &str = "projects/p/databases/(default)/collectionGroups/posts/fields/";

  fn live_index(fields: Vec<IndexField>) -> Index {
    Index {
      name: Some(POSTS_INDEX.to_string()),
      query_scope: QueryScope::Collection,
      fields,
      api_scope: None,
      density: None,
      multikey: None,
      unique: None,
      state: None,
    }
  }

  fn field_index(query_scope: QueryScope, field: IndexField) -> Index {
    Index {
      name: None,
      query_scope,
      fields: vec![field],
      api_scope: None,
      density: None,
      multikey: None,
      unique: None,
      state: None,
    }
  }

  fn live_field(path: &str, indexes: Vec<Index>, ttl: bool) -> Field {
    Field {
      name: format!("{FIELD_PREFIX}{path}"),
      index_config: IndexConfig {
        indexes,
        ..Default::default()
      },
      ttl_config: ttl.then(|| TtlConfig {
        state: Some(TtlState::Active),
      }),
    }
  }

  fn author_spec() -> IndexSpec {
    IndexSpec::new(
      "posts",
      QueryScope::Collection,
      vec![IndexField::ordered("author", Order::Ascending)],
    )
  }

  #[test]
  fn standard_live_index_matches_spec_without_name_field() {
    let live = live_index(vec![
      IndexField::ordered("author", Order::Ascending),
      IndexField::ordered(NAME_FIELD, Order::Ascending),
    ]);
    assert!(index_matches_spec(&live, &author_spec(), DatabaseEdition::Standard));
  }

  #[test]
  fn canonicalized_spec_matches_the_same_way() {
    let live = live_index(vec![
      IndexField::ordered("author", Order::Ascending),
      IndexField::ordered(NAME_FIELD, Order::Ascending),
    ]);
    let spec = author_spec();
    let canonical = process_index(&spec, DatabaseEdition::Standard);
    assert_eq!(
      index_matches_spec(&live, &spec, DatabaseEdition::Standard),
      index_matches_spec(&live, &canonical, DatabaseEdition::Standard)
    );
  }

  #[test]
  fn enterprise_does_not_synthesize_name_field() {
    let live = live_index(vec![IndexField::ordered("author", Order::Ascending)]);
    assert!(index_matches_spec(&live, &author_spec(), DatabaseEdition::Enterprise));
    assert!(!index_matches_spec(&live, &author_spec(), DatabaseEdition::Standard));
  }

  #[test]
  fn collection_group_and_scope_must_match() {
    let live = live_index(vec![
      IndexField::ordered("author", Order::Ascending),
      IndexField::ordered(NAME_FIELD, Order::Ascending),
    ]);

    let mut other_group = author_spec();
    other_group.collection_group = "comments".to_string();
    assert!(!index_matches_spec(&live, &other_group, DatabaseEdition::Standard));

    let mut other_scope = author_spec();
    other_scope.query_scope = QueryScope::CollectionGroup;
    assert!(!index_matches_spec(&live, &other_scope, DatabaseEdition::Standard));

    let mut unnamed = live.clone();
    unnamed.name = None;
    assert!(!index_matches_spec(&unnamed, &author_spec(), DatabaseEdition::Standard));
  }

  #[test]
  fn density_default_depends_on_edition() {
    let mut live = live_index(vec![IndexField::ordered("author", Order::Ascending)]);
    live.density = Some(Density::Dense);

    assert!(index_matches_spec(&live, &author_spec(), DatabaseEdition::Enterprise));

    let mut standard_live = live.clone();
    standard_live.fields.push(IndexField::ordered(NAME_FIELD, Order::Ascending));
    assert!(!index_matches_spec(&standard_live, &author_spec(), DatabaseEdition::Standard));

    standard_live.density = Some(Density::SparseAll);
    assert!(index_matches_spec(&standard_live, &author_spec(), DatabaseEdition::Standard));
  }

  #[test]
  fn api_scope_and_multikey_defaults() {
    let mut live = live_index(vec![IndexField::ordered("author", Order::Ascending)]);
    live.api_scope = Some(ApiScope::AnyApi);
    live.multikey = Some(false);
    assert!(index_matches_spec(&live, &author_spec(), DatabaseEdition::Enterprise));

    live.multikey = Some(true);
    assert!(!index_matches_spec(&live, &author_spec(), DatabaseEdition::Enterprise));
  }

  #[test]
  fn vector_configs_compare_by_value() {
    let spec = IndexSpec::new(
      "posts",
      QueryScope::Collection,
      vec![IndexField::vector("embedding", 768)],
    );
    let live = live_index(vec![
      IndexField::ordered(NAME_FIELD, Order::Ascending),
      IndexField::vector("embedding", 768),
    ]);
    assert!(index_matches_spec(&live, &spec, DatabaseEdition::Standard));

    let resized = live_index(vec![
      IndexField::ordered(NAME_FIELD, Order::Ascending),
      IndexField::vector("embedding", 512),
    ]);
    assert!(!index_matches_spec(&resized, &spec, DatabaseEdition::Standard));
  }

  #[test]
  fn field_matches_by_mode_regardless_of_order() {
    let live = live_field(
      "tags",
      vec![
        field_index(QueryScope::Collection, IndexField::array_contains("tags")),
        field_index(QueryScope::Collection, IndexField::ordered("tags", Order::Ascending)),
      ],
      false,
    );
    let spec = FieldOverrideSpec::new(
      "posts",
      "tags",
      vec![
        FieldIndexSpec::ordered(QueryScope::Collection, Order::Ascending),
        FieldIndexSpec::array_contains(QueryScope::Collection),
      ],
    );
    assert!(field_matches_spec(&live, &spec));
  }

  #[test]
  fn field_mismatch_on_cardinality_or_mode() {
    let live = live_field(
      "tags",
      vec![field_index(QueryScope::Collection, IndexField::array_contains("tags"))],
      false,
    );

    let more = FieldOverrideSpec::new(
      "posts",
      "tags",
      vec![
        FieldIndexSpec::array_contains(QueryScope::Collection),
        FieldIndexSpec::ordered(QueryScope::Collection, Order::Ascending),
      ],
    );
    assert!(!field_matches_spec(&live, &more));

    let other_mode = FieldOverrideSpec::new(
      "posts",
      "tags",
      vec![FieldIndexSpec::ordered(QueryScope::Collection, Order::Descending)],
    );
    assert!(!field_matches_spec(&live, &other_mode));

    let other_path = FieldOverrideSpec::new("posts", "labels", vec![FieldIndexSpec::array_contains(QueryScope::Collection)]);
    assert!(!field_matches_spec(&live, &other_path));
  }

  #[test]
  fn explicit_ttl_must_agree() {
    let with_ttl = live_field("expireAt", vec![], true);
    let without_ttl = live_field("expireAt", vec![], false);

    let enable = FieldOverrideSpec::new("posts", "expireAt", vec![]).with_ttl(true);
    let disable = FieldOverrideSpec::new("posts", "expireAt", vec![]).with_ttl(false);

    assert!(field_matches_spec(&with_ttl, &enable));
    assert!(!field_matches_spec(&without_ttl, &enable));
    assert!(field_matches_spec(&without_ttl, &disable));
    assert!(!field_matches_spec(&with_ttl, &disable));
  }

  #[test]
  #[traced_test]
  fn unset_ttl_keeps_policy_and_logs_notice() {
    let live = live_field("expireAt", vec![], true);
    let spec = FieldOverrideSpec::new("posts", "expireAt", vec![]);

    assert!(field_matches_spec(&live, &spec));
    assert!(logs_contain("leaving it in place"));
  }
}
