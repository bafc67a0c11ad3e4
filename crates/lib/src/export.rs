//! Conversion of live state back into an index file.

use tracing::debug;

use crate::api::{DatabaseEdition, Field, Index, parse_field_name, parse_index_name};
use crate::consts::NAME_FIELD;
use crate::sort::{compare_field_override, compare_spec_index};
use crate::spec::{FieldIndexSpec, FieldOverrideSpec, IndexFile, IndexSpec, process_index};

/// Build a sorted index file describing `indexes` and `fields`.
///
/// A `__name__` field is dropped only when canonicalization for `edition`
/// would add it back, so deploying the result is a no-op. Entries whose names
/// do not parse are skipped.
pub fn make_index_spec(indexes: &[Index], fields: &[Field], edition: DatabaseEdition) -> IndexFile {
  let mut index_specs: Vec<IndexSpec> = indexes.iter().filter_map(|index| index_to_spec(index, edition)).collect();
  let mut field_specs: Vec<FieldOverrideSpec> = fields.iter().filter_map(field_to_spec).collect();

  index_specs.sort_by(compare_spec_index);
  field_specs.sort_by(compare_field_override);

  IndexFile {
    indexes: index_specs,
    field_overrides: field_specs,
  }
}

fn index_to_spec(index: &Index, edition: DatabaseEdition) -> Option<IndexSpec> {
  let Some(name) = index.name.as_deref().and_then(parse_index_name) else {
    debug!(name = ?index.name, "skipping index with unrecognized name");
    return None;
  };

  let mut spec = IndexSpec {
    collection_group: name.collection_group,
    query_scope: index.query_scope,
    fields: index.fields.clone(),
    api_scope: index.api_scope,
    density: index.density,
    multikey: index.multikey,
    unique: None,
  };

  let mut stripped = spec.clone();
  stripped.fields.retain(|f| f.field_path != NAME_FIELD);
  if stripped.fields.len() != spec.fields.len() && process_index(&stripped, edition).fields == spec.fields {
    spec = stripped;
  }

  Some(spec)
}

fn field_to_spec(field: &Field) -> Option<FieldOverrideSpec> {
  let Some(name) = parse_field_name(&field.name) else {
    debug!(name = %field.name, "skipping field with unrecognized name");
    return None;
  };

  let indexes = field
    .index_config
    .indexes
    .iter()
    .map(|index| {
      let first = index.fields.first();
      FieldIndexSpec {
        query_scope: Some(index.query_scope),
        order: first.and_then(|f| f.order),
        array_config: first.and_then(|f| f.array_config),
        ..Default::default()
      }
    })
    .collect();

  Some(FieldOverrideSpec {
    collection_group: name.collection_group,
    field_path: name.field_path,
    ttl: Some(field.ttl_config.is_some()),
    indexes,
  })
}
