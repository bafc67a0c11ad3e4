//! Diff between an index file and the live configuration of a database.

use serde::Serialize;
use tracing::warn;

use crate::api::{DatabaseEdition, Field, Index, parse_field_name};
use crate::matcher::{field_matches_spec, index_matches_spec};
use crate::sort::{compare_api_field, compare_api_index, compare_field_override};
use crate::spec::{FieldOverrideSpec, IndexFile, IndexSpec};

/// Operations needed to make a database match an index file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcilePlan {
  pub edition: DatabaseEdition,

  /// Desired indexes with no live match, in file order.
  pub indexes_to_create: Vec<IndexSpec>,
  /// Desired indexes that already exist.
  pub indexes_unchanged: Vec<IndexSpec>,
  /// Live indexes no desired index matches.
  pub indexes_to_delete: Vec<Index>,

  /// Desired overrides with no matching live field, TTL disables first.
  pub fields_to_patch: Vec<FieldOverrideSpec>,
  pub fields_unchanged: Vec<FieldOverrideSpec>,
  /// Live overrides whose collection group and field path are absent from the file.
  pub fields_to_delete: Vec<Field>,

  /// `collectionGroup.fieldPath` of live TTL policies the file leaves unset.
  pub ttl_notices: Vec<String>,
}

impl ReconcilePlan {
  /// Compute the plan.
  ///
  /// # Index Diff Logic
  ///
  /// - Desired index matched by no live index → `indexes_to_create`
  /// - Desired index matched by some live index → `indexes_unchanged`
  /// - Live index matching no desired index → `indexes_to_delete`
  ///
  /// Both directions use [`index_matches_spec`].
  ///
  /// # Field Diff Logic
  ///
  /// - Desired override matched by no live field → `fields_to_patch`
  /// - Desired override matched by some live field → `fields_unchanged`
  /// - Live field whose (collection group, field path) has no desired entry → `fields_to_delete`
  ///
  /// A live field that differs from its desired entry is patched, never deleted,
  /// since deleting after the patch would undo it.
  pub fn compute(spec: &IndexFile, live_indexes: &[Index], live_fields: &[Field], edition: DatabaseEdition) -> Self {
    let mut plan = ReconcilePlan {
      edition,
      ..Default::default()
    };

    for index in &spec.indexes {
      if live_indexes.iter().any(|live| index_matches_spec(live, index, edition)) {
        plan.indexes_unchanged.push(index.clone());
      } else {
        plan.indexes_to_create.push(index.clone());
      }
    }

    plan.indexes_to_delete = live_indexes
      .iter()
      .filter(|live| !spec.indexes.iter().any(|index| index_matches_spec(live, index, edition)))
      .filter(|live| {
        if live.name.is_none() {
          warn!(fields = live.fields.len(), "live index has no name and cannot be deleted");
        }
        live.name.is_some()
      })
      .cloned()
      .collect();
    plan.indexes_to_delete.sort_by(compare_api_index);

    let mut overrides = spec.field_overrides.clone();
    overrides.sort_by(compare_field_override);
    for field in overrides {
      if live_fields.iter().any(|live| field_matches_spec(live, &field)) {
        plan.fields_unchanged.push(field);
      } else {
        plan.fields_to_patch.push(field);
      }
    }

    plan.fields_to_delete = live_fields
      .iter()
      .filter(|live| {
        parse_field_name(&live.name).is_some_and(|name| {
          !spec
            .field_overrides
            .iter()
            .any(|f| f.collection_group == name.collection_group && f.field_path == name.field_path)
        })
      })
      .cloned()
      .collect();
    plan.fields_to_delete.sort_by(compare_api_field);

    plan.ttl_notices = spec
      .field_overrides
      .iter()
      .filter(|f| f.ttl.is_none())
      .filter(|f| {
        live_fields.iter().any(|live| {
          live.ttl_config.is_some()
            && parse_field_name(&live.name)
              .is_some_and(|name| name.collection_group == f.collection_group && name.field_path == f.field_path)
        })
      })
      .map(|f| format!("{}.{}", f.collection_group, f.field_path))
      .collect();

    plan
  }

  /// Returns true if there are no changes to make.
  pub fn is_empty(&self) -> bool {
    self.indexes_to_create.is_empty()
      && self.indexes_to_delete.is_empty()
      && self.fields_to_patch.is_empty()
      && self.fields_to_delete.is_empty()
  }
}
