//! Total orders over index file and API entries.
//!
//! Used to present diffs and listings in a stable order, and to sort both
//! sides of an unordered collection before comparing it element-wise.
//!
//! Optional enum attributes follow one of two conventions. Query scope, order,
//! and array config place an unset value after every defined value. API scope,
//! density, and the boolean flags place an unset value before every defined
//! value.

use std::cmp::Ordering;

use crate::api::{
  ApiScope, ArrayConfig, Database, Density, Field, Index, IndexField, Location, Order, QueryScope, VectorConfig,
  parse_field_name,
};
use crate::api::names::index_collection_group;
use crate::spec::{FieldIndexSpec, FieldOverrideSpec, IndexSpec};

const QUERY_SCOPE_SEQUENCE: &[QueryScope] =
  &[QueryScope::CollectionGroup, QueryScope::Collection, QueryScope::Unspecified];
const API_SCOPE_SEQUENCE: &[ApiScope] = &[ApiScope::AnyApi, ApiScope::DatastoreModeApi, ApiScope::MongodbCompatibleApi];
const DENSITY_SEQUENCE: &[Density] = &[Density::Unspecified, Density::SparseAll, Density::SparseAny, Density::Dense];
const ORDER_SEQUENCE: &[Order] = &[Order::Ascending, Order::Descending];
const ARRAY_CONFIG_SEQUENCE: &[ArrayConfig] = &[ArrayConfig::Contains];

/// Position of `value` in `sequence`; unset values rank after the sequence.
fn rank<T: PartialEq>(sequence: &[T], value: Option<&T>) -> usize {
  value
    .and_then(|v| sequence.iter().position(|s| s == v))
    .unwrap_or(sequence.len())
}

fn compare_unset_last<T: PartialEq>(sequence: &[T], a: Option<&T>, b: Option<&T>) -> Ordering {
  rank(sequence, a).cmp(&rank(sequence, b))
}

fn compare_unset_first<T: PartialEq>(sequence: &[T], a: Option<&T>, b: Option<&T>) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (Some(_), Some(_)) => rank(sequence, a).cmp(&rank(sequence, b)),
  }
}

fn compare_query_scope(a: Option<QueryScope>, b: Option<QueryScope>) -> Ordering {
  compare_unset_last(QUERY_SCOPE_SEQUENCE, a.as_ref(), b.as_ref())
}

fn compare_order(a: Option<Order>, b: Option<Order>) -> Ordering {
  compare_unset_last(ORDER_SEQUENCE, a.as_ref(), b.as_ref())
}

fn compare_array_config(a: Option<ArrayConfig>, b: Option<ArrayConfig>) -> Ordering {
  compare_unset_last(ARRAY_CONFIG_SEQUENCE, a.as_ref(), b.as_ref())
}

fn compare_api_scope(a: Option<ApiScope>, b: Option<ApiScope>) -> Ordering {
  compare_unset_first(API_SCOPE_SEQUENCE, a.as_ref(), b.as_ref())
}

fn compare_density(a: Option<Density>, b: Option<Density>) -> Ordering {
  compare_unset_first(DENSITY_SEQUENCE, a.as_ref(), b.as_ref())
}

/// Unset first, then `false`, then `true`.
fn compare_bool(a: Option<bool>, b: Option<bool>) -> Ordering {
  a.cmp(&b)
}

/// Present before absent; smaller dimension first.
fn compare_vector_config(a: Option<&VectorConfig>, b: Option<&VectorConfig>) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Greater,
    (Some(_), None) => Ordering::Less,
    (Some(a), Some(b)) => a.dimension.cmp(&b.dimension),
  }
}

/// TTL rank of a field override: disabling first, enabling next, no opinion last.
fn ttl_rank(ttl: Option<bool>) -> u8 {
  match ttl {
    Some(false) => 0,
    Some(true) => 1,
    None => 2,
  }
}

/// Compare two slices by their first unequal element. A prefix sorts first.
pub fn compare_arrays<T>(a: &[T], b: &[T], compare: impl Fn(&T, &T) -> Ordering) -> Ordering {
  a.iter()
    .zip(b)
    .map(|(x, y)| compare(x, y))
    .find(|cmp| cmp.is_ne())
    .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Like [`compare_arrays`], after sorting copies of both sides with `compare`.
///
/// The inputs are left untouched.
pub fn compare_arrays_sorted<T>(a: &[T], b: &[T], compare: impl Fn(&T, &T) -> Ordering) -> Ordering {
  let mut a_sorted: Vec<&T> = a.iter().collect();
  let mut b_sorted: Vec<&T> = b.iter().collect();
  a_sorted.sort_by(|x, y| compare(x, y));
  b_sorted.sort_by(|x, y| compare(x, y));
  compare_arrays(&a_sorted, &b_sorted, |x, y| compare(x, y))
}

pub fn compare_index_field(a: &IndexField, b: &IndexField) -> Ordering {
  a.field_path
    .cmp(&b.field_path)
    .then_with(|| compare_order(a.order, b.order))
    .then_with(|| compare_array_config(a.array_config, b.array_config))
    .then_with(|| compare_vector_config(a.vector_config.as_ref(), b.vector_config.as_ref()))
}

pub fn compare_spec_index(a: &IndexSpec, b: &IndexSpec) -> Ordering {
  a.collection_group
    .cmp(&b.collection_group)
    .then_with(|| compare_query_scope(Some(a.query_scope), Some(b.query_scope)))
    .then_with(|| compare_arrays(&a.fields, &b.fields, compare_index_field))
    .then_with(|| compare_api_scope(a.api_scope, b.api_scope))
    .then_with(|| compare_density(a.density, b.density))
    .then_with(|| compare_bool(a.multikey, b.multikey))
    .then_with(|| compare_bool(a.unique, b.unique))
}

/// Compare live indexes. Collection groups are only compared when both
/// names are present and parse, since indexes nested in a field have no name.
pub fn compare_api_index(a: &Index, b: &Index) -> Ordering {
  let groups = match (
    index_collection_group(a.name.as_deref()),
    index_collection_group(b.name.as_deref()),
  ) {
    (Some(a_group), Some(b_group)) => a_group.cmp(&b_group),
    _ => Ordering::Equal,
  };

  groups
    .then_with(|| compare_query_scope(Some(a.query_scope), Some(b.query_scope)))
    .then_with(|| compare_arrays(&a.fields, &b.fields, compare_index_field))
    .then_with(|| compare_api_scope(a.api_scope, b.api_scope))
    .then_with(|| compare_density(a.density, b.density))
    .then_with(|| compare_bool(a.multikey, b.multikey))
    .then_with(|| compare_bool(a.unique, b.unique))
}

pub fn compare_field_index(a: &FieldIndexSpec, b: &FieldIndexSpec) -> Ordering {
  compare_query_scope(a.query_scope, b.query_scope)
    .then_with(|| compare_order(a.order, b.order))
    .then_with(|| compare_array_config(a.array_config, b.array_config))
    .then_with(|| compare_api_scope(a.api_scope, b.api_scope))
    .then_with(|| compare_density(a.density, b.density))
    .then_with(|| compare_bool(a.multikey, b.multikey))
    .then_with(|| compare_bool(a.unique, b.unique))
}

pub fn compare_field_override(a: &FieldOverrideSpec, b: &FieldOverrideSpec) -> Ordering {
  a.collection_group
    .cmp(&b.collection_group)
    .then_with(|| ttl_rank(a.ttl).cmp(&ttl_rank(b.ttl)))
    .then_with(|| a.field_path.cmp(&b.field_path))
    .then_with(|| compare_arrays_sorted(&a.indexes, &b.indexes, compare_field_index))
}

/// Compare live field overrides by collection group, field path, then
/// their (sorted) index lists. Unparseable names sort by the raw name.
pub fn compare_api_field(a: &Field, b: &Field) -> Ordering {
  let names = match (parse_field_name(&a.name), parse_field_name(&b.name)) {
    (Some(a_name), Some(b_name)) => a_name
      .collection_group
      .cmp(&b_name.collection_group)
      .then_with(|| a_name.field_path.cmp(&b_name.field_path)),
    _ => a.name.cmp(&b.name),
  };

  names.then_with(|| compare_arrays_sorted(&a.index_config.indexes, &b.index_config.indexes, compare_api_index))
}

pub fn compare_api_database(a: &Database, b: &Database) -> Ordering {
  a.name.cmp(&b.name)
}

pub fn compare_location(a: &Location, b: &Location) -> Ordering {
  a.location_id.cmp(&b.location_id)
}
