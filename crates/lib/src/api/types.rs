//! Resource shapes exchanged with the Firestore Admin API.
//!
//! These mirror the JSON wire format: camelCase keys and SCREAMING_SNAKE_CASE
//! enum values. Optional attributes stay `Option` so that "unset" is carried
//! explicitly all the way into the matcher, which is the only place defaults
//! are substituted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An enum whose values travel as fixed strings on the wire.
pub trait WireEnum: Copy + PartialEq + Sized + 'static {
  /// Values a user may write in an index file.
  const VARIANTS: &'static [Self];

  /// The wire spelling of this value.
  fn as_str(&self) -> &'static str;

  /// Parse a user-specifiable value, rejecting anything outside [`Self::VARIANTS`].
  fn from_wire(value: &str) -> Option<Self> {
    Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
  }

  /// Wire spellings of every user-specifiable value.
  fn allowed() -> Vec<&'static str> {
    Self::VARIANTS.iter().map(|v| v.as_str()).collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryScope {
  #[serde(rename = "QUERY_SCOPE_UNSPECIFIED")]
  Unspecified,
  Collection,
  CollectionGroup,
}

impl WireEnum for QueryScope {
  const VARIANTS: &'static [Self] = &[Self::Collection, Self::CollectionGroup];

  fn as_str(&self) -> &'static str {
    match self {
      Self::Unspecified => "QUERY_SCOPE_UNSPECIFIED",
      Self::Collection => "COLLECTION",
      Self::CollectionGroup => "COLLECTION_GROUP",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Order {
  Ascending,
  Descending,
}

impl WireEnum for Order {
  const VARIANTS: &'static [Self] = &[Self::Ascending, Self::Descending];

  fn as_str(&self) -> &'static str {
    match self {
      Self::Ascending => "ASCENDING",
      Self::Descending => "DESCENDING",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArrayConfig {
  Contains,
}

impl WireEnum for ArrayConfig {
  const VARIANTS: &'static [Self] = &[Self::Contains];

  fn as_str(&self) -> &'static str {
    match self {
      Self::Contains => "CONTAINS",
    }
  }
}

/// Which query API an index serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiScope {
  AnyApi,
  DatastoreModeApi,
  MongodbCompatibleApi,
}

impl WireEnum for ApiScope {
  const VARIANTS: &'static [Self] = &[Self::AnyApi, Self::DatastoreModeApi, Self::MongodbCompatibleApi];

  fn as_str(&self) -> &'static str {
    match self {
      Self::AnyApi => "ANY_API",
      Self::DatastoreModeApi => "DATASTORE_MODE_API",
      Self::MongodbCompatibleApi => "MONGODB_COMPATIBLE_API",
    }
  }
}

/// Index storage density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Density {
  #[serde(rename = "DENSITY_UNSPECIFIED")]
  Unspecified,
  SparseAll,
  SparseAny,
  Dense,
}

impl WireEnum for Density {
  const VARIANTS: &'static [Self] = &[Self::SparseAll, Self::SparseAny, Self::Dense];

  fn as_str(&self) -> &'static str {
    match self {
      Self::Unspecified => "DENSITY_UNSPECIFIED",
      Self::SparseAll => "SPARSE_ALL",
      Self::SparseAny => "SPARSE_ANY",
      Self::Dense => "DENSE",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexState {
  #[serde(rename = "STATE_UNSPECIFIED")]
  Unspecified,
  Creating,
  Ready,
  NeedsRepair,
}

impl IndexState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unspecified => "STATE_UNSPECIFIED",
      Self::Creating => "CREATING",
      Self::Ready => "READY",
      Self::NeedsRepair => "NEEDS_REPAIR",
    }
  }
}

impl fmt::Display for IndexState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TtlState {
  #[serde(rename = "STATE_UNSPECIFIED")]
  Unspecified,
  Creating,
  Active,
  NeedsRepair,
}

impl TtlState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unspecified => "STATE_UNSPECIFIED",
      Self::Creating => "CREATING",
      Self::Active => "ACTIVE",
      Self::NeedsRepair => "NEEDS_REPAIR",
    }
  }
}

/// Database-wide mode that decides several index defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatabaseEdition {
  #[default]
  Standard,
  Enterprise,
}

impl DatabaseEdition {
  /// Parse the API's `databaseEdition` value. Anything other than
  /// `ENTERPRISE` (including `DATABASE_EDITION_UNSPECIFIED`) is Standard.
  pub fn from_api(value: Option<&str>) -> Self {
    match value {
      Some("ENTERPRISE") => Self::Enterprise,
      _ => Self::Standard,
    }
  }

  /// Density assumed when an index leaves it unset.
  pub fn default_density(&self) -> Density {
    match self {
      Self::Standard => Density::SparseAll,
      Self::Enterprise => Density::Dense,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Standard => "STANDARD",
      Self::Enterprise => "ENTERPRISE",
    }
  }
}

impl fmt::Display for DatabaseEdition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Marker for the flat (brute force) vector index type. Serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlatIndex {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorConfig {
  pub dimension: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub flat: Option<FlatIndex>,
}

/// One position of a composite index.
///
/// Shared by live indexes and index files: both use the same field shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexField {
  pub field_path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order: Option<Order>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub array_config: Option<ArrayConfig>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub vector_config: Option<VectorConfig>,
}

impl IndexField {
  pub fn ordered(field_path: impl Into<String>, order: Order) -> Self {
    Self {
      field_path: field_path.into(),
      order: Some(order),
      array_config: None,
      vector_config: None,
    }
  }

  pub fn array_contains(field_path: impl Into<String>) -> Self {
    Self {
      field_path: field_path.into(),
      order: None,
      array_config: Some(ArrayConfig::Contains),
      vector_config: None,
    }
  }

  pub fn vector(field_path: impl Into<String>, dimension: u32) -> Self {
    Self {
      field_path: field_path.into(),
      order: None,
      array_config: None,
      vector_config: Some(VectorConfig {
        dimension,
        flat: Some(FlatIndex {}),
      }),
    }
  }

  pub fn is_vector(&self) -> bool {
    self.vector_config.is_some()
  }

  /// The order or array mode of this field, whichever is set.
  pub fn mode(&self) -> Option<IndexMode> {
    self
      .order
      .map(IndexMode::Order)
      .or(self.array_config.map(IndexMode::Array))
  }
}

/// The single indexing mode of a field-override index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexMode {
  Order(Order),
  Array(ArrayConfig),
}

impl fmt::Display for IndexMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Order(order) => write!(f, "{}", order.as_str()),
      Self::Array(config) => write!(f, "{}", config.as_str()),
    }
  }
}

/// A live composite index, or one entry of a field's index configuration.
///
/// `name` is absent for the entries nested inside a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub query_scope: QueryScope,
  #[serde(default)]
  pub fields: Vec<IndexField>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub api_scope: Option<ApiScope>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub density: Option<Density>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub multikey: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unique: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub state: Option<IndexState>,
}

impl Index {
  /// Mode of the first field; field-override indexes carry exactly one field.
  pub fn first_mode(&self) -> Option<IndexMode> {
    self.fields.first().and_then(IndexField::mode)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
  #[serde(default)]
  pub indexes: Vec<Index>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uses_ancestor_config: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ancestor_field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtlConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub state: Option<TtlState>,
}

/// A live single-field configuration (field override).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
  pub name: String,
  #[serde(default)]
  pub index_config: IndexConfig,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ttl_config: Option<TtlConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location_id: Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub database_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub database_edition: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub create_time: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub update_time: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub delete_protection_state: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub point_in_time_recovery_enablement: Option<String>,
}

impl Database {
  pub fn edition(&self) -> DatabaseEdition {
    DatabaseEdition::from_api(self.database_edition.as_deref())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub location_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn index_decodes_from_api_json() {
    let json = r#"{
      "name": "projects/p/databases/(default)/collectionGroups/posts/indexes/CICAgJim14AK",
      "queryScope": "COLLECTION",
      "fields": [
        { "fieldPath": "author", "order": "ASCENDING" },
        { "fieldPath": "tags", "arrayConfig": "CONTAINS" },
        { "fieldPath": "__name__", "order": "ASCENDING" }
      ],
      "density": "SPARSE_ALL",
      "state": "READY"
    }"#;

    let index: Index = serde_json::from_str(json).unwrap();
    assert_eq!(index.query_scope, QueryScope::Collection);
    assert_eq!(index.fields.len(), 3);
    assert_eq!(index.fields[1].array_config, Some(ArrayConfig::Contains));
    assert_eq!(index.density, Some(Density::SparseAll));
    assert_eq!(index.state, Some(IndexState::Ready));
    assert_eq!(index.api_scope, None);
  }

  #[test]
  fn vector_config_serializes_flat_as_empty_object() {
    let field = IndexField::vector("embedding", 768);
    let json = serde_json::to_value(&field).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "fieldPath": "embedding", "vectorConfig": { "dimension": 768, "flat": {} } })
    );
  }

  #[test]
  fn field_without_index_config_decodes_to_empty() {
    let field: Field = serde_json::from_str(
      r#"{ "name": "projects/p/databases/(default)/collectionGroups/c/fields/ttl", "ttlConfig": { "state": "ACTIVE" } }"#,
    )
    .unwrap();
    assert!(field.index_config.indexes.is_empty());
    assert_eq!(field.ttl_config.unwrap().state, Some(TtlState::Active));
  }

  #[test]
  fn edition_defaults_to_standard() {
    assert_eq!(DatabaseEdition::from_api(None), DatabaseEdition::Standard);
    assert_eq!(
      DatabaseEdition::from_api(Some("DATABASE_EDITION_UNSPECIFIED")),
      DatabaseEdition::Standard
    );
    assert_eq!(DatabaseEdition::from_api(Some("ENTERPRISE")), DatabaseEdition::Enterprise);
  }

  #[test]
  fn default_density_depends_on_edition() {
    assert_eq!(DatabaseEdition::Standard.default_density(), Density::SparseAll);
    assert_eq!(DatabaseEdition::Enterprise.default_density(), Density::Dense);
  }

  #[test]
  fn wire_enum_rejects_unspecified_values() {
    assert_eq!(QueryScope::from_wire("COLLECTION_GROUP"), Some(QueryScope::CollectionGroup));
    assert_eq!(QueryScope::from_wire("QUERY_SCOPE_UNSPECIFIED"), None);
    assert_eq!(Density::from_wire("DENSITY_UNSPECIFIED"), None);
    assert_eq!(Order::allowed(), vec!["ASCENDING", "DESCENDING"]);
  }
}
