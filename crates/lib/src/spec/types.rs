//! Desired-state data model: the user-authored index file.

use serde::{Deserialize, Serialize};

use crate::api::{ApiScope, ArrayConfig, Density, IndexField, IndexMode, Order, QueryScope};

/// Index file fields share the live field shape.
pub type IndexFieldSpec = IndexField;

/// A composite index the user wants to exist.
///
/// `fields` order is significant: it is the index's field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSpec {
  pub collection_group: String,
  pub query_scope: QueryScope,
  pub fields: Vec<IndexFieldSpec>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub api_scope: Option<ApiScope>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub density: Option<Density>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub multikey: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unique: Option<bool>,
}

impl IndexSpec {
  pub fn new(collection_group: impl Into<String>, query_scope: QueryScope, fields: Vec<IndexFieldSpec>) -> Self {
    Self {
      collection_group: collection_group.into(),
      query_scope,
      fields,
      api_scope: None,
      density: None,
      multikey: None,
      unique: None,
    }
  }
}

/// One single-field index inside a field override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIndexSpec {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub query_scope: Option<QueryScope>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order: Option<Order>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub array_config: Option<ArrayConfig>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub api_scope: Option<ApiScope>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub density: Option<Density>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub multikey: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unique: Option<bool>,
}

impl FieldIndexSpec {
  pub fn ordered(query_scope: QueryScope, order: Order) -> Self {
    Self {
      query_scope: Some(query_scope),
      order: Some(order),
      ..Default::default()
    }
  }

  pub fn array_contains(query_scope: QueryScope) -> Self {
    Self {
      query_scope: Some(query_scope),
      array_config: Some(ArrayConfig::Contains),
      ..Default::default()
    }
  }

  pub fn mode(&self) -> Option<IndexMode> {
    self
      .order
      .map(IndexMode::Order)
      .or(self.array_config.map(IndexMode::Array))
  }
}

/// Per-field index configuration replacing the database defaults.
///
/// `ttl` is tri-state: `None` expresses no opinion and never removes an
/// existing TTL policy, `Some(true)` enables one, `Some(false)` disables it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOverrideSpec {
  pub collection_group: String,
  pub field_path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ttl: Option<bool>,
  pub indexes: Vec<FieldIndexSpec>,
}

impl FieldOverrideSpec {
  pub fn new(collection_group: impl Into<String>, field_path: impl Into<String>, indexes: Vec<FieldIndexSpec>) -> Self {
    Self {
      collection_group: collection_group.into(),
      field_path: field_path.into(),
      ttl: None,
      indexes,
    }
  }

  pub fn with_ttl(mut self, ttl: bool) -> Self {
    self.ttl = Some(ttl);
    self
  }
}

/// The whole index file (`firestore.indexes.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
  pub indexes: Vec<IndexSpec>,
  #[serde(default)]
  pub field_overrides: Vec<FieldOverrideSpec>,
}
