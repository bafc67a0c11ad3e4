//! Schema-driven decoding of an (upgraded) index file.
//!
//! Decoding walks the JSON tree once and either produces a fully typed
//! [`IndexFile`] or stops at the first violation with its location, e.g.
//! `indexes[1].fields[0]: Must contain exactly one of "order,arrayConfig,vectorConfig"`.
//! Unknown keys are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::{ApiScope, ArrayConfig, Density, FlatIndex, IndexField, Order, QueryScope, VectorConfig, WireEnum};

use super::types::{FieldIndexSpec, FieldOverrideSpec, IndexFile, IndexSpec};

/// An index file that failed shape or enum checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{path}: Must contain \"{key}\"")]
  MissingKey { path: String, key: String },

  #[error("{path}: Field \"{key}\" must be one of {}: {value}", allowed.join(", "))]
  InvalidEnum {
    path: String,
    key: String,
    value: String,
    allowed: Vec<&'static str>,
  },

  #[error("{path}: Must contain exactly one of \"{}\"", keys.join(","))]
  ExactlyOneOf { path: String, keys: Vec<&'static str> },

  #[error("{path}: Property \"{key}\" must be of type {expected}")]
  WrongType {
    path: String,
    key: String,
    expected: &'static str,
  },

  #[error("{path}: \"{key}\" is not supported yet")]
  Unsupported { path: String, key: String },
}

/// Decode and validate an index file.
pub fn decode_spec(spec: &Value) -> Result<IndexFile, ValidationError> {
  let root = Node::root(spec)?;

  let indexes = root
    .require_array("indexes")?
    .iter()
    .enumerate()
    .map(|(i, index)| decode_index(&root.child("indexes", i, index)?))
    .collect::<Result<Vec<_>, _>>()?;

  let field_overrides = match root.optional_array("fieldOverrides")? {
    Some(fields) => fields
      .iter()
      .enumerate()
      .map(|(i, field)| decode_field_override(&root.child("fieldOverrides", i, field)?))
      .collect::<Result<Vec<_>, _>>()?,
    None => Vec::new(),
  };

  Ok(IndexFile {
    indexes,
    field_overrides,
  })
}

fn decode_index(node: &Node<'_>) -> Result<IndexSpec, ValidationError> {
  let collection_group = node.require_str("collectionGroup")?;
  let query_scope = node.require_enum::<QueryScope>("queryScope")?;

  let fields = node
    .require_array("fields")?
    .iter()
    .enumerate()
    .map(|(i, field)| decode_index_field(&node.child("fields", i, field)?))
    .collect::<Result<Vec<_>, _>>()?;

  node.reject("unique")?;

  Ok(IndexSpec {
    collection_group,
    query_scope,
    fields,
    api_scope: node.optional_enum::<ApiScope>("apiScope")?,
    density: node.optional_enum::<Density>("density")?,
    multikey: node.optional_bool("multikey")?,
    unique: None,
  })
}

fn decode_index_field(node: &Node<'_>) -> Result<IndexField, ValidationError> {
  let field_path = node.require_str("fieldPath")?;
  node.exactly_one_of(&["order", "arrayConfig", "vectorConfig"])?;

  Ok(IndexField {
    field_path,
    order: node.optional_enum::<Order>("order")?,
    array_config: node.optional_enum::<ArrayConfig>("arrayConfig")?,
    vector_config: decode_vector_config(node)?,
  })
}

fn decode_vector_config(node: &Node<'_>) -> Result<Option<VectorConfig>, ValidationError> {
  let Some(value) = node.get("vectorConfig") else {
    return Ok(None);
  };
  let config = node.nested("vectorConfig", value)?;

  let dimension = match config.get("dimension") {
    None => {
      return Err(ValidationError::MissingKey {
        path: config.path.clone(),
        key: "dimension".to_string(),
      });
    }
    Some(value) => value
      .as_u64()
      .filter(|d| *d > 0)
      .and_then(|d| u32::try_from(d).ok())
      .ok_or_else(|| config.wrong_type("dimension", "positive integer"))?,
  };

  let flat = match config.get("flat") {
    None => {
      return Err(ValidationError::MissingKey {
        path: config.path.clone(),
        key: "flat".to_string(),
      });
    }
    Some(Value::Object(_)) => FlatIndex {},
    Some(_) => return Err(config.wrong_type("flat", "object")),
  };

  Ok(Some(VectorConfig {
    dimension,
    flat: Some(flat),
  }))
}

fn decode_field_override(node: &Node<'_>) -> Result<FieldOverrideSpec, ValidationError> {
  let collection_group = node.require_str("collectionGroup")?;
  let field_path = node.require_str("fieldPath")?;
  let ttl = node.optional_bool("ttl")?;

  let indexes = node
    .require_array("indexes")?
    .iter()
    .enumerate()
    .map(|(i, index)| decode_field_index(&node.child("indexes", i, index)?))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(FieldOverrideSpec {
    collection_group,
    field_path,
    ttl,
    indexes,
  })
}

fn decode_field_index(node: &Node<'_>) -> Result<FieldIndexSpec, ValidationError> {
  node.exactly_one_of(&["arrayConfig", "order"])?;
  node.reject("unique")?;

  Ok(FieldIndexSpec {
    query_scope: node.optional_enum::<QueryScope>("queryScope")?,
    order: node.optional_enum::<Order>("order")?,
    array_config: node.optional_enum::<ArrayConfig>("arrayConfig")?,
    api_scope: node.optional_enum::<ApiScope>("apiScope")?,
    density: node.optional_enum::<Density>("density")?,
    multikey: node.optional_bool("multikey")?,
    unique: None,
  })
}

/// A JSON object together with its location in the document.
struct Node<'a> {
  path: String,
  object: &'a Map<String, Value>,
}

impl<'a> Node<'a> {
  fn root(value: &'a Value) -> Result<Self, ValidationError> {
    match value {
      Value::Object(object) => Ok(Self {
        path: "spec".to_string(),
        object,
      }),
      _ => Err(ValidationError::WrongType {
        path: "spec".to_string(),
        key: "spec".to_string(),
        expected: "object",
      }),
    }
  }

  fn child(&self, key: &str, position: usize, value: &'a Value) -> Result<Node<'a>, ValidationError> {
    let path = if self.path == "spec" {
      format!("{}[{}]", key, position)
    } else {
      format!("{}.{}[{}]", self.path, key, position)
    };
    match value {
      Value::Object(object) => Ok(Node { path, object }),
      _ => Err(ValidationError::WrongType {
        path,
        key: key.to_string(),
        expected: "object",
      }),
    }
  }

  fn nested(&self, key: &str, value: &'a Value) -> Result<Node<'a>, ValidationError> {
    match value {
      Value::Object(object) => Ok(Node {
        path: format!("{}.{}", self.path, key),
        object,
      }),
      _ => Err(self.wrong_type(key, "object")),
    }
  }

  /// Present and non-null value for `key`.
  fn get(&self, key: &str) -> Option<&'a Value> {
    self.object.get(key).filter(|v| !v.is_null())
  }

  fn missing(&self, key: &str) -> ValidationError {
    ValidationError::MissingKey {
      path: self.path.clone(),
      key: key.to_string(),
    }
  }

  fn wrong_type(&self, key: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
      path: self.path.clone(),
      key: key.to_string(),
      expected,
    }
  }

  fn require_str(&self, key: &str) -> Result<String, ValidationError> {
    let value = self.get(key).ok_or_else(|| self.missing(key))?;
    value
      .as_str()
      .map(str::to_string)
      .ok_or_else(|| self.wrong_type(key, "string"))
  }

  fn require_array(&self, key: &str) -> Result<&'a Vec<Value>, ValidationError> {
    self.optional_array(key)?.ok_or_else(|| self.missing(key))
  }

  fn optional_array(&self, key: &str) -> Result<Option<&'a Vec<Value>>, ValidationError> {
    match self.get(key) {
      None => Ok(None),
      Some(Value::Array(items)) => Ok(Some(items)),
      Some(_) => Err(self.wrong_type(key, "array")),
    }
  }

  fn optional_bool(&self, key: &str) -> Result<Option<bool>, ValidationError> {
    match self.get(key) {
      None => Ok(None),
      Some(Value::Bool(b)) => Ok(Some(*b)),
      Some(_) => Err(self.wrong_type(key, "boolean")),
    }
  }

  fn require_enum<T: WireEnum>(&self, key: &str) -> Result<T, ValidationError> {
    self.optional_enum(key)?.ok_or_else(|| self.missing(key))
  }

  fn optional_enum<T: WireEnum>(&self, key: &str) -> Result<Option<T>, ValidationError> {
    let Some(value) = self.get(key) else {
      return Ok(None);
    };
    let invalid = || ValidationError::InvalidEnum {
      path: self.path.clone(),
      key: key.to_string(),
      value: value.to_string(),
      allowed: T::allowed(),
    };
    let text = value.as_str().ok_or_else(invalid)?;
    T::from_wire(text).map(Some).ok_or_else(invalid)
  }

  fn exactly_one_of(&self, keys: &[&'static str]) -> Result<(), ValidationError> {
    let present = keys.iter().filter(|key| self.get(key).is_some()).count();
    if present == 1 {
      Ok(())
    } else {
      Err(ValidationError::ExactlyOneOf {
        path: self.path.clone(),
        keys: keys.to_vec(),
      })
    }
  }

  fn reject(&self, key: &str) -> Result<(), ValidationError> {
    match self.get(key) {
      Some(_) => Err(ValidationError::Unsupported {
        path: self.path.clone(),
        key: key.to_string(),
      }),
      None => Ok(()),
    }
  }
}
