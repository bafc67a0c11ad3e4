//! Upgrade of legacy (v1beta1) index files.
//!
//! The legacy shape names the group `collectionId`, omits `queryScope`, and
//! describes each field with a single `mode` of `ASCENDING`, `DESCENDING`, or
//! `ARRAY_CONTAINS`. Upgrading runs before validation and is best effort: it
//! never fails, and anything it does not understand is passed through so the
//! validator can report it with a precise location.

use serde_json::{Map, Value, json};
use tracing::warn;

const LEGACY_ARRAY_CONTAINS: &str = "ARRAY_CONTAINS";

/// Map a raw document onto the current index file shape.
///
/// A missing or null `fieldOverrides` becomes an empty list. Documents that
/// are not JSON objects are returned unchanged.
pub fn upgrade_spec(raw: &Value) -> Value {
  let Some(root) = raw.as_object() else {
    return raw.clone();
  };

  let mut result = root.clone();
  match root.get("fieldOverrides") {
    None | Some(Value::Null) => {
      result.insert("fieldOverrides".to_string(), json!([]));
    }
    Some(_) => {}
  }

  let Some(indexes) = root.get("indexes").and_then(Value::as_array) else {
    return Value::Object(result);
  };

  if is_legacy(indexes) {
    warn!(
      "your indexes are specified in the v1beta1 API format; re-export them with `indexsync list --json` and save the result to upgrade"
    );
  }

  let upgraded: Vec<Value> = indexes.iter().map(upgrade_index).collect();
  result.insert("indexes".to_string(), Value::Array(upgraded));
  Value::Object(result)
}

/// The first index entry decides which schema the document uses.
fn is_legacy(indexes: &[Value]) -> bool {
  indexes.first().and_then(|i| i.get("collectionId")).is_some()
}

fn upgrade_index(index: &Value) -> Value {
  let Some(entry) = index.as_object() else {
    return index.clone();
  };

  let mut upgraded = entry.clone();
  if let Some(collection_id) = upgraded.remove("collectionId") {
    if !entry.contains_key("collectionGroup") {
      upgraded.insert("collectionGroup".to_string(), collection_id);
    }
    if !entry.contains_key("queryScope") {
      upgraded.insert("queryScope".to_string(), json!("COLLECTION"));
    }
  }

  if let Some(fields) = entry.get("fields").and_then(Value::as_array) {
    let fields = fields.iter().map(upgrade_field).collect();
    upgraded.insert("fields".to_string(), Value::Array(fields));
  }

  Value::Object(upgraded)
}

fn upgrade_field(field: &Value) -> Value {
  let Some(entry) = field.as_object() else {
    return field.clone();
  };

  let mut upgraded: Map<String, Value> = entry.clone();
  let Some(mode) = upgraded.remove("mode") else {
    return Value::Object(upgraded);
  };

  let has_config = ["order", "arrayConfig", "vectorConfig"]
    .iter()
    .any(|key| entry.contains_key(*key));
  if !has_config {
    if mode.as_str() == Some(LEGACY_ARRAY_CONTAINS) {
      upgraded.insert("arrayConfig".to_string(), json!("CONTAINS"));
    } else {
      upgraded.insert("order".to_string(), mode);
    }
  }

  Value::Object(upgraded)
}
