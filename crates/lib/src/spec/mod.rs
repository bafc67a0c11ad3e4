//! The user-authored index file: data model, legacy upgrade,
//! validation, and canonicalization.

mod canonical;
mod types;
mod upgrade;
mod validate;

pub use canonical::process_index;
pub use types::{FieldIndexSpec, FieldOverrideSpec, IndexFieldSpec, IndexFile, IndexSpec};
pub use upgrade::upgrade_spec;
pub use validate::{ValidationError, decode_spec};

use serde_json::Value;

/// Upgrade a raw document to the current shape, then decode it.
pub fn load_spec(raw: &Value) -> Result<IndexFile, ValidationError> {
  decode_spec(&upgrade_spec(raw))
}
