//! Types for the reconcile operation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::api::{DatabaseEdition, Field, Index};
use crate::remote::RemoteError;
use crate::spec::{FieldOverrideSpec, IndexSpec, ValidationError};

/// Options for a reconcile run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
  /// Delete unlisted indexes and field overrides without asking.
  pub force: bool,
  /// Never prompt. Without `force`, deletions are skipped.
  pub non_interactive: bool,
}

/// Phase of a reconcile run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStep {
  Validate,
  FetchLive,
  CreateIndexes,
  DeleteIndexes,
  PatchFields,
  DeleteFields,
}

impl fmt::Display for ReconcileStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Validate => "validate",
      Self::FetchLive => "fetch live state",
      Self::CreateIndexes => "create indexes",
      Self::DeleteIndexes => "delete indexes",
      Self::PatchFields => "patch field overrides",
      Self::DeleteFields => "delete field overrides",
    };
    write!(f, "{name}")
  }
}

/// What a reconcile run did, in the order it did it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
  pub project: String,
  pub database: String,
  pub edition: DatabaseEdition,

  /// Live indexes before the run.
  pub live_indexes: usize,
  /// Live field overrides before the run.
  pub live_field_overrides: usize,

  pub indexes_created: Vec<IndexSpec>,
  pub indexes_unchanged: Vec<IndexSpec>,
  pub indexes_deleted: Vec<Index>,
  /// Unlisted indexes left in place because deletion was not authorized.
  pub indexes_retained: Vec<Index>,

  pub fields_patched: Vec<FieldOverrideSpec>,
  pub fields_unchanged: Vec<FieldOverrideSpec>,
  pub fields_deleted: Vec<Field>,
  /// Unlisted field overrides left in place because deletion was not authorized.
  pub fields_retained: Vec<Field>,
  /// Field overrides that were already gone when deleted.
  pub fields_already_absent: Vec<Field>,

  /// `collectionGroup.fieldPath` of fields whose TTL policy the index file does not mention.
  pub ttl_notices: Vec<String>,
}

impl ReconcileReport {
  /// Returns true if the run changed nothing remotely.
  pub fn is_noop(&self) -> bool {
    self.indexes_created.is_empty()
      && self.indexes_deleted.is_empty()
      && self.fields_patched.is_empty()
      && self.fields_deleted.is_empty()
  }
}

/// Errors that end a reconcile run.
#[derive(Debug, Error)]
pub enum ReconcileError {
  /// The index file is malformed. Nothing was sent.
  #[error("invalid index file: {0}")]
  Validation(#[from] ValidationError),

  /// A remote call failed. Earlier calls in the run took effect.
  #[error("failed to {step} on {project}/{database}: {source}")]
  Remote {
    step: ReconcileStep,
    project: String,
    database: String,
    /// The entry being processed, if the failure concerns one.
    entry: Option<String>,
    #[source]
    source: RemoteError,
    /// Everything done before the failure.
    applied: Box<ReconcileReport>,
    /// Planned operations that were never issued.
    not_attempted: Vec<String>,
    /// Deletions that were still waiting for confirmation.
    not_asked: Vec<String>,
  },
}
