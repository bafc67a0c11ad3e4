//! Access to the remote index configuration.
//!
//! [`IndexAdmin`] is the seam between the reconciliation engine and the
//! Firestore Admin API. [`FirestoreAdminClient`] implements it over HTTP.

mod config;
mod http;

pub use config::ClientConfig;
pub use http::FirestoreAdminClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::{DatabaseEdition, Field, Index};
use crate::spec::{FieldOverrideSpec, IndexSpec};

/// Errors from the remote resource client.
#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("{method} {url} failed with HTTP {status}: {message}")]
  Status {
    method: String,
    url: String,
    status: u16,
    message: String,
  },

  #[error("request to '{url}' failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("failed to decode response from '{url}': {source}")]
  Decode {
    url: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid client configuration: {0}")]
  Config(String),
}

impl RemoteError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, RemoteError::Status { status: 404, .. })
  }
}

/// Operations the reconciler needs from the remote index configuration.
///
/// Mutations return once the request is accepted. Index builds continue
/// server-side and are not awaited.
#[async_trait]
pub trait IndexAdmin: Send + Sync {
  async fn list_indexes(&self, project: &str, database: &str) -> Result<Vec<Index>, RemoteError>;

  /// Field overrides, excluding the database-wide `__default__` configuration.
  async fn list_field_overrides(&self, project: &str, database: &str) -> Result<Vec<Field>, RemoteError>;

  async fn get_database_edition(&self, project: &str, database: &str) -> Result<DatabaseEdition, RemoteError>;

  async fn create_index(&self, project: &str, database: &str, index: &IndexSpec) -> Result<(), RemoteError>;

  /// Delete the index with the given resource name.
  async fn delete_index(&self, name: &str) -> Result<(), RemoteError>;

  async fn patch_field(&self, project: &str, database: &str, field: &FieldOverrideSpec) -> Result<(), RemoteError>;

  /// Reset the field with the given resource name to the database defaults.
  async fn delete_field(&self, name: &str) -> Result<(), RemoteError>;
}
