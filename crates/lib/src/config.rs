//! Project configuration (`indexsync.json`).
//!
//! ```json
//! {
//!   "project": "my-project",
//!   "firestore": [
//!     { "database": "(default)", "indexes": "firestore.indexes.json" },
//!     { "database": "orders", "indexes": "orders.indexes.json" }
//!   ]
//! }
//! ```
//!
//! `firestore` may also be a single object. Index file paths are relative to
//! the configuration file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::consts::DEFAULT_DATABASE;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("database '{0}' is configured more than once")]
  DuplicateDatabase(String),

  #[error("no Firestore databases are configured")]
  NoDatabases,

  #[error("database '{0}' is not configured")]
  UnknownDatabase(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
  One(T),
  Many(Vec<T>),
}

#[derive(Deserialize)]
struct RawConfig {
  #[serde(default)]
  project: Option<String>,
  firestore: OneOrMany<RawTarget>,
}

#[derive(Deserialize)]
struct RawTarget {
  #[serde(default)]
  database: Option<String>,
  indexes: PathBuf,
}

/// One database to reconcile and the index file that describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
  pub database: String,
  pub indexes: PathBuf,
}

impl DatabaseTarget {
  /// Read the raw index file. Validation is left to the reconciler.
  pub fn read_spec(&self) -> Result<Value, ConfigError> {
    read_json(&self.indexes)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
  pub project: Option<String>,
  pub targets: Vec<DatabaseTarget>,
}

impl ProjectConfig {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    debug!(path = %path.display(), "loading project config");
    let raw: RawConfig = serde_json::from_value(read_json(path)?).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let raw_targets = match raw.firestore {
      OneOrMany::One(target) => vec![target],
      OneOrMany::Many(targets) => targets,
    };
    if raw_targets.is_empty() {
      return Err(ConfigError::NoDatabases);
    }

    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(raw_targets.len());
    for raw in raw_targets {
      let database = raw.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string());
      if !seen.insert(database.clone()) {
        return Err(ConfigError::DuplicateDatabase(database));
      }
      targets.push(DatabaseTarget {
        database,
        indexes: base.join(raw.indexes),
      });
    }

    Ok(Self {
      project: raw.project,
      targets,
    })
  }

  /// Targets to act on: all of them, or only the named database.
  pub fn select(&self, only: Option<&str>) -> Result<Vec<DatabaseTarget>, ConfigError> {
    match only {
      None => Ok(self.targets.clone()),
      Some(name) => self
        .targets
        .iter()
        .find(|t| t.database == name)
        .map(|t| vec![t.clone()])
        .ok_or_else(|| ConfigError::UnknownDatabase(name.to_string())),
    }
  }
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
  let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })
}
