//! Test utilities for indexsync-lib.
//!
//! An in-memory [`IndexAdmin`] that behaves like a small Admin API, and a
//! scripted [`Confirm`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::{DatabaseEdition, Field, Index, IndexConfig, IndexField, IndexState, QueryScope, TtlConfig, TtlState};
use crate::reconcile::Confirm;
use crate::remote::{IndexAdmin, RemoteError};
use crate::spec::{FieldOverrideSpec, IndexSpec, process_index};

/// A call received by [`FakeAdmin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
  ListIndexes,
  ListFieldOverrides,
  GetDatabaseEdition,
  /// Collection group of the created index.
  CreateIndex(String),
  DeleteIndex(String),
  /// `collectionGroup.fieldPath` of the patched field.
  PatchField(String),
  DeleteField(String),
}

impl AdminCall {
  pub fn is_mutation(&self) -> bool {
    !matches!(
      self,
      AdminCall::ListIndexes | AdminCall::ListFieldOverrides | AdminCall::GetDatabaseEdition
    )
  }
}

#[derive(Default)]
struct FakeState {
  indexes: Vec<Index>,
  fields: Vec<Field>,
  edition: DatabaseEdition,
  calls: Vec<AdminCall>,
  next_id: u32,
  fail_create_for: Option<String>,
  fail_listing: bool,
  vanished: Vec<String>,
}

#[derive(Default)]
pub struct FakeAdmin {
  state: Mutex<FakeState>,
}

fn status(method: &str, url: &str, status: u16) -> RemoteError {
  RemoteError::Status {
    method: method.to_string(),
    url: url.to_string(),
    status,
    message: format!("fake error {status}"),
  }
}

impl FakeAdmin {
  pub fn with_state(indexes: Vec<Index>, fields: Vec<Field>, edition: DatabaseEdition) -> Self {
    Self {
      state: Mutex::new(FakeState {
        indexes,
        fields,
        edition,
        ..Default::default()
      }),
    }
  }

  /// Fail index creation for `collection_group` with HTTP 500.
  pub fn fail_create_for(&self, collection_group: &str) {
    self.state.lock().unwrap().fail_create_for = Some(collection_group.to_string());
  }

  /// Fail every list call with HTTP 403.
  pub fn fail_listing(&self) {
    self.state.lock().unwrap().fail_listing = true;
  }

  /// Make deleting `name` answer 404, as if it was removed concurrently.
  pub fn vanish_field(&self, name: &str) {
    self.state.lock().unwrap().vanished.push(name.to_string());
  }

  pub fn calls(&self) -> Vec<AdminCall> {
    self.state.lock().unwrap().calls.clone()
  }

  pub fn mutations(&self) -> Vec<AdminCall> {
    self.calls().into_iter().filter(AdminCall::is_mutation).collect()
  }
}

#[async_trait]
impl IndexAdmin for FakeAdmin {
  async fn list_indexes(&self, _project: &str, _database: &str) -> Result<Vec<Index>, RemoteError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(AdminCall::ListIndexes);
    if state.fail_listing {
      return Err(status("GET", "indexes", 403));
    }
    Ok(state.indexes.clone())
  }

  async fn list_field_overrides(&self, _project: &str, _database: &str) -> Result<Vec<Field>, RemoteError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(AdminCall::ListFieldOverrides);
    if state.fail_listing {
      return Err(status("GET", "fields", 403));
    }
    Ok(state.fields.clone())
  }

  async fn get_database_edition(&self, _project: &str, _database: &str) -> Result<DatabaseEdition, RemoteError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(AdminCall::GetDatabaseEdition);
    Ok(state.edition)
  }

  async fn create_index(&self, project: &str, database: &str, index: &IndexSpec) -> Result<(), RemoteError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(AdminCall::CreateIndex(index.collection_group.clone()));
    if state.fail_create_for.as_deref() == Some(index.collection_group.as_str()) {
      return Err(status("POST", &index.collection_group, 500));
    }

    state.next_id += 1;
    let edition = state.edition;
    let canonical = process_index(index, edition);
    let name = format!(
      "projects/{project}/databases/{database}/collectionGroups/{}/indexes/idx{}",
      index.collection_group, state.next_id
    );
    state.indexes.push(Index {
      name: Some(name),
      query_scope: index.query_scope,
      fields: canonical.fields,
      api_scope: index.api_scope,
      density: Some(index.density.unwrap_or(edition.default_density())),
      multikey: index.multikey,
      unique: None,
      state: Some(IndexState::Creating),
    });
    Ok(())
  }

  async fn delete_index(&self, name: &str) -> Result<(), RemoteError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(AdminCall::DeleteIndex(name.to_string()));
    let before = state.indexes.len();
    state.indexes.retain(|i| i.name.as_deref() != Some(name));
    if state.indexes.len() == before {
      return Err(status("DELETE", name, 404));
    }
    Ok(())
  }

  async fn patch_field(&self, project: &str, database: &str, field: &FieldOverrideSpec) -> Result<(), RemoteError> {
    let mut state = self.state.lock().unwrap();
    state
      .calls
      .push(AdminCall::PatchField(format!("{}.{}", field.collection_group, field.field_path)));

    let name = format!(
      "projects/{project}/databases/{database}/collectionGroups/{}/fields/{}",
      field.collection_group, field.field_path
    );
    let previous_ttl = state
      .fields
      .iter()
      .find(|f| f.name == name)
      .and_then(|f| f.ttl_config.clone());
    let ttl_config = match field.ttl {
      Some(true) => Some(TtlConfig {
        state: Some(TtlState::Creating),
      }),
      Some(false) => None,
      None => previous_ttl,
    };
    let indexes = field
      .indexes
      .iter()
      .map(|index| Index {
        name: None,
        query_scope: index.query_scope.unwrap_or(QueryScope::Collection),
        fields: vec![IndexField {
          field_path: field.field_path.clone(),
          order: index.order,
          array_config: index.array_config,
          vector_config: None,
        }],
        api_scope: index.api_scope,
        density: index.density,
        multikey: index.multikey,
        unique: None,
        state: Some(IndexState::Ready),
      })
      .collect();

    state.fields.retain(|f| f.name != name);
    state.fields.push(Field {
      name,
      index_config: IndexConfig {
        indexes,
        uses_ancestor_config: Some(false),
        ancestor_field: None,
      },
      ttl_config,
    });
    Ok(())
  }

  async fn delete_field(&self, name: &str) -> Result<(), RemoteError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(AdminCall::DeleteField(name.to_string()));
    if state.vanished.iter().any(|v| v == name) {
      return Err(status("PATCH", name, 404));
    }
    state.fields.retain(|f| f.name != name);
    Ok(())
  }
}

/// A [`Confirm`] that replays canned answers and counts questions.
///
/// Once the answers run out it returns the question's default.
#[derive(Clone, Default)]
pub struct ScriptedConfirm {
  answers: Arc<Mutex<VecDeque<bool>>>,
  asked: Arc<Mutex<usize>>,
}

impl ScriptedConfirm {
  pub fn answers(answers: Vec<bool>) -> Self {
    Self {
      answers: Arc::new(Mutex::new(answers.into())),
      asked: Arc::default(),
    }
  }

  /// No canned answers; every question gets its default.
  pub fn never() -> Self {
    Self::default()
  }

  pub fn asked(&self) -> usize {
    *self.asked.lock().unwrap()
  }
}

impl Confirm for ScriptedConfirm {
  fn confirm(&self, _message: &str, default: bool) -> bool {
    *self.asked.lock().unwrap() += 1;
    self.answers.lock().unwrap().pop_front().unwrap_or(default)
  }
}

/// A live composite index in the `(default)` database of project `p`.
pub fn live_index(id: &str, collection_group: &str, fields: Vec<IndexField>) -> Index {
  Index {
    name: Some(format!(
      "projects/p/databases/(default)/collectionGroups/{collection_group}/indexes/{id}"
    )),
    query_scope: QueryScope::Collection,
    fields,
    api_scope: None,
    density: None,
    multikey: None,
    unique: None,
    state: Some(IndexState::Ready),
  }
}

/// A live field override in the `(default)` database of project `p`.
pub fn live_field(collection_group: &str, field_path: &str, indexes: Vec<Index>, ttl: bool) -> Field {
  Field {
    name: format!("projects/p/databases/(default)/collectionGroups/{collection_group}/fields/{field_path}"),
    index_config: IndexConfig {
      indexes,
      uses_ancestor_config: Some(false),
      ancestor_field: None,
    },
    ttl_config: ttl.then(|| TtlConfig {
      state: Some(TtlState::Active),
    }),
  }
}
