//! Firestore Admin v1 REST client.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::api::{ApiScope, ArrayConfig, Database, DatabaseEdition, Density, Field, Index, IndexField, Location, Order, QueryScope};
use crate::consts::DEFAULT_FIELD;
use crate::spec::{FieldOverrideSpec, IndexSpec};

use super::{ClientConfig, IndexAdmin, RemoteError};

const API_VERSION: &str = "v1";
const FIELD_OVERRIDE_FILTER: &str = "indexConfig.usesAncestorConfig=false OR ttlConfig:*";

/// Body of an index creation request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIndexBody<'a> {
  fields: &'a [IndexField],
  query_scope: QueryScope,
  #[serde(skip_serializing_if = "Option::is_none")]
  api_scope: Option<ApiScope>,
  #[serde(skip_serializing_if = "Option::is_none")]
  density: Option<Density>,
  #[serde(skip_serializing_if = "Option::is_none")]
  multikey: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldIndexBody<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  query_scope: Option<QueryScope>,
  fields: [SingleFieldBody<'a>; 1],
  #[serde(skip_serializing_if = "Option::is_none")]
  api_scope: Option<ApiScope>,
  #[serde(skip_serializing_if = "Option::is_none")]
  density: Option<Density>,
  #[serde(skip_serializing_if = "Option::is_none")]
  multikey: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SingleFieldBody<'a> {
  field_path: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  order: Option<Order>,
  #[serde(skip_serializing_if = "Option::is_none")]
  array_config: Option<ArrayConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexConfigBody<'a> {
  indexes: Vec<FieldIndexBody<'a>>,
}

/// Body of a field override patch. An empty `ttlConfig` enables TTL.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatchFieldBody<'a> {
  index_config: IndexConfigBody<'a>,
  #[serde(skip_serializing_if = "Option::is_none")]
  ttl_config: Option<Value>,
}

fn patch_field_body(field: &FieldOverrideSpec) -> PatchFieldBody<'_> {
  let indexes = field
    .indexes
    .iter()
    .map(|index| FieldIndexBody {
      query_scope: index.query_scope,
      fields: [SingleFieldBody {
        field_path: &field.field_path,
        order: index.order,
        array_config: index.array_config,
      }],
      api_scope: index.api_scope,
      density: index.density,
      multikey: index.multikey,
    })
    .collect();

  PatchFieldBody {
    index_config: IndexConfigBody { indexes },
    ttl_config: (field.ttl == Some(true)).then(|| Value::Object(Default::default())),
  }
}

/// HTTP implementation of [`IndexAdmin`].
#[derive(Debug, Clone)]
pub struct FirestoreAdminClient {
  http: reqwest::Client,
  origin: String,
  access_token: Option<String>,
}

impl FirestoreAdminClient {
  pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
    let http = reqwest::Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| RemoteError::Config(format!("failed to create HTTP client: {e}")))?;

    Ok(Self {
      http,
      origin: config.origin.trim_end_matches('/').to_string(),
      access_token: config.access_token,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}/{}", self.origin, API_VERSION, path.trim_start_matches('/'))
  }

  /// Issue one request and return the decoded JSON body (`null` when empty).
  async fn send<B: Serialize + ?Sized>(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, &str)],
    body: Option<&B>,
  ) -> Result<Value, RemoteError> {
    let url = self.url(path);
    debug!(%method, %url, "sending request");

    let mut request = self.http.request(method.clone(), &url);
    if !query.is_empty() {
      request = request.query(query);
    }
    if let Some(token) = &self.access_token {
      request = request.bearer_auth(token);
    }
    if let Some(body) = body {
      request = request.json(body);
    }

    let transport = |source| RemoteError::Transport { url: url.clone(), source };
    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    let text = response.text().await.map_err(transport)?;

    if !status.is_success() {
      return Err(RemoteError::Status {
        method: method.to_string(),
        url: url.clone(),
        status: status.as_u16(),
        message: error_message(&text).unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
      });
    }

    if text.trim().is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|source| RemoteError::Decode { url, source })
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
    let value = self.send(Method::GET, path, &[], None::<&()>).await?;
    decode(&self.url(path), value)
  }

  /// GET every page of a list endpoint and collect the items under `key`.
  async fn list_all<T: DeserializeOwned>(&self, path: &str, filter: Option<&str>, key: &str) -> Result<Vec<T>, RemoteError> {
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
      let mut query: Vec<(&str, &str)> = Vec::new();
      if let Some(filter) = filter {
        query.push(("filter", filter));
      }
      if let Some(token) = page_token.as_deref() {
        query.push(("pageToken", token));
      }

      let mut page = self.send(Method::GET, path, &query, None::<&()>).await?;
      if let Some(list) = page.get_mut(key).map(Value::take) {
        let mut decoded: Vec<T> = decode(&self.url(path), list)?;
        items.append(&mut decoded);
      }

      match page.get("nextPageToken").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
        _ => break,
      }
    }

    Ok(items)
  }

  /// Every database of `project`.
  #[instrument(skip(self))]
  pub async fn list_databases(&self, project: &str) -> Result<Vec<Database>, RemoteError> {
    self
      .list_all(&format!("projects/{project}/databases"), None, "databases")
      .await
  }

  #[instrument(skip(self))]
  pub async fn get_database(&self, project: &str, database: &str) -> Result<Database, RemoteError> {
    self.get(&format!("projects/{project}/databases/{database}")).await
  }

  /// Locations a database of `project` can be created in.
  #[instrument(skip(self))]
  pub async fn list_locations(&self, project: &str) -> Result<Vec<Location>, RemoteError> {
    self
      .list_all(&format!("projects/{project}/locations"), None, "locations")
      .await
  }
}

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, RemoteError> {
  serde_json::from_value(value).map_err(|source| RemoteError::Decode {
    url: url.to_string(),
    source,
  })
}

/// The `error.message` of a Google API error body.
fn error_message(body: &str) -> Option<String> {
  let value: Value = serde_json::from_str(body).ok()?;
  value
    .pointer("/error/message")
    .and_then(Value::as_str)
    .map(str::to_string)
}

#[async_trait]
impl IndexAdmin for FirestoreAdminClient {
  #[instrument(skip(self))]
  async fn list_indexes(&self, project: &str, database: &str) -> Result<Vec<Index>, RemoteError> {
    let path = format!("projects/{project}/databases/{database}/collectionGroups/-/indexes");
    self.list_all(&path, None, "indexes").await
  }

  #[instrument(skip(self))]
  async fn list_field_overrides(&self, project: &str, database: &str) -> Result<Vec<Field>, RemoteError> {
    let path = format!("projects/{project}/databases/{database}/collectionGroups/-/fields");
    let fields: Vec<Field> = self.list_all(&path, Some(FIELD_OVERRIDE_FILTER), "fields").await?;
    Ok(fields.into_iter().filter(|f| !f.name.contains(DEFAULT_FIELD)).collect())
  }

  #[instrument(skip(self))]
  async fn get_database_edition(&self, project: &str, database: &str) -> Result<DatabaseEdition, RemoteError> {
    Ok(self.get_database(project, database).await?.edition())
  }

  #[instrument(skip(self, index), fields(collection_group = %index.collection_group))]
  async fn create_index(&self, project: &str, database: &str, index: &IndexSpec) -> Result<(), RemoteError> {
    let path = format!(
      "projects/{project}/databases/{database}/collectionGroups/{}/indexes",
      index.collection_group
    );
    let body = CreateIndexBody {
      fields: &index.fields,
      query_scope: index.query_scope,
      api_scope: index.api_scope,
      density: index.density,
      multikey: index.multikey,
    };
    self.send(Method::POST, &path, &[], Some(&body)).await?;
    Ok(())
  }

  #[instrument(skip(self))]
  async fn delete_index(&self, name: &str) -> Result<(), RemoteError> {
    self.send(Method::DELETE, name, &[], None::<&()>).await?;
    Ok(())
  }

  #[instrument(skip(self, field), fields(collection_group = %field.collection_group, field_path = %field.field_path))]
  async fn patch_field(&self, project: &str, database: &str, field: &FieldOverrideSpec) -> Result<(), RemoteError> {
    let path = format!(
      "projects/{project}/databases/{database}/collectionGroups/{}/fields/{}",
      field.collection_group, field.field_path
    );
    let body = patch_field_body(field);
    // Without an explicit TTL opinion only the index config is replaced.
    let query: &[(&str, &str)] = if field.ttl.is_none() {
      &[("updateMask", "indexConfig")]
    } else {
      &[]
    };
    self.send(Method::PATCH, &path, query, Some(&body)).await?;
    Ok(())
  }

  #[instrument(skip(self))]
  async fn delete_field(&self, name: &str) -> Result<(), RemoteError> {
    let empty = Value::Object(Default::default());
    self.send(Method::PATCH, name, &[], Some(&empty)).await?;
    Ok(())
  }
}
