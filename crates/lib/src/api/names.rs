//! Parsing of Admin API resource names.
//!
//! ```text
//! projects/{project}/databases/{database}/collectionGroups/{group}/indexes/{id}
//! projects/{project}/databases/{database}/collectionGroups/{group}/fields/{path}
//! projects/{project}/databases/{database}
//! ```
//!
//! A leading `/` is tolerated. Parsing never panics: malformed names yield `None`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexName {
  pub project: String,
  pub database: String,
  pub collection_group: String,
  pub index_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldName {
  pub project: String,
  pub database: String,
  pub collection_group: String,
  pub field_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseName {
  pub project: String,
  pub database: String,
}

/// Split a collection-group scoped name into its six variable parts.
///
/// The final segment keeps any remaining `/` characters.
fn split_group_child<'a>(name: &'a str, child: &str) -> Option<[&'a str; 4]> {
  let mut parts = name.trim_start_matches('/').splitn(8, '/');
  let mut next = || parts.next().filter(|s| !s.is_empty());

  if next()? != "projects" {
    return None;
  }
  let project = next()?;
  if next()? != "databases" {
    return None;
  }
  let database = next()?;
  if next()? != "collectionGroups" {
    return None;
  }
  let group = next()?;
  if next()? != child {
    return None;
  }
  let leaf = next()?;
  Some([project, database, group, leaf])
}

pub fn parse_index_name(name: &str) -> Option<IndexName> {
  let [project, database, collection_group, index_id] = split_group_child(name, "indexes")?;
  Some(IndexName {
    project: project.to_string(),
    database: database.to_string(),
    collection_group: collection_group.to_string(),
    index_id: index_id.to_string(),
  })
}

pub fn parse_field_name(name: &str) -> Option<FieldName> {
  let [project, database, collection_group, field_path] = split_group_child(name, "fields")?;
  Some(FieldName {
    project: project.to_string(),
    database: database.to_string(),
    collection_group: collection_group.to_string(),
    field_path: field_path.to_string(),
  })
}

pub fn parse_database_name(name: &str) -> Option<DatabaseName> {
  let mut parts = name.trim_start_matches('/').split('/');
  match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
    (Some("projects"), Some(project), Some("databases"), Some(database), None)
      if !project.is_empty() && !database.is_empty() =>
    {
      Some(DatabaseName {
        project: project.to_string(),
        database: database.to_string(),
      })
    }
    _ => None,
  }
}

/// Collection group of a live index name, if the name is well formed.
pub fn index_collection_group(name: Option<&str>) -> Option<String> {
  name.and_then(parse_index_name).map(|n| n.collection_group)
}
