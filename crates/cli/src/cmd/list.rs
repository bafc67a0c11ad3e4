//! Implementation of the `indexsync list` command.
//!
//! Prints the live indexes and field overrides of the selected databases in a
//! stable order, or with `--json` an index file that reproduces them.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use indexsync_lib::api::{DatabaseEdition, Field, Index};
use indexsync_lib::export::make_index_spec;
use indexsync_lib::pretty::{field_summary, index_summary};
use indexsync_lib::remote::{FirestoreAdminClient, IndexAdmin};
use indexsync_lib::sort::{compare_api_field, compare_api_index};
use indexsync_lib::spec::IndexFile;

use super::{Target, admin_client, runtime};
use crate::output::{count, print_info, print_json, state_label};

struct LiveState {
  indexes: Vec<Index>,
  fields: Vec<Field>,
  edition: DatabaseEdition,
}

async fn fetch(client: &FirestoreAdminClient, project: &str, database: &str) -> Result<LiveState> {
  let mut indexes = client
    .list_indexes(project, database)
    .await
    .with_context(|| format!("Failed to list indexes of {project}/{database}"))?;
  let mut fields = client
    .list_field_overrides(project, database)
    .await
    .with_context(|| format!("Failed to list field overrides of {project}/{database}"))?;
  let edition = client
    .get_database_edition(project, database)
    .await
    .with_context(|| format!("Failed to get database {project}/{database}"))?;

  indexes.sort_by(compare_api_index);
  fields.sort_by(compare_api_field);
  Ok(LiveState {
    indexes,
    fields,
    edition,
  })
}

/// Execute the list command.
///
/// With `--json` and a single database the output is that database's index
/// file; with several it is an object keyed by database id.
pub fn cmd_list(target: &Target, only: Option<&str>, json: bool) -> Result<()> {
  let (project, databases) = target.resolve(only)?;
  let client = admin_client()?;
  let rt = runtime()?;

  let mut states = Vec::with_capacity(databases.len());
  for database in databases {
    let state = rt.block_on(fetch(&client, &project, &database.database))?;
    states.push((database.database, state));
  }

  if json {
    let mut files: BTreeMap<String, IndexFile> = states
      .iter()
      .map(|(database, state)| {
        (
          database.clone(),
          make_index_spec(&state.indexes, &state.fields, state.edition),
        )
      })
      .collect();
    if files.len() == 1 {
      if let Some((_, file)) = files.pop_first() {
        return print_json(&file);
      }
    }
    return print_json(&files);
  }

  for (database, state) in &states {
    print_live_state(&format!("{project}/{database}"), state);
  }
  Ok(())
}

fn print_live_state(label: &str, state: &LiveState) {
  print_info(&format!(
    "{} ({} edition): {}, {}",
    label,
    state.edition,
    count(state.indexes.len(), "index", "indexes"),
    count(state.fields.len(), "field override", "field overrides")
  ));
  for index in &state.indexes {
    println!("  {} {}", index_summary(index), state_label(index.state));
  }
  for field in &state.fields {
    println!("  {}", field_summary(field));
  }
}
