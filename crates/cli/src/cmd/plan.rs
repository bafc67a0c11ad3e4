//! Implementation of the `indexsync plan` command.
//!
//! Fetches the live state of every selected database and prints the changes a
//! deploy would make. Nothing is modified.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;

use indexsync_lib::pretty::{field_summary, index_summary, spec_field_summary, spec_index_summary};
use indexsync_lib::reconcile::{AssumeDefault, ReconcilePlan, Reconciler};
use indexsync_lib::remote::IndexAdmin;

use super::{Target, admin_client, runtime};
use crate::output::{count, print_change, print_info, print_json, print_stat, print_success, symbols};

pub fn cmd_plan(target: &Target, only: Option<&str>, json: bool) -> Result<()> {
  let (project, databases) = target.resolve(only)?;

  let admin: Arc<dyn IndexAdmin> = Arc::new(admin_client()?);
  let reconciler = Reconciler::new(admin, Arc::new(AssumeDefault));
  let rt = runtime()?;

  let mut plans = Vec::with_capacity(databases.len());
  for database in databases {
    let spec = database
      .read_spec()
      .with_context(|| format!("Failed to read index file for database {}", database.database))?;
    let plan = rt
      .block_on(reconciler.plan(&project, &database.database, &spec))
      .with_context(|| format!("Failed to plan database {}", database.database))?;
    plans.push((database.database, plan));
  }

  if json {
    let entries: Vec<_> = plans
      .iter()
      .map(|(database, plan)| json!({ "project": project, "database": database, "plan": plan }))
      .collect();
    return print_json(&entries);
  }

  for (database, plan) in &plans {
    print_plan(&format!("{project}/{database}"), plan);
  }
  Ok(())
}

fn print_plan(label: &str, plan: &ReconcilePlan) {
  if plan.is_empty() {
    print_success(&format!("{} is up to date ({} edition)", label, plan.edition));
    return;
  }

  print_info(&format!("Changes for {} ({} edition)", label, plan.edition));
  for index in &plan.indexes_to_create {
    print_change(symbols::ADD, &spec_index_summary(index));
  }
  for index in &plan.indexes_to_delete {
    print_change(symbols::REMOVE, &index_summary(index));
  }
  for field in &plan.fields_to_patch {
    print_change(symbols::MODIFY, &spec_field_summary(field));
  }
  for field in &plan.fields_to_delete {
    print_change(symbols::REMOVE, &field_summary(field));
  }

  print_stat(
    "Indexes",
    &format!(
      "{} to create, {} unchanged, {} to delete",
      plan.indexes_to_create.len(),
      plan.indexes_unchanged.len(),
      plan.indexes_to_delete.len()
    ),
  );
  print_stat(
    "Field overrides",
    &format!(
      "{} to update, {} unchanged, {} to delete",
      plan.fields_to_patch.len(),
      plan.fields_unchanged.len(),
      plan.fields_to_delete.len()
    ),
  );

  let deletions = plan.indexes_to_delete.len() + plan.fields_to_delete.len();
  if deletions > 0 {
    println!();
    println!(
      "  {} would be deleted only with --force or after confirmation",
      count(deletions, "entry", "entries")
    );
  }
}
