//! Implementation of the `indexsync deploy` command.
//!
//! Reads every selected index file, validates all of them before any remote
//! call, then reconciles each database. When no prompt can occur the databases
//! are reconciled concurrently; otherwise one after another so that questions
//! never interleave.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::debug;

use indexsync_lib::pretty::{field_summary, index_summary, spec_field_summary, spec_index_summary};
use indexsync_lib::reconcile::{ReconcileError, ReconcileOptions, ReconcileReport, Reconciler};
use indexsync_lib::remote::IndexAdmin;
use indexsync_lib::spec::load_spec;

use super::{Target, admin_client, runtime};
use crate::output::{count, print_change, print_error, print_info, print_json, print_stat, print_success, symbols};
use crate::prompts::TerminalConfirm;

struct Outcome {
  database: String,
  result: Result<ReconcileReport, ReconcileError>,
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
  database: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  report: Option<&'a ReconcileReport>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  applied: Option<&'a ReconcileReport>,
  #[serde(skip_serializing_if = "Option::is_none")]
  not_attempted: Option<&'a [String]>,
  #[serde(skip_serializing_if = "Option::is_none")]
  not_asked: Option<&'a [String]>,
}

/// Execute the deploy command.
///
/// Prints a report per database, including what was applied and what was
/// never attempted when a database fails. Fails if any database failed.
pub fn cmd_deploy(target: &Target, only: Option<&str>, options: ReconcileOptions, json: bool) -> Result<()> {
  let (project, databases) = target.resolve(only)?;

  let mut specs = Vec::with_capacity(databases.len());
  for database in databases {
    let spec = database
      .read_spec()
      .with_context(|| format!("Failed to read index file for database {}", database.database))?;
    load_spec(&spec).with_context(|| format!("Invalid index file: {}", database.indexes.display()))?;
    specs.push((database.database, spec));
  }

  let admin: Arc<dyn IndexAdmin> = Arc::new(admin_client()?);
  let reconciler = Reconciler::new(admin, Arc::new(TerminalConfirm));

  let rt = runtime()?;
  let outcomes = rt.block_on(deploy_all(&reconciler, &project, specs, options))?;

  if json {
    let entries: Vec<JsonOutcome<'_>> = outcomes.iter().map(json_outcome).collect();
    print_json(&entries)?;
  } else {
    for outcome in &outcomes {
      print_outcome(&project, outcome);
    }
  }

  let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
  if failed > 0 {
    bail!("{} of {} failed to deploy", failed, count(outcomes.len(), "database", "databases"));
  }
  Ok(())
}

async fn deploy_all(
  reconciler: &Reconciler,
  project: &str,
  specs: Vec<(String, Value)>,
  options: ReconcileOptions,
) -> Result<Vec<Outcome>> {
  let interactive = !options.force && !options.non_interactive;
  if interactive || specs.len() <= 1 {
    let mut outcomes = Vec::with_capacity(specs.len());
    for (database, spec) in specs {
      let result = reconciler.reconcile(project, &database, &spec, &options).await;
      outcomes.push(Outcome { database, result });
    }
    return Ok(outcomes);
  }

  debug!(databases = specs.len(), "deploying databases concurrently");
  let mut tasks = JoinSet::new();
  for (position, (database, spec)) in specs.into_iter().enumerate() {
    let reconciler = reconciler.clone();
    let project = project.to_string();
    tasks.spawn(async move {
      let result = reconciler.reconcile(&project, &database, &spec, &options).await;
      (position, Outcome { database, result })
    });
  }

  let mut outcomes = Vec::new();
  while let Some(joined) = tasks.join_next().await {
    outcomes.push(joined.context("Deploy task failed")?);
  }
  outcomes.sort_by_key(|(position, _)| *position);
  Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
}

fn json_outcome(outcome: &Outcome) -> JsonOutcome<'_> {
  let mut entry = JsonOutcome {
    database: &outcome.database,
    report: None,
    error: None,
    applied: None,
    not_attempted: None,
    not_asked: None,
  };
  match &outcome.result {
    Ok(report) => entry.report = Some(report),
    Err(err) => {
      entry.error = Some(err.to_string());
      if let ReconcileError::Remote {
        applied,
        not_attempted,
        not_asked,
        ..
      } = err
      {
        entry.applied = Some(&**applied);
        entry.not_attempted = Some(not_attempted.as_slice());
        if !not_asked.is_empty() {
          entry.not_asked = Some(not_asked.as_slice());
        }
      }
    }
  }
  entry
}

fn print_outcome(project: &str, outcome: &Outcome) {
  let label = format!("{}/{}", project, outcome.database);
  match &outcome.result {
    Ok(report) => {
      if report.is_noop() {
        print_success(&format!("{} is up to date ({} edition)", label, report.edition));
      } else {
        print_success(&format!("Deployed indexes to {} ({} edition)", label, report.edition));
      }
      print_report(report);
    }
    Err(ReconcileError::Remote {
      entry,
      source,
      step,
      applied,
      not_attempted,
      not_asked,
      ..
    }) => {
      let entry = entry.as_deref().map(|e| format!(" ({e})")).unwrap_or_default();
      print_error(&format!("{label}: failed to {step}{entry}: {source}"));
      print_info("Applied before the failure:");
      print_report(applied);
      if !not_attempted.is_empty() {
        println!("  Not attempted:");
        for operation in not_attempted {
          println!("    {} {}", symbols::INFO, operation);
        }
      }
      if !not_asked.is_empty() {
        println!("  Not asked (deletion was awaiting confirmation):");
        for operation in not_asked {
          println!("    {} {}", symbols::INFO, operation);
        }
      }
    }
    Err(err) => print_error(&format!("{label}: {err}")),
  }
}

fn print_report(report: &ReconcileReport) {
  for index in &report.indexes_created {
    print_change(symbols::ADD, &spec_index_summary(index));
  }
  for index in &report.indexes_deleted {
    print_change(symbols::REMOVE, &index_summary(index));
  }
  for field in &report.fields_patched {
    print_change(symbols::MODIFY, &spec_field_summary(field));
  }
  for field in &report.fields_deleted {
    print_change(symbols::REMOVE, &field_summary(field));
  }

  print_stat(
    "Indexes",
    &format!(
      "{} created, {} unchanged, {} deleted, {} kept",
      report.indexes_created.len(),
      report.indexes_unchanged.len(),
      report.indexes_deleted.len(),
      report.indexes_retained.len()
    ),
  );
  print_stat(
    "Field overrides",
    &format!(
      "{} updated, {} unchanged, {} deleted, {} kept",
      report.fields_patched.len(),
      report.fields_unchanged.len(),
      report.fields_deleted.len(),
      report.fields_retained.len()
    ),
  );
  if !report.fields_already_absent.is_empty() {
    print_stat("Already absent", &report.fields_already_absent.len().to_string());
  }
  for field in &report.ttl_notices {
    print_stat("TTL kept", field);
  }
}
