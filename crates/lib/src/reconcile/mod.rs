//! Reconciliation of a database's indexes with an index file.
//!
//! A run validates the file, fetches the live state once, computes a
//! [`ReconcilePlan`] and then applies it one call at a time:
//!
//! 1. Create missing indexes
//! 2. Confirm, then delete unlisted indexes
//! 3. Confirm field override deletion
//! 4. Patch field overrides (TTL disables first)
//! 5. Delete unlisted field overrides
//!
//! Declining a deletion skips it and the run continues. The first failing
//! call ends the run; nothing is rolled back.

mod plan;
mod types;

pub use plan::ReconcilePlan;
pub use types::{ReconcileError, ReconcileOptions, ReconcileReport, ReconcileStep};

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::pretty::{field_summary, index_summary, spec_field_summary, spec_index_summary};
use crate::remote::{IndexAdmin, RemoteError};
use crate::spec::load_spec;

/// Yes/no decisions for destructive steps.
pub trait Confirm: Send + Sync {
  /// Ask `message`; `default` is the answer when the user just presses enter.
  fn confirm(&self, message: &str, default: bool) -> bool;
}

/// Answers every question with its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeDefault;

impl Confirm for AssumeDefault {
  fn confirm(&self, _message: &str, default: bool) -> bool {
    default
  }
}

/// Deletion decisions taken so far; `None` means the user has not been asked yet.
#[derive(Debug, Default)]
struct Decisions {
  delete_indexes: Option<bool>,
  delete_fields: Option<bool>,
}

impl Decisions {
  /// Decisions already fixed by `options` before any prompt.
  fn new(options: &ReconcileOptions) -> Self {
    let preset = if options.force {
      Some(true)
    } else if options.non_interactive {
      Some(false)
    } else {
      None
    };
    Self {
      delete_indexes: preset,
      delete_fields: preset,
    }
  }
}

/// Reconciles databases through an [`IndexAdmin`].
#[derive(Clone)]
pub struct Reconciler {
  admin: Arc<dyn IndexAdmin>,
  confirm: Arc<dyn Confirm>,
}

impl Reconciler {
  pub fn new(admin: Arc<dyn IndexAdmin>, confirm: Arc<dyn Confirm>) -> Self {
    Self { admin, confirm }
  }

  /// Fetch live state and compute the plan without changing anything.
  pub async fn plan(&self, project: &str, database: &str, spec: &Value) -> Result<ReconcilePlan, ReconcileError> {
    let file = load_spec(spec)?;
    let fetch_failed = |source| remote_error(ReconcileStep::FetchLive, project, database, None, source);

    let live_indexes = self.admin.list_indexes(project, database).await.map_err(fetch_failed)?;
    let live_fields = self
      .admin
      .list_field_overrides(project, database)
      .await
      .map_err(fetch_failed)?;
    let edition = self
      .admin
      .get_database_edition(project, database)
      .await
      .map_err(fetch_failed)?;

    debug!(
      project,
      database,
      %edition,
      live_indexes = live_indexes.len(),
      live_fields = live_fields.len(),
      "fetched live state"
    );
    Ok(ReconcilePlan::compute(&file, &live_indexes, &live_fields, edition))
  }

  /// Make `database` match `spec`.
  ///
  /// # Errors
  ///
  /// [`ReconcileError::Validation`] before any remote call when `spec` is
  /// malformed. [`ReconcileError::Remote`] when a call fails, carrying what
  /// was applied and what was never attempted.
  pub async fn reconcile(
    &self,
    project: &str,
    database: &str,
    spec: &Value,
    options: &ReconcileOptions,
  ) -> Result<ReconcileReport, ReconcileError> {
    let file = load_spec(spec)?;
    info!(
      project,
      database,
      indexes = file.indexes.len(),
      field_overrides = file.field_overrides.len(),
      "reconciling indexes"
    );

    let fetch_failed = |source| remote_error(ReconcileStep::FetchLive, project, database, None, source);
    let live_indexes = self.admin.list_indexes(project, database).await.map_err(fetch_failed)?;
    let live_fields = self
      .admin
      .list_field_overrides(project, database)
      .await
      .map_err(fetch_failed)?;
    let edition = self
      .admin
      .get_database_edition(project, database)
      .await
      .map_err(fetch_failed)?;

    let plan = ReconcilePlan::compute(&file, &live_indexes, &live_fields, edition);
    info!(
      project,
      database,
      %edition,
      creates = plan.indexes_to_create.len(),
      index_deletes = plan.indexes_to_delete.len(),
      patches = plan.fields_to_patch.len(),
      field_deletes = plan.fields_to_delete.len(),
      "plan computed"
    );

    let mut report = ReconcileReport {
      project: project.to_string(),
      database: database.to_string(),
      edition,
      live_indexes: live_indexes.len(),
      live_field_overrides: live_fields.len(),
      indexes_unchanged: plan.indexes_unchanged.clone(),
      fields_unchanged: plan.fields_unchanged.clone(),
      ttl_notices: plan.ttl_notices.clone(),
      ..Default::default()
    };
    let mut decisions = Decisions::new(options);

    for unchanged in &plan.indexes_unchanged {
      debug!(index = %spec_index_summary(unchanged), "skipping existing index");
    }

    // Create
    for (i, index) in plan.indexes_to_create.iter().enumerate() {
      info!(index = %spec_index_summary(index), "creating index");
      if let Err(source) = self.admin.create_index(project, database, index).await {
        return Err(self.failure(
          ReconcileStep::CreateIndexes,
          spec_index_summary(index),
          source,
          report,
          &plan,
          &decisions,
          i,
        ));
      }
      report.indexes_created.push(index.clone());
    }

    // Delete indexes
    if !plan.indexes_to_delete.is_empty() {
      let summaries: Vec<String> = plan.indexes_to_delete.iter().map(index_summary).collect();
      let authorized = self.authorize("indexes", &summaries, options);
      decisions.delete_indexes = Some(authorized);

      if authorized {
        info!(count = plan.indexes_to_delete.len(), "deleting indexes");
        for (i, index) in plan.indexes_to_delete.iter().enumerate() {
          let Some(name) = index.name.as_deref() else {
            continue;
          };
          if let Err(source) = self.admin.delete_index(name).await {
            return Err(self.failure(
              ReconcileStep::DeleteIndexes,
              index_summary(index),
              source,
              report,
              &plan,
              &decisions,
              i,
            ));
          }
          report.indexes_deleted.push(index.clone());
        }
      } else {
        report.indexes_retained = plan.indexes_to_delete.clone();
      }
    }

    // Confirm field deletion before patching
    if !plan.fields_to_delete.is_empty() {
      let summaries: Vec<String> = plan.fields_to_delete.iter().map(field_summary).collect();
      decisions.delete_fields = Some(self.authorize("field overrides", &summaries, options));
    }

    // Patch
    for unchanged in &plan.fields_unchanged {
      debug!(field = %spec_field_summary(unchanged), "skipping existing field override");
    }
    for (i, field) in plan.fields_to_patch.iter().enumerate() {
      info!(field = %spec_field_summary(field), "updating field override");
      if let Err(source) = self.admin.patch_field(project, database, field).await {
        return Err(self.failure(
          ReconcileStep::PatchFields,
          spec_field_summary(field),
          source,
          report,
          &plan,
          &decisions,
          i,
        ));
      }
      report.fields_patched.push(field.clone());
    }

    // Delete fields
    if decisions.delete_fields == Some(true) {
      info!(count = plan.fields_to_delete.len(), "deleting field overrides");
      for (i, field) in plan.fields_to_delete.iter().enumerate() {
        match self.admin.delete_field(&field.name).await {
          Ok(()) => report.fields_deleted.push(field.clone()),
          Err(source) if source.is_not_found() => {
            debug!(field = %field.name, "field override already absent");
            report.fields_already_absent.push(field.clone());
          }
          Err(source) => {
            return Err(self.failure(
              ReconcileStep::DeleteFields,
              field_summary(field),
              source,
              report,
              &plan,
              &decisions,
              i,
            ));
          }
        }
      }
    } else {
      report.fields_retained = plan.fields_to_delete.clone();
    }

    info!(
      project,
      database,
      created = report.indexes_created.len(),
      deleted = report.indexes_deleted.len(),
      patched = report.fields_patched.len(),
      fields_deleted = report.fields_deleted.len(),
      "reconcile complete"
    );
    Ok(report)
  }

  /// Decide whether unlisted entries of `kind` may be deleted.
  fn authorize(&self, kind: &str, summaries: &[String], options: &ReconcileOptions) -> bool {
    if options.force {
      return true;
    }

    if options.non_interactive {
      warn!(
        count = summaries.len(),
        "there are {} {kind} defined in your project that are not present in your index file; to delete them, run with --force",
        summaries.len()
      );
      return false;
    }

    info!(
      "the following {kind} are defined in your project but are not present in your index file:\n\t{}",
      summaries.join("\n\t")
    );
    self.confirm.confirm(
      &format!("Would you like to delete these {kind}? Selecting no will continue the rest of the deployment."),
      false,
    )
  }

  /// Build the error for a failed call at `position` of `step`.
  #[allow(clippy::too_many_arguments)]
  fn failure(
    &self,
    step: ReconcileStep,
    entry: String,
    source: RemoteError,
    applied: ReconcileReport,
    plan: &ReconcilePlan,
    decisions: &Decisions,
    position: usize,
  ) -> ReconcileError {
    let Unissued { not_attempted, not_asked } = unissued(step, position, plan, decisions);
    warn!(
      %step,
      entry = %entry,
      not_attempted = not_attempted.len(),
      not_asked = not_asked.len(),
      "reconcile stopped after a failed call"
    );

    ReconcileError::Remote {
      step,
      project: applied.project.clone(),
      database: applied.database.clone(),
      entry: Some(entry),
      source,
      applied: Box::new(applied),
      not_attempted,
      not_asked,
    }
  }
}

fn remote_error(
  step: ReconcileStep,
  project: &str,
  database: &str,
  entry: Option<String>,
  source: RemoteError,
) -> ReconcileError {
  ReconcileError::Remote {
    step,
    project: project.to_string(),
    database: database.to_string(),
    entry,
    source,
    applied: Box::new(ReconcileReport {
      project: project.to_string(),
      database: database.to_string(),
      ..Default::default()
    }),
    not_attempted: Vec::new(),
    not_asked: Vec::new(),
  }
}

/// Planned operations a failure leaves unissued.
#[derive(Debug, Default)]
struct Unissued {
  /// Operations the run would have issued.
  not_attempted: Vec<String>,
  /// Deletions whose confirmation prompt was never reached.
  not_asked: Vec<String>,
}

/// Split the operations after `position` in `step` by whether they would have run.
///
/// Declined deletions are dropped.
fn unissued(step: ReconcileStep, position: usize, plan: &ReconcilePlan, decisions: &Decisions) -> Unissued {
  let after = |phase: ReconcileStep| -> usize {
    match phase.cmp(&step) {
      std::cmp::Ordering::Less => usize::MAX,
      std::cmp::Ordering::Equal => position + 1,
      std::cmp::Ordering::Greater => 0,
    }
  };

  let mut result = Unissued::default();

  result.not_attempted.extend(
    plan
      .indexes_to_create
      .iter()
      .skip(after(ReconcileStep::CreateIndexes))
      .map(|i| format!("create index {}", spec_index_summary(i))),
  );
  let index_deletes = plan
    .indexes_to_delete
    .iter()
    .skip(after(ReconcileStep::DeleteIndexes))
    .map(|i| format!("delete index {}", index_summary(i)));
  match decisions.delete_indexes {
    Some(true) => result.not_attempted.extend(index_deletes),
    Some(false) => {}
    None => result.not_asked.extend(index_deletes),
  }
  result.not_attempted.extend(
    plan
      .fields_to_patch
      .iter()
      .skip(after(ReconcileStep::PatchFields))
      .map(|f| format!("update field override {}", spec_field_summary(f))),
  );
  let field_deletes = plan
    .fields_to_delete
    .iter()
    .skip(after(ReconcileStep::DeleteFields))
    .map(|f| format!("delete field override {}", field_summary(f)));
  match decisions.delete_fields {
    Some(true) => result.not_attempted.extend(field_deletes),
    Some(false) => {}
    None => result.not_asked.extend(field_deletes),
  }

  result
}
