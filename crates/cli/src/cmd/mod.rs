mod databases;
mod deploy;
mod list;
mod locations;
mod plan;

pub use databases::cmd_databases;
pub use deploy::cmd_deploy;
pub use list::cmd_list;
pub use locations::cmd_locations;
pub use plan::cmd_plan;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tokio::runtime::Runtime;

use indexsync_lib::config::{DatabaseTarget, ProjectConfig};
use indexsync_lib::remote::{ClientConfig, FirestoreAdminClient};

/// Where a command looks for its project and databases.
pub struct Target {
  pub config: PathBuf,
  /// Set by `--project` or `INDEXSYNC_PROJECT`.
  pub project: Option<String>,
}

impl Target {
  fn load_config(&self) -> Result<ProjectConfig> {
    ProjectConfig::load(&self.config)
      .with_context(|| format!("Failed to load project config: {}", self.config.display()))
  }

  /// The project and the databases selected by `--only`.
  fn resolve(&self, only: Option<&str>) -> Result<(String, Vec<DatabaseTarget>)> {
    let config = self.load_config()?;
    let databases = config.select(only)?;
    let project = match (&self.project, config.project) {
      (Some(project), _) => project.clone(),
      (None, Some(project)) => project,
      (None, None) => bail!(
        "No project set. Pass --project or add \"project\" to {}",
        self.config.display()
      ),
    };
    Ok((project, databases))
  }

  /// The project alone, reading the config file only when no flag names it.
  fn project(&self) -> Result<String> {
    if let Some(project) = &self.project {
      return Ok(project.clone());
    }
    match self.load_config()?.project {
      Some(project) => Ok(project),
      None => bail!(
        "No project set. Pass --project or add \"project\" to {}",
        self.config.display()
      ),
    }
  }
}

fn admin_client() -> Result<FirestoreAdminClient> {
  let config = ClientConfig::from_env().context("Invalid client configuration")?;
  FirestoreAdminClient::new(config).context("Failed to create Firestore Admin client")
}

fn runtime() -> Result<Runtime> {
  Runtime::new().context("Failed to create async runtime")
}
