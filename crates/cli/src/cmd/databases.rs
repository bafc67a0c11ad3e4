use anyhow::{Context, Result};

use indexsync_lib::api::parse_database_name;
use indexsync_lib::sort::compare_api_database;

use super::{Target, admin_client, runtime};
use crate::output::{count, print_info, print_json};

pub fn cmd_databases(target: &Target, json: bool) -> Result<()> {
  let project = target.project()?;
  let client = admin_client()?;
  let rt = runtime()?;

  let mut databases = rt
    .block_on(client.list_databases(&project))
    .with_context(|| format!("Failed to list databases of {project}"))?;
  databases.sort_by(compare_api_database);

  if json {
    return print_json(&databases);
  }

  print_info(&format!("{}: {}", project, count(databases.len(), "database", "databases")));
  for database in &databases {
    let id = parse_database_name(&database.name)
      .map(|name| name.database)
      .unwrap_or_else(|| database.name.clone());
    let location = database.location_id.as_deref().unwrap_or("-");
    println!("  {:<24} {:<12} {}", id, database.edition().as_str(), location);
  }
  Ok(())
}
