use anyhow::{Context, Result};

use indexsync_lib::sort::compare_location;

use super::{Target, admin_client, runtime};
use crate::output::{count, print_info, print_json};

pub fn cmd_locations(target: &Target, json: bool) -> Result<()> {
  let project = target.project()?;
  let client = admin_client()?;
  let rt = runtime()?;

  let mut locations = rt
    .block_on(client.list_locations(&project))
    .with_context(|| format!("Failed to list locations of {project}"))?;
  locations.sort_by(compare_location);

  if json {
    return print_json(&locations);
  }

  print_info(&format!("{}: {}", project, count(locations.len(), "location", "locations")));
  for location in &locations {
    match &location.display_name {
      Some(display_name) => println!("  {:<24} {}", location.location_id, display_name),
      None => println!("  {}", location.location_id),
    }
  }
  Ok(())
}
