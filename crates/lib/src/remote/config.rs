use std::env;
use std::time::Duration;

use crate::consts::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_ORIGIN, ENV_ACCESS_TOKEN, ENV_HTTP_TIMEOUT, ENV_ORIGIN};

use super::RemoteError;

/// Connection settings for [`FirestoreAdminClient`](super::FirestoreAdminClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Scheme and host of the Admin API, without a trailing slash.
  pub origin: String,
  /// Bearer token sent with every request, if any.
  pub access_token: Option<String>,
  pub timeout: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      origin: DEFAULT_ORIGIN.to_string(),
      access_token: None,
      timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
    }
  }
}

impl ClientConfig {
  /// Read settings from the environment, falling back to the defaults.
  ///
  /// Empty variables count as unset.
  pub fn from_env() -> Result<Self, RemoteError> {
    let mut config = Self::default();

    if let Some(origin) = non_empty_var(ENV_ORIGIN) {
      config.origin = origin.trim_end_matches('/').to_string();
    }

    config.access_token = non_empty_var(ENV_ACCESS_TOKEN);

    if let Some(timeout) = non_empty_var(ENV_HTTP_TIMEOUT) {
      let secs: u64 = timeout
        .trim()
        .parse()
        .map_err(|_| RemoteError::Config(format!("{ENV_HTTP_TIMEOUT} must be a number of seconds, got '{timeout}'")))?;
      config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}
