/// Application name, the binary's name and log target.
pub const APP_NAME: &str = "indexsync";

/// Default project configuration file name.
pub const CONFIG_FILENAME: &str = "indexsync.json";

/// Field path of the implicit document-key field.
pub const NAME_FIELD: &str = "__name__";

/// Field id of the catch-all configuration that every database carries.
pub const DEFAULT_FIELD: &str = "__default__";

/// Database id used when none is configured.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Production origin of the Firestore Admin API.
pub const DEFAULT_ORIGIN: &str = "https://firestore.googleapis.com";

/// Default per-request HTTP timeout, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

pub const ENV_PROJECT: &str = "INDEXSYNC_PROJECT";
pub const ENV_ORIGIN: &str = "INDEXSYNC_FIRESTORE_ORIGIN";
pub const ENV_ACCESS_TOKEN: &str = "INDEXSYNC_ACCESS_TOKEN";
pub const ENV_HTTP_TIMEOUT: &str = "INDEXSYNC_HTTP_TIMEOUT_SECS";
