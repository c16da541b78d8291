// Common constants used throughout the codebase

/// Project name
pub const PROJECT_NAME: &str = "unipkg";

/// Project organization (reverse domain notation)
pub const PROJECT_QUALIFIER: &str = "com";
pub const PROJECT_ORG: &str = "unipkg";

/// Settings file name (inside the config directory)
pub const SETTINGS_FILE_NAME: &str = "settings.kdl";

/// Operation log file name (inside the data directory)
pub const OPERATION_LOG_FILE_NAME: &str = "operations.log";

/// Sentinel shown for details a backend did not report
pub const NOT_AVAILABLE: &str = "Not available";

/// Listing commands are killed after this many seconds
pub const LISTING_TIMEOUT_SECS: u64 = 120;

/// Retries an operation may take after its first attempt (elevate, then adjust flags)
pub const MAX_OPERATION_RETRIES: usize = 2;

/// How often a queued operation re-checks its turn and cancel flag
pub const QUEUE_POLL_MILLIS: u64 = 200;

/// How often a running child process is polled for exit or cancellation
pub const PROCESS_POLL_MILLIS: u64 = 50;

/// Environment variable holding the log filter
pub const LOG_ENV_VAR: &str = "UNIPKG_LOG";
