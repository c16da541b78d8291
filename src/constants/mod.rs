pub mod common;
pub mod settings_keys;

pub use common::{
    LISTING_TIMEOUT_SECS, LOG_ENV_VAR, MAX_OPERATION_RETRIES, NOT_AVAILABLE, OPERATION_LOG_FILE_NAME,
    PROCESS_POLL_MILLIS, PROJECT_NAME, PROJECT_ORG, PROJECT_QUALIFIER, QUEUE_POLL_MILLIS,
    SETTINGS_FILE_NAME,
};
