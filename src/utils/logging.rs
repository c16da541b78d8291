use crate::constants::LOG_ENV_VAR;
use crate::error::{Result, UnipkgError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber.
///
/// The filter comes from `UNIPKG_LOG`, defaulting to `warn` (or `debug` with
/// `--verbose`). Logs go to stderr so json/yaml output on stdout stays parseable.
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| UnipkgError::ConfigError(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| UnipkgError::Other(format!("Logging already initialised: {}", e)))?;

    Ok(())
}
