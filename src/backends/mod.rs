//! # Backend plumbing shared by every package manager
//!
//! - [`parsers`]: strategies turning console text into rows (delimited,
//!   column-position, key/value details, blacklists)
//! - [`command_exec`]: running listing commands with a timeout and mutating
//!   commands with live line streaming and cancellation
//! - [`lines`]: `\r`/`\n` aware splitting of raw process output
//! - [`cache`]: newline-delimited catalog caches with atomic, locked rewrites
//!
//! The per-manager types that use these live in `crate::packages`.

pub mod cache;
pub mod command_exec;
pub mod lines;
pub mod parsers;

pub use cache::{CacheEntry, CacheFile};
pub use command_exec::{ProcessRun, resolve_executable, run_listing, run_streaming};
pub use lines::{ConsoleLine, LineSplitter};
