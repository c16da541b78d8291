//! Console output parsing strategies shared by all backends
//!
//! - [`delimited`]: stable separators (`|`, whitespace after a dashed rule)
//! - [`columns`]: fixed-width tables cut at header offsets, with a raw-offset fallback
//! - [`details`]: `Key: value` show/info output
//! - [`blacklist`]: per-backend tokens that mark pseudo-rows
//!
//! Parsers are best-effort: a malformed line is logged and skipped (or cut
//! at raw offsets), never aborting the listing.

pub mod blacklist;
pub mod columns;
pub mod delimited;
pub mod details;

pub use blacklist::Blacklist;
pub use columns::{ColumnLayout, TableSpec, parse_table};
pub use delimited::{clean_lines, rows_after_header, rows_after_rule, split_delimited, split_spaces};
pub use details::{Field, field, scan_fields};
