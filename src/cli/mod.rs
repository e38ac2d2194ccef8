//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create the catalog database schema |
//! | `import` | Bulk-load API dump files into the catalog |
//! | `cost` | Price one item, total or full breakdown |
//! | `watch` | Batch-evaluate a watchlist into an ROI report |
//!
//! All commands support `--format text|json` and `--verbose`. Call
//! [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod cost_cmd;
mod import_cmd;
mod output;
mod watch_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
