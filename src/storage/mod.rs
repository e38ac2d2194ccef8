//! # Storage Layer
//!
//! Everything that touches the filesystem: the SQLite recipe catalog,
//! watchlist input files, the fixed-width ROI report, and configuration.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Catalog | SQLite | configured via `database` / `--db` |
//! | Dump files | JSON lines | user-supplied, loaded via `import` |
//! | Watchlist | plain text, one name per line | user-supplied |
//! | Report | fixed-width text | user-supplied output path |
//! | Config | TOML | `~/.config/craftcost/config.toml` |

mod catalog;
mod config;
mod dump;
mod report;
mod watchlist;

pub use catalog::CatalogDb;
pub use config::Config;
pub use dump::{import_items, import_recipes, import_vendor_prices, ImportSummary};
pub use report::{render_report, write_report};
pub use watchlist::read_watchlist;
