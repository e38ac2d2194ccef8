//! craftcost - crafting cost and ROI calculator for the trading post
//!
//! Computes what a composite item costs to craft by flattening its recipe
//! into base ingredients, pricing each one concurrently (vendor price,
//! then market buy orders, then sell offers), and aggregating. A batch
//! mode evaluates a whole watchlist and reports items whose crafting ROI
//! clears a threshold.

pub mod cli;
pub mod craft;
pub mod domain;
pub mod market;
pub mod pool;
pub mod storage;

pub use craft::{BatchEvaluator, BatchReport, BatchRow, CostAggregator, CostBreakdown, CraftError};
pub use domain::{Ingredient, ItemId, ItemIdent, RecipeCatalog, ResolveError};
