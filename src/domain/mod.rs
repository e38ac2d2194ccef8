//! Domain models for craftcost
//!
//! Contains the core business logic without any I/O concerns: recipe
//! flattening, the pricing policy, and coin formatting. External systems
//! (catalog database, trading post) are reached only through the traits
//! defined here.

mod catalog;
mod currency;
mod graph;
mod ingredient;
mod pricing;
mod resolver;

pub use catalog::{CatalogError, MemoryCatalog, RecipeCatalog};
pub use currency::format_coins;
pub use graph::{Recipe, RecipeGraph};
pub use ingredient::{merge_duplicates, Ingredient, ItemId, ItemIdent, RecipeEntry};
pub use pricing::{MarketPriceService, PriceError, PriceResolver, VendorBook, VendorPriceTable};
pub use resolver::{resolve, ResolveError};
