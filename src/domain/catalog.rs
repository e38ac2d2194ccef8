//! Recipe catalog interface
//!
//! The catalog is the source of truth for what can be crafted from what.
//! The core only talks to it through [`RecipeCatalog`]; the SQLite-backed
//! implementation lives in the storage layer, and [`MemoryCatalog`] serves
//! embedding and test scenarios.

use std::collections::HashMap;

use thiserror::Error;

use super::ingredient::{Ingredient, ItemId, RecipeEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("failed to open catalog database: {0}")]
    Open(String),

    #[error("catalog query failed: {0}")]
    Query(String),
}

/// Read access to items, recipes, and recipe output quantities.
pub trait RecipeCatalog {
    /// Translates a display name (case-insensitive) to an item id.
    fn name_to_id(&self, name: &str) -> Result<Option<ItemId>, CatalogError>;

    /// Looks up the display name for an item id, if the catalog knows one.
    fn item_name(&self, item_id: ItemId) -> Result<Option<String>, CatalogError>;

    /// Returns the direct (one level, unscaled) ingredients of an item, or
    /// `None` when the item has no recipe and is therefore base.
    fn ingredients(&self, item_id: ItemId) -> Result<Option<Vec<Ingredient>>, CatalogError>;

    /// Returns how many units one craft of `item_id` produces. Only
    /// meaningful for items whose `ingredients` are non-empty.
    fn output_count(&self, item_id: ItemId) -> Result<i64, CatalogError>;
}

/// In-memory catalog backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    ids_by_name: HashMap<String, ItemId>,
    names_by_id: HashMap<ItemId, String>,
    recipes: HashMap<ItemId, RecipeEntry>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an item name for id translation.
    pub fn add_item(&mut self, item_id: ItemId, name: &str) {
        self.ids_by_name.insert(name.to_lowercase(), item_id);
        self.names_by_id.insert(item_id, name.to_string());
    }

    /// Registers the recipe producing `entry.output_item_id`.
    pub fn add_recipe(&mut self, entry: RecipeEntry) {
        self.recipes.insert(entry.output_item_id, entry);
    }
}

impl RecipeCatalog for MemoryCatalog {
    fn name_to_id(&self, name: &str) -> Result<Option<ItemId>, CatalogError> {
        Ok(self.ids_by_name.get(&name.to_lowercase()).copied())
    }

    fn item_name(&self, item_id: ItemId) -> Result<Option<String>, CatalogError> {
        Ok(self.names_by_id.get(&item_id).cloned())
    }

    fn ingredients(&self, item_id: ItemId) -> Result<Option<Vec<Ingredient>>, CatalogError> {
        Ok(self.recipes.get(&item_id).map(|entry| {
            entry
                .ingredients
                .iter()
                .map(|&(id, count)| match self.names_by_id.get(&id) {
                    Some(name) => Ingredient::named(id, name, count),
                    None => Ingredient::new(id, count),
                })
                .collect()
        }))
    }

    fn output_count(&self, item_id: ItemId) -> Result<i64, CatalogError> {
        Ok(self
            .recipes
            .get(&item_id)
            .map(|entry| entry.output_count)
            .unwrap_or(1))
    }
}
