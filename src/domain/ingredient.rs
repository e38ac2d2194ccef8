//! Ingredient and recipe records
//!
//! An [`Ingredient`] is one line of a crafting bill: an item, how many of it
//! the root craft needs, and (once priced) what it costs. A [`RecipeEntry`]
//! is one unscaled crafting level as the catalog stores it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Numeric item identifier as used by the catalog and the trading post.
pub type ItemId = i64;

/// One ingredient of a craft, with quantity relative to the root item.
///
/// `unit_cost` and `total_cost` stay `None` until the ingredient has been
/// priced; after pricing, `total_cost = unit_cost * count`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub item_id: ItemId,
    pub item_name: Option<String>,
    pub count: i64,
    pub unit_cost: Option<i64>,
    pub total_cost: Option<i64>,
}

impl Ingredient {
    /// Creates an unpriced, unnamed ingredient.
    pub fn new(item_id: ItemId, count: i64) -> Self {
        Self {
            item_id,
            item_name: None,
            count,
            unit_cost: None,
            total_cost: None,
        }
    }

    /// Creates an unpriced ingredient with a display name.
    pub fn named(item_id: ItemId, name: impl Into<String>, count: i64) -> Self {
        Self {
            item_name: Some(name.into()),
            ..Self::new(item_id, count)
        }
    }

    /// Returns a copy with `unit_cost` and `total_cost` filled in.
    pub fn priced(&self, unit_cost: i64) -> Self {
        Self {
            unit_cost: Some(unit_cost),
            total_cost: Some(unit_cost * self.count),
            ..self.clone()
        }
    }
}

/// One crafting level as stored in the catalog, unscaled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeEntry {
    pub output_item_id: ItemId,
    pub output_count: i64,
    /// Required inputs as `(item_id, count)` pairs, in catalog order.
    pub ingredients: Vec<(ItemId, i64)>,
}

/// An item reference as given by the user: either a display name that the
/// catalog must translate, or a numeric id used as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemIdent {
    Name(String),
    Id(ItemId),
}

impl ItemIdent {
    /// Parses user input: all-digit strings become ids, anything else a name.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<ItemId>() {
            Ok(id) => ItemIdent::Id(id),
            Err(_) => ItemIdent::Name(input.trim().to_string()),
        }
    }
}

impl From<ItemId> for ItemIdent {
    fn from(id: ItemId) -> Self {
        ItemIdent::Id(id)
    }
}

impl From<&str> for ItemIdent {
    fn from(name: &str) -> Self {
        ItemIdent::Name(name.to_string())
    }
}

impl fmt::Display for ItemIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemIdent::Name(name) => write!(f, "{}", name),
            ItemIdent::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// Merges duplicate ingredients by `item_id`, summing their counts.
///
/// The first-seen entry keeps its name and position; later duplicates only
/// contribute their count. Cost fields are expected to be unset at this
/// stage and are taken from the first-seen entry.
pub fn merge_duplicates(ingredients: Vec<Ingredient>) -> Vec<Ingredient> {
    let mut order: Vec<ItemId> = Vec::new();
    let mut merged: HashMap<ItemId, Ingredient> = HashMap::new();

    for ingredient in ingredients {
        match merged.entry(ingredient.item_id) {
            Entry::Occupied(mut entry) => entry.get_mut().count += ingredient.count,
            Entry::Vacant(entry) => {
                order.push(ingredient.item_id);
                entry.insert(ingredient);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|item_id| merged.remove(&item_id))
        .collect()
}
