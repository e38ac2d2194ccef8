//! Bulk catalog import
//!
//! Parses API dump files into the catalog tables. A dump is one JSON
//! object per line; items and recipes carry more fields than the catalog
//! needs, and the extras are ignored. A malformed line is skipped and
//! counted rather than aborting the import, since dumps in the wild are
//! rarely pristine.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::catalog::CatalogDb;
use crate::domain::{ItemId, RecipeEntry};

/// Sentinel id vendor dumps use for the coin "ingredient" carrying the price.
const COIN_ITEM_ID: ItemId = -1;

/// How many lines an import inserted and how many it had to skip.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Deserialize)]
struct ItemRow {
    id: ItemId,
    name: String,
}

#[derive(Deserialize)]
struct RecipeRow {
    output_item_id: ItemId,
    #[serde(default = "default_output_count")]
    output_item_count: i64,
    #[serde(default)]
    ingredients: Vec<IngredientRow>,
}

#[derive(Deserialize)]
struct IngredientRow {
    item_id: ItemId,
    count: i64,
}

/// Vendor dumps are recipe-shaped: the output item is the vendored item
/// and the coin ingredient's count is its price.
#[derive(Deserialize)]
struct VendorRow {
    output_item_id: ItemId,
    #[serde(default = "default_output_count")]
    output_item_count: i64,
    #[serde(default)]
    ingredients: Vec<IngredientRow>,
}

fn default_output_count() -> i64 {
    1
}

fn lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open dump: {}", path.display()))?;
    Ok(BufReader::new(file).lines())
}

/// Imports an item dump (`{"id": ..., "name": ..., ...}` per line).
pub fn import_items(db: &CatalogDb, path: &Path) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for line in lines(path)? {
        let line = line.with_context(|| format!("Failed to read dump: {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ItemRow>(&line) {
            Ok(row) => {
                db.insert_item(row.id, &row.name)?;
                summary.inserted += 1;
            }
            Err(_) => summary.skipped += 1,
        }
    }
    Ok(summary)
}

/// Imports a recipe dump; each line carries the output item, its yield,
/// and the ingredient list.
pub fn import_recipes(db: &CatalogDb, path: &Path) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for line in lines(path)? {
        let line = line.with_context(|| format!("Failed to read dump: {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RecipeRow>(&line) {
            Ok(row) => {
                db.insert_recipe(&RecipeEntry {
                    output_item_id: row.output_item_id,
                    output_count: row.output_item_count,
                    ingredients: row
                        .ingredients
                        .iter()
                        .map(|i| (i.item_id, i.count))
                        .collect(),
                })?;
                summary.inserted += 1;
            }
            Err(_) => summary.skipped += 1,
        }
    }
    Ok(summary)
}

/// Imports a vendor dump. Rows without a coin ingredient have no price
/// and are skipped.
pub fn import_vendor_prices(db: &CatalogDb, path: &Path) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for line in lines(path)? {
        let line = line.with_context(|| format!("Failed to read dump: {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let Ok(row) = serde_json::from_str::<VendorRow>(&line) else {
            summary.skipped += 1;
            continue;
        };
        match row.ingredients.iter().find(|i| i.item_id == COIN_ITEM_ID) {
            Some(coin) => {
                db.insert_vendor_price(row.output_item_id, coin.count, row.output_item_count)?;
                summary.inserted += 1;
            }
            None => summary.skipped += 1,
        }
    }
    Ok(summary)
}
