//! SQLite recipe catalog
//!
//! Items, recipes, recipe ingredients, and vendor prices live in one SQLite
//! database. The schema mirrors the relational layout the cost model
//! expects: a recipe row per craftable item, ingredient rows per recipe,
//! and a flat vendor price table that gets snapshotted before pricing.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{CatalogError, Ingredient, ItemId, RecipeCatalog, RecipeEntry, VendorBook};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS items (
    item_id INTEGER PRIMARY KEY,
    name    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_items_name ON items (lower(name));

CREATE TABLE IF NOT EXISTS recipes (
    recipe_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id      INTEGER NOT NULL UNIQUE,
    output_count INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS ingredients (
    recipe_id  INTEGER NOT NULL REFERENCES recipes (recipe_id),
    item_id    INTEGER NOT NULL,
    item_count INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_ingredients_recipe ON ingredients (recipe_id);

CREATE TABLE IF NOT EXISTS vendor_items (
    item_id INTEGER PRIMARY KEY,
    price   INTEGER NOT NULL,
    count   INTEGER NOT NULL DEFAULT 1
);
";

/// SQLite-backed [`RecipeCatalog`]. Connections are cheap; batch tasks open
/// one each rather than sharing a connection across threads.
#[derive(Debug)]
pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    /// Opens the catalog database at `path`. The file must already exist;
    /// a typo'd path fails cleanly instead of leaving a stray empty
    /// database behind.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        if !path.is_file() {
            return Err(CatalogError::Open(format!(
                "{}: no such database (run `init` to create one)",
                path.display()
            )));
        }
        Self::create(path)
    }

    /// Opens the database at `path`, creating the file if missing.
    pub fn create(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)
            .map_err(|e| CatalogError::Open(format!("{}: {}", path.display(), e)))?;

        // WAL mode for concurrent readers during batch evaluation.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(query_error)?;

        Ok(Self { conn })
    }

    /// In-memory catalog, for tests and scratch runs.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory().map_err(|e| CatalogError::Open(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Creates all tables. Idempotent.
    pub fn init_schema(&self) -> Result<(), CatalogError> {
        self.conn.execute_batch(SCHEMA).map_err(query_error)
    }

    pub fn insert_item(&self, item_id: ItemId, name: &str) -> Result<(), CatalogError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO items (item_id, name) VALUES (?1, ?2)",
                params![item_id, name],
            )
            .map(|_| ())
            .map_err(query_error)
    }

    /// Inserts one crafting level, replacing any previous recipe for the
    /// same output item.
    pub fn insert_recipe(&self, entry: &RecipeEntry) -> Result<(), CatalogError> {
        self.conn
            .execute(
                "DELETE FROM ingredients WHERE recipe_id IN
                 (SELECT recipe_id FROM recipes WHERE item_id = ?1)",
                params![entry.output_item_id],
            )
            .map_err(query_error)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO recipes (item_id, output_count) VALUES (?1, ?2)",
                params![entry.output_item_id, entry.output_count],
            )
            .map_err(query_error)?;

        let recipe_id: i64 = self
            .conn
            .query_row(
                "SELECT recipe_id FROM recipes WHERE item_id = ?1",
                params![entry.output_item_id],
                |row| row.get(0),
            )
            .map_err(query_error)?;

        for &(item_id, count) in &entry.ingredients {
            self.conn
                .execute(
                    "INSERT INTO ingredients (recipe_id, item_id, item_count) VALUES (?1, ?2, ?3)",
                    params![recipe_id, item_id, count],
                )
                .map_err(query_error)?;
        }

        Ok(())
    }

    pub fn insert_vendor_price(
        &self,
        item_id: ItemId,
        price: i64,
        count: i64,
    ) -> Result<(), CatalogError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO vendor_items (item_id, price, count) VALUES (?1, ?2, ?3)",
                params![item_id, price, count],
            )
            .map(|_| ())
            .map_err(query_error)
    }

    /// Loads the whole vendor table into an in-memory snapshot shared by
    /// all pricing tasks.
    pub fn vendor_book(&self) -> Result<VendorBook, CatalogError> {
        let mut stmt = self
            .conn
            .prepare("SELECT item_id, price FROM vendor_items")
            .map_err(query_error)?;

        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, ItemId>(0)?, row.get::<_, i64>(1)?)))
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;

        Ok(pairs.into_iter().collect())
    }
}

impl RecipeCatalog for CatalogDb {
    fn name_to_id(&self, name: &str) -> Result<Option<ItemId>, CatalogError> {
        self.conn
            .query_row(
                "SELECT item_id FROM items WHERE lower(name) = lower(?1)",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)
    }

    fn item_name(&self, item_id: ItemId) -> Result<Option<String>, CatalogError> {
        self.conn
            .query_row(
                "SELECT name FROM items WHERE item_id = ?1",
                params![item_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)
    }

    fn ingredients(&self, item_id: ItemId) -> Result<Option<Vec<Ingredient>>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ingredients.item_id, items.name, ingredients.item_count
                 FROM recipes
                 JOIN ingredients ON recipes.recipe_id = ingredients.recipe_id
                 LEFT JOIN items ON items.item_id = ingredients.item_id
                 WHERE recipes.item_id = ?1
                 ORDER BY ingredients.rowid",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![item_id], |row| {
                Ok(Ingredient {
                    item_id: row.get(0)?,
                    item_name: row.get(1)?,
                    count: row.get(2)?,
                    unit_cost: None,
                    total_cost: None,
                })
            })
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;

        Ok(if rows.is_empty() { None } else { Some(rows) })
    }

    fn output_count(&self, item_id: ItemId) -> Result<i64, CatalogError> {
        Ok(self
            .conn
            .query_row(
                "SELECT output_count FROM recipes WHERE item_id = ?1",
                params![item_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)?
            .unwrap_or(1))
    }
}

fn query_error(error: rusqlite::Error) -> CatalogError {
    CatalogError::Query(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> CatalogDb {
        let db = CatalogDb::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.insert_item(1, "Rough Sharpening Stone").unwrap();
        db.insert_item(2, "Copper Ore").unwrap();
        db.insert_recipe(&RecipeEntry {
            output_item_id: 1,
            output_count: 1,
            ingredients: vec![(2, 3), (99, 1)],
        })
        .unwrap();
        db.insert_vendor_price(2, 8, 1).unwrap();
        db
    }

    #[test]
    fn open_refuses_a_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.db");

        let err = CatalogDb::open(&path).unwrap_err();

        assert!(
            matches!(err, CatalogError::Open(ref message) if message.contains("no such database"))
        );
        assert!(!path.exists());
    }

    #[test]
    fn create_then_open_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");

        CatalogDb::create(&path).unwrap().init_schema().unwrap();

        let db = CatalogDb::open(&path).unwrap();
        assert_eq!(db.name_to_id("anything").unwrap(), None);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let db = CatalogDb::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.init_schema().unwrap();
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let db = seeded();

        assert_eq!(db.name_to_id("rough sharpening stone").unwrap(), Some(1));
        assert_eq!(db.name_to_id("ROUGH SHARPENING STONE").unwrap(), Some(1));
        assert_eq!(db.name_to_id("missing").unwrap(), None);
    }

    #[test]
    fn item_name_reads_the_items_table() {
        let db = seeded();

        assert_eq!(db.item_name(2).unwrap(), Some("Copper Ore".to_string()));
        assert_eq!(db.item_name(77).unwrap(), None);
    }

    #[test]
    fn ingredients_join_carries_names_when_known() {
        let db = seeded();

        let ingredients = db.ingredients(1).unwrap().unwrap();

        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0], Ingredient::named(2, "Copper Ore", 3));
        // No items row for id 99; the name stays empty.
        assert_eq!(ingredients[1], Ingredient::new(99, 1));
    }

    #[test]
    fn base_items_have_no_ingredient_rows() {
        let db = seeded();
        assert_eq!(db.ingredients(2).unwrap(), None);
    }

    #[test]
    fn output_count_defaults_to_one_without_a_recipe() {
        let db = seeded();
        assert_eq!(db.output_count(1).unwrap(), 1);
        assert_eq!(db.output_count(2).unwrap(), 1);
    }

    #[test]
    fn output_count_reads_the_recipe_yield() {
        let db = seeded();
        db.insert_recipe(&RecipeEntry {
            output_item_id: 5,
            output_count: 4,
            ingredients: vec![(2, 1)],
        })
        .unwrap();

        assert_eq!(db.output_count(5).unwrap(), 4);
    }

    #[test]
    fn reinserting_a_recipe_replaces_its_ingredients() {
        let db = seeded();
        db.insert_recipe(&RecipeEntry {
            output_item_id: 1,
            output_count: 2,
            ingredients: vec![(7, 5)],
        })
        .unwrap();

        let ingredients = db.ingredients(1).unwrap().unwrap();
        assert_eq!(ingredients, vec![Ingredient::new(7, 5)]);
        assert_eq!(db.output_count(1).unwrap(), 2);
    }

    #[test]
    fn vendor_book_snapshots_the_whole_table() {
        let db = seeded();
        db.insert_vendor_price(9, 16, 1).unwrap();

        let book = db.vendor_book().unwrap();

        assert_eq!(book.len(), 2);
        use crate::domain::VendorPriceTable;
        assert_eq!(book.price(2), Some(8));
        assert_eq!(book.price(9), Some(16));
        assert_eq!(book.price(1), None);
    }
}
