//! Import command: bulk-load API dump files into the catalog

use std::path::Path;

use anyhow::{anyhow, Result};

use super::output::Output;
use crate::storage::{
    import_items, import_recipes, import_vendor_prices, CatalogDb, Config, ImportSummary,
};

pub fn run(
    output: &Output,
    config: &Config,
    items: Option<&Path>,
    recipes: Option<&Path>,
    vendors: Option<&Path>,
) -> Result<()> {
    if items.is_none() && recipes.is_none() && vendors.is_none() {
        return Err(anyhow!(
            "nothing to import; pass --items, --recipes, or --vendors"
        ));
    }

    let db_path = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("no database configured; pass --db or set `database` in config"))?;
    let db = CatalogDb::open(&db_path)?;

    if let Some(path) = items {
        let summary = import_items(&db, path)?;
        announce(output, "items", path, &summary);
    }
    if let Some(path) = recipes {
        let summary = import_recipes(&db, path)?;
        announce(output, "recipes", path, &summary);
    }
    if let Some(path) = vendors {
        let summary = import_vendor_prices(&db, path)?;
        announce(output, "vendor prices", path, &summary);
    }

    Ok(())
}

fn announce(output: &Output, table: &str, path: &Path, summary: &ImportSummary) {
    output.success(&format!(
        "Imported {} {} from {} ({} skipped)",
        summary.inserted,
        table,
        path.display(),
        summary.skipped
    ));
}
