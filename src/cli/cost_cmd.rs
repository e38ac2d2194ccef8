//! Cost command: price one item

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use super::output::Output;
use crate::craft::CostAggregator;
use crate::domain::{format_coins, ItemIdent, MarketPriceService};
use crate::market::TradingPost;
use crate::storage::{CatalogDb, Config};

pub fn run(
    output: &Output,
    config: &Config,
    item: &str,
    detailed: bool,
    deadline: Option<u64>,
) -> Result<()> {
    let db_path = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("no database configured; pass --db or set `database` in config"))?;

    let catalog = CatalogDb::open(&db_path)?;
    let vendor = Arc::new(catalog.vendor_book()?);
    output.verbose_ctx("cost", &format!("Loaded {} vendor prices", vendor.len()));

    let market: Arc<dyn MarketPriceService + Send + Sync> = Arc::new(TradingPost::with_base_url(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?);

    let mut aggregator =
        CostAggregator::new(vendor, market).with_max_workers(config.max_workers);
    if let Some(secs) = deadline {
        aggregator = aggregator.with_deadline(Duration::from_secs(secs));
    }

    let ident = ItemIdent::parse(item);

    if detailed {
        let breakdown = aggregator.crafting_cost_detailed(&catalog, &ident)?;

        if output.is_json() {
            output.data(&serde_json::json!({
                "item": item,
                "ingredients": breakdown.ingredients,
                "failures": breakdown
                    .failures
                    .iter()
                    .map(|(tag, error)| serde_json::json!({
                        "item_id": tag,
                        "error": error.to_string(),
                    }))
                    .collect::<Vec<_>>(),
                "total": breakdown.total(),
            }));
        } else {
            println!(
                "{:<10} {:<30} {:>8} {:>15} {:>15}",
                "ID", "NAME", "COUNT", "UNIT", "TOTAL"
            );
            println!("{}", "-".repeat(82));
            for ingredient in &breakdown.ingredients {
                println!(
                    "{:<10} {:<30} {:>8} {:>15} {:>15}",
                    ingredient.item_id,
                    ingredient.item_name.as_deref().unwrap_or("?"),
                    ingredient.count,
                    format_coins(ingredient.unit_cost.unwrap_or(0)),
                    format_coins(ingredient.total_cost.unwrap_or(0)),
                );
            }
            for (tag, error) in &breakdown.failures {
                output.warn(&format!("pricing failed for item {}: {}", tag, error));
            }
            println!("{}", "-".repeat(82));
            println!("Total: {}", format_coins(breakdown.total()));
            if !breakdown.is_complete() {
                output.warn("total excludes the failed ingredients above");
            }
        }
    } else {
        let total = aggregator.crafting_cost(&catalog, &ident)?;

        if output.is_json() {
            output.data(&serde_json::json!({
                "item": item,
                "craft_cost": total,
                "formatted": format_coins(total),
            }));
        } else {
            output.success(&format!("{}: {}", item, format_coins(total)));
        }
    }

    Ok(())
}
