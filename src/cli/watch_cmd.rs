//! Watch command: batch-evaluate a watchlist and write the ROI report

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use super::output::Output;
use crate::craft::{BatchEvaluator, CostAggregator};
use crate::domain::MarketPriceService;
use crate::market::TradingPost;
use crate::storage::{read_watchlist, write_report, CatalogDb, Config};

pub fn run(
    output: &Output,
    config: &Config,
    input: &Path,
    out: &Path,
    threshold: Option<i64>,
) -> Result<()> {
    let names = read_watchlist(input)?;
    if names.is_empty() {
        output.warn("watchlist is empty; nothing to evaluate");
        return Ok(());
    }
    output.verbose_ctx("watch", &format!("{} items in watchlist", names.len()));

    let db_path: PathBuf = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("no database configured; pass --db or set `database` in config"))?;

    // The vendor snapshot is shared; every batch task opens its own
    // catalog connection.
    let vendor = {
        let catalog = CatalogDb::open(&db_path)?;
        Arc::new(catalog.vendor_book()?)
    };
    output.verbose_ctx("watch", &format!("Loaded {} vendor prices", vendor.len()));

    let market: Arc<dyn MarketPriceService + Send + Sync> = Arc::new(TradingPost::with_base_url(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?);

    let aggregator = Arc::new(
        CostAggregator::new(vendor, Arc::clone(&market)).with_max_workers(config.max_workers),
    );

    let roi_threshold = threshold.unwrap_or(config.roi_threshold);
    let opener_path = db_path.clone();
    let evaluator = BatchEvaluator::new(
        move || CatalogDb::open(&opener_path),
        aggregator,
        market,
    )
    .with_batch_workers(config.batch_workers)
    .with_threshold(roi_threshold);

    let report = evaluator.evaluate(&names)?;
    write_report(out, &report)?;

    for failure in &report.failures {
        output.warn(&format!("{}: {}", failure.name, failure.reason));
    }

    if output.is_json() {
        output.data(&report);
    } else {
        output.success(&format!(
            "{} of {} items above {}% ROI ({} failed); report written to {}",
            report.rows.len(),
            report.evaluated,
            roi_threshold,
            report.failures.len(),
            out.display()
        ));
    }

    Ok(())
}
