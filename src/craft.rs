//! Cost aggregation
//!
//! Orchestrates the resolver, the pricing policy, and the worker pool:
//! one pricing task per base ingredient, joined behind the pool's
//! completion barrier. [`BatchEvaluator`] runs the same computation for a
//! whole watchlist on an outer pool and filters rows by ROI.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    resolve, CatalogError, Ingredient, ItemIdent, MarketPriceService, PriceResolver,
    RecipeCatalog, ResolveError, VendorPriceTable,
};
use crate::pool::{TaskError, WorkerPool};

/// Revenue share kept after the trading post takes its cut.
const SELL_REVENUE_SHARE: f64 = 0.85;

const DEFAULT_MAX_WORKERS: usize = 8;
const DEFAULT_BATCH_WORKERS: usize = 15;
const DEFAULT_ROI_THRESHOLD: i64 = 40;

#[derive(Debug, Error)]
pub enum CraftError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] std::io::Error),

    #[error("pricing failed for {failed} of {total} ingredients")]
    Pricing { failed: usize, total: usize },
}

/// A fully priced ingredient list plus any per-task pricing failures.
#[derive(Debug, Default)]
pub struct CostBreakdown {
    /// Successfully priced base ingredients. Order is unspecified.
    pub ingredients: Vec<Ingredient>,
    /// Failed pricing tasks as `(item_id tag, error)` pairs.
    pub failures: Vec<(String, TaskError)>,
}

impl CostBreakdown {
    /// Sum of `total_cost` over all priced ingredients.
    pub fn total(&self) -> i64 {
        self.ingredients
            .iter()
            .filter_map(|i| i.total_cost)
            .sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Prices whole crafts: resolve to base ingredients, fan pricing out over a
/// bounded pool, join, aggregate.
pub struct CostAggregator {
    vendor: Arc<dyn VendorPriceTable + Send + Sync>,
    market: Arc<dyn MarketPriceService + Send + Sync>,
    max_workers: usize,
    deadline: Option<Duration>,
}

impl CostAggregator {
    pub fn new(
        vendor: Arc<dyn VendorPriceTable + Send + Sync>,
        market: Arc<dyn MarketPriceService + Send + Sync>,
    ) -> Self {
        Self {
            vendor,
            market,
            max_workers: DEFAULT_MAX_WORKERS,
            deadline: None,
        }
    }

    /// Caps the pricing pool; the pool never grows past the ingredient
    /// count either.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Abandons outstanding pricing tasks after this long.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Total crafting cost in copper. Fails if any ingredient could not be
    /// priced — a partial sum is never reported as a total.
    pub fn crafting_cost<C>(&self, catalog: &C, ident: &ItemIdent) -> Result<i64, CraftError>
    where
        C: RecipeCatalog + ?Sized,
    {
        let breakdown = self.crafting_cost_detailed(catalog, ident)?;
        if !breakdown.is_complete() {
            return Err(CraftError::Pricing {
                failed: breakdown.failures.len(),
                total: breakdown.ingredients.len() + breakdown.failures.len(),
            });
        }
        Ok(breakdown.total())
    }

    /// Full priced breakdown; pricing failures are surfaced per ingredient
    /// instead of aborting the whole call.
    pub fn crafting_cost_detailed<C>(
        &self,
        catalog: &C,
        ident: &ItemIdent,
    ) -> Result<CostBreakdown, CraftError>
    where
        C: RecipeCatalog + ?Sized,
    {
        let ingredients = resolve(catalog, ident)?;

        let mut pool: WorkerPool<Ingredient> =
            WorkerPool::new(self.max_workers.min(ingredients.len()));
        for ingredient in &ingredients {
            let vendor = Arc::clone(&self.vendor);
            let market = Arc::clone(&self.market);
            let ingredient = ingredient.clone();
            pool.submit(ingredient.item_id.to_string(), move || {
                PriceResolver::new(vendor.as_ref(), market.as_ref())
                    .price(&ingredient)
                    .map_err(|e| TaskError::Failed(e.to_string()))
            });
        }

        pool.start()?;
        let done = pool.wait(self.deadline);
        let outcomes = pool.shutdown();

        let mut breakdown = CostBreakdown::default();
        for outcome in outcomes {
            match outcome.result {
                Ok(priced) => breakdown.ingredients.push(priced),
                Err(error) => breakdown.failures.push((outcome.tag, error)),
            }
        }

        if !done {
            // Mark the tasks that never reported back.
            let reported: HashSet<String> = breakdown
                .ingredients
                .iter()
                .map(|i| i.item_id.to_string())
                .chain(breakdown.failures.iter().map(|(tag, _)| tag.clone()))
                .collect();
            for ingredient in &ingredients {
                let tag = ingredient.item_id.to_string();
                if !reported.contains(&tag) {
                    breakdown.failures.push((tag, TaskError::Abandoned));
                }
            }
        }

        Ok(breakdown)
    }
}

/// Truncated ROI percentage: `(sell * 0.85 - craft) / craft * 100`.
///
/// A zero crafting cost short-circuits to 0 instead of dividing by zero.
pub fn roi(craft: i64, sell: i64) -> i64 {
    if craft == 0 {
        return 0;
    }
    ((sell as f64 * SELL_REVENUE_SHARE - craft as f64) / craft as f64 * 100.0) as i64
}

/// One watchlist row that cleared the ROI threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchRow {
    pub name: String,
    pub craft_cost: i64,
    pub sell_price: i64,
    pub roi: i64,
}

/// An item whose evaluation failed; reported distinctly from items that
/// legitimately cost zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Rows above the ROI threshold, in watchlist order.
    pub rows: Vec<BatchRow>,
    pub failures: Vec<BatchFailure>,
    /// Number of items evaluated, including filtered and failed ones.
    pub evaluated: usize,
}

type CatalogOpener =
    Arc<dyn Fn() -> Result<Box<dyn RecipeCatalog>, CatalogError> + Send + Sync>;

/// Evaluates a watchlist of item names on an outer worker pool. Each task
/// opens its own catalog connection scoped to that task, so the inner
/// pricing pools never share state beyond the injected price sources.
pub struct BatchEvaluator {
    opener: CatalogOpener,
    aggregator: Arc<CostAggregator>,
    market: Arc<dyn MarketPriceService + Send + Sync>,
    batch_workers: usize,
    roi_threshold: i64,
}

impl BatchEvaluator {
    pub fn new<C, F>(
        opener: F,
        aggregator: Arc<CostAggregator>,
        market: Arc<dyn MarketPriceService + Send + Sync>,
    ) -> Self
    where
        C: RecipeCatalog + 'static,
        F: Fn() -> Result<C, CatalogError> + Send + Sync + 'static,
    {
        Self {
            opener: Arc::new(move || {
                opener().map(|catalog| Box::new(catalog) as Box<dyn RecipeCatalog>)
            }),
            aggregator,
            market,
            batch_workers: DEFAULT_BATCH_WORKERS,
            roi_threshold: DEFAULT_ROI_THRESHOLD,
        }
    }

    pub fn with_batch_workers(mut self, batch_workers: usize) -> Self {
        self.batch_workers = batch_workers.max(1);
        self
    }

    /// Minimum ROI percentage (exclusive) for a row to be emitted.
    pub fn with_threshold(mut self, roi_threshold: i64) -> Self {
        self.roi_threshold = roi_threshold;
        self
    }

    /// Evaluates every name; per-item failures are collected, never fatal
    /// to the batch.
    pub fn evaluate(&self, names: &[String]) -> Result<BatchReport, CraftError> {
        let mut pool: WorkerPool<Option<BatchRow>> = WorkerPool::new(self.batch_workers);

        for (index, name) in names.iter().enumerate() {
            let opener = Arc::clone(&self.opener);
            let aggregator = Arc::clone(&self.aggregator);
            let market = Arc::clone(&self.market);
            let name = name.clone();
            let threshold = self.roi_threshold;

            pool.submit(index.to_string(), move || {
                let catalog = opener().map_err(|e| TaskError::Failed(e.to_string()))?;
                let item_id = catalog
                    .name_to_id(&name)
                    .map_err(|e| TaskError::Failed(e.to_string()))?
                    .ok_or_else(|| TaskError::Failed(format!("item not found: {}", name)))?;

                let craft = aggregator
                    .crafting_cost(&*catalog, &ItemIdent::Id(item_id))
                    .map_err(|e| TaskError::Failed(e.to_string()))?;
                let sell = market
                    .sell_price(item_id)
                    .map_err(|e| TaskError::Failed(e.to_string()))?;
                let roi = roi(craft, sell);

                Ok((roi > threshold).then_some(BatchRow {
                    name,
                    craft_cost: craft,
                    sell_price: sell,
                    roi,
                }))
            });
        }

        pool.start()?;
        pool.wait(None);
        let outcomes = pool.shutdown();

        let mut rows: Vec<(usize, BatchRow)> = Vec::new();
        let mut failures: Vec<(usize, BatchFailure)> = Vec::new();
        for outcome in outcomes {
            let index: usize = outcome.tag.parse().unwrap_or(usize::MAX);
            let name = names
                .get(index)
                .cloned()
                .unwrap_or_else(|| outcome.tag.clone());
            match outcome.result {
                Ok(Some(row)) => rows.push((index, row)),
                Ok(None) => {}
                Err(error) => failures.push((
                    index,
                    BatchFailure {
                        name,
                        reason: error.to_string(),
                    },
                )),
            }
        }

        rows.sort_by_key(|(index, _)| *index);
        failures.sort_by_key(|(index, _)| *index);

        Ok(BatchReport {
            rows: rows.into_iter().map(|(_, row)| row).collect(),
            failures: failures.into_iter().map(|(_, failure)| failure).collect(),
            evaluated: names.len(),
        })
    }
}
