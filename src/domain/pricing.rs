//! Pricing policy
//!
//! A unit cost comes from the first source in a fixed priority order:
//! vendor fixed price, then the top market buy order, then the top market
//! sell offer. An item none of them can price costs 0 — best-effort by
//! design, not an error.

use std::collections::HashMap;

use thiserror::Error;

use super::ingredient::{Ingredient, ItemId};

/// Errors from the live market service. A missing listing is not an error
/// (the service reports it as price 0); these cover transport and decoding
/// problems only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("market request failed: {0}")]
    Transport(String),

    #[error("malformed market response: {0}")]
    Decode(String),
}

/// Fixed vendor prices, loaded as a snapshot before pricing starts.
pub trait VendorPriceTable {
    /// Vendor price for an item, or `None` when no vendor sells it.
    fn price(&self, item_id: ItemId) -> Option<i64>;
}

/// Live trading post prices. A return of `0` means "no listing".
pub trait MarketPriceService {
    fn buy_price(&self, item_id: ItemId) -> Result<i64, PriceError>;
    fn sell_price(&self, item_id: ItemId) -> Result<i64, PriceError>;
}

/// In-memory vendor price snapshot keyed by item id.
#[derive(Clone, Debug, Default)]
pub struct VendorBook {
    prices: HashMap<ItemId, i64>,
}

impl VendorBook {
    pub fn new(prices: HashMap<ItemId, i64>) -> Self {
        Self { prices }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(ItemId, i64)> for VendorBook {
    fn from_iter<I: IntoIterator<Item = (ItemId, i64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl VendorPriceTable for VendorBook {
    fn price(&self, item_id: ItemId) -> Option<i64> {
        self.prices.get(&item_id).copied()
    }
}

/// Applies the source priority policy to price single ingredients.
pub struct PriceResolver<'a, V: ?Sized, M: ?Sized> {
    vendor: &'a V,
    market: &'a M,
}

impl<'a, V, M> PriceResolver<'a, V, M>
where
    V: VendorPriceTable + ?Sized,
    M: MarketPriceService + ?Sized,
{
    pub fn new(vendor: &'a V, market: &'a M) -> Self {
        Self { vendor, market }
    }

    /// Unit cost in copper: vendor, else top buy order, else top sell offer,
    /// else 0.
    pub fn unit_cost(&self, item_id: ItemId) -> Result<i64, PriceError> {
        if let Some(price) = self.vendor.price(item_id) {
            return Ok(price);
        }

        let buy = self.market.buy_price(item_id)?;
        if buy != 0 {
            return Ok(buy);
        }

        self.market.sell_price(item_id)
    }

    /// Returns a priced copy of the ingredient.
    pub fn price(&self, ingredient: &Ingredient) -> Result<Ingredient, PriceError> {
        Ok(ingredient.priced(self.unit_cost(ingredient.item_id)?))
    }
}
