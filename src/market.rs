//! Trading post API client
//!
//! Thin blocking client for the `commerce/listings` endpoint. Every request
//! carries a timeout so one slow call cannot stall a whole pricing batch.
//! Missing listings are quoted as price 0, matching the pricing policy's
//! "no listing" convention.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::domain::{ItemId, MarketPriceService, PriceError};

pub const DEFAULT_BASE_URL: &str = "https://api.guildwars2.com/v2/";

const USER_AGENT: &str = concat!("craftcost/", env!("CARGO_PKG_VERSION"));

/// One item's order book.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub id: ItemId,
    /// Buy orders, best first.
    #[serde(default)]
    pub buys: Vec<Order>,
    /// Sell offers, best first.
    #[serde(default)]
    pub sells: Vec<Order>,
}

impl Listing {
    /// Unit price of the top buy order, or 0 with an empty book.
    pub fn top_buy(&self) -> i64 {
        self.buys.first().map(|order| order.unit_price).unwrap_or(0)
    }

    /// Unit price of the top sell offer, or 0 with an empty book.
    pub fn top_sell(&self) -> i64 {
        self.sells
            .first()
            .map(|order| order.unit_price)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct Order {
    /// Number of individual listings collapsed into this price level.
    pub listings: i64,
    pub unit_price: i64,
    pub quantity: i64,
}

/// Blocking trading post client. Cheap to share across worker threads.
pub struct TradingPost {
    http: Client,
    base_url: Url,
}

impl TradingPost {
    pub fn new(timeout: Duration) -> Result<Self, PriceError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// `base` must end in a slash for endpoint joins to resolve under it.
    pub fn with_base_url(base: &str, timeout: Duration) -> Result<Self, PriceError> {
        let base_url = Url::parse(base).map_err(|e| PriceError::Transport(e.to_string()))?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Fetches the order book for one item. Unknown ids come back as 404
    /// from the API and are treated as "no listing".
    fn listings(&self, item_id: ItemId) -> Result<Option<Listing>, PriceError> {
        let url = self
            .base_url
            .join("commerce/listings")
            .map_err(|e| PriceError::Transport(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .query(&[("ids", item_id.to_string())])
            .send()
            .map_err(|e| PriceError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| PriceError::Transport(e.to_string()))?;

        let listings: Vec<Listing> = response
            .json()
            .map_err(|e| PriceError::Decode(e.to_string()))?;

        Ok(listings.into_iter().next())
    }
}

impl MarketPriceService for TradingPost {
    fn buy_price(&self, item_id: ItemId) -> Result<i64, PriceError> {
        Ok(self
            .listings(item_id)?
            .map(|listing| listing.top_buy())
            .unwrap_or(0))
    }

    fn sell_price(&self, item_id: ItemId) -> Result<i64, PriceError> {
        Ok(self
            .listings(item_id)?
            .map(|listing| listing.top_sell())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[{
        "id": 19924,
        "buys": [
            {"listings": 3, "unit_price": 6523, "quantity": 710},
            {"listings": 1, "unit_price": 6522, "quantity": 250}
        ],
        "sells": [
            {"listings": 2, "unit_price": 6600, "quantity": 120}
        ]
    }]"#;

    #[test]
    fn decodes_listing_payload() {
        let listings: Vec<Listing> = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, 19924);
        assert_eq!(listings[0].buys[0].quantity, 710);
        assert_eq!(listings[0].buys[0].listings, 3);
    }

    #[test]
    fn top_prices_take_the_first_order() {
        let listings: Vec<Listing> = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(listings[0].top_buy(), 6523);
        assert_eq!(listings[0].top_sell(), 6600);
    }

    #[test]
    fn empty_books_quote_zero() {
        let listing: Listing = serde_json::from_str(r#"{"id": 1}"#).unwrap();

        assert_eq!(listing.top_buy(), 0);
        assert_eq!(listing.top_sell(), 0);
    }

    #[test]
    fn rejects_an_unparseable_base_url() {
        let result = TradingPost::with_base_url("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(PriceError::Transport(_))));
    }
}
