//! Coin formatting
//!
//! Costs are carried as integers in copper; 100 copper make a silver and
//! 100 silver make a gold.

/// Renders a copper value as `"{gold}g {silver}s {copper}c"`.
pub fn format_coins(value: i64) -> String {
    let gold = value / 10_000;
    let silver = value % 10_000 / 100;
    let copper = value % 100;
    format!("{}g {}s {}c", gold, silver, copper)
}
