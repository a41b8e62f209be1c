//! Matching module for matchbook.
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - Within a level, the oldest order fills first
//! - Every fill executes at the resting level's price
//! - **Limit orders** cross only levels their limit reaches; the remainder rests
//! - **Market orders** never rest; a shortfall is handled per [`MarketPolicy`]
//!
//! ## Example
//!
//! ```
//! use matchbook::orderbook::OrderBook;
//! use matchbook::types::Side;
//!
//! let mut book = OrderBook::new();
//! book.place_limit(Side::Sell, 50, 5).unwrap();
//!
//! let fills = book.place_market(Side::Buy, 5).unwrap();
//! assert_eq!(fills.len(), 1);
//! assert_eq!(fills[0].price, 50);
//! ```

pub mod matcher;

pub use matcher::{MarketExecution, MarketPolicy, Placement};
