//! Order book module for the matchbook engine.
//!
//! ## Architecture
//!
//! A single-instrument limit order book with:
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Price levels**: FIFO queues of orders at one price
//! - **Book sides**: price-ordered `BTreeMap`s of levels
//! - **Order index**: order id → slab key for O(1) cancel
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus queue links and a back-reference to its level
//! - [`PriceLevel`]: collection of orders at a single price point
//! - [`BookSide`]: price-ordered levels of one side
//! - [`OrderBook`]: both sides plus the placement/matching/cancel API
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Place limit (no cross) | O(log n) |
//! | Cancel by id | O(1) + O(log n) level cleanup |
//! | Best bid/ask | O(log n) |
//! | Market sweep | O(k + l log n) for k orders over l levels |
//!
//! ## Example
//!
//! ```
//! use matchbook::orderbook::OrderBook;
//! use matchbook::types::Side;
//!
//! let mut book = OrderBook::with_capacity(1_000);
//! let placed = book.place_limit(Side::Buy, 100, 10).unwrap();
//!
//! assert!(placed.resting.is_some());
//! assert_eq!(book.best_bid(), Some(100));
//! ```

pub mod node;
pub mod level;
pub mod side;
pub mod book;

pub use node::OrderNode;
pub use level::{LevelFill, PriceLevel};
pub use side::{BookSide, Levels};
pub use book::OrderBook;
