//! Symbol-keyed collection of order books.
//!
//! The market map sits behind a reader-writer lock that is held only long
//! enough to clone a book handle out; each book then has its own mutex, so
//! orders on different markets never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::config::AppConfig;
use crate::engine::{MarketExecution, MarketPolicy, Placement};
use crate::error::BookError;
use crate::orderbook::OrderBook;
use crate::types::{BookSnapshot, Match, Order, OrderId, Side};

/// Shared handle to one market's book
pub type BookHandle = Arc<Mutex<OrderBook>>;

#[derive(Debug, Default)]
pub struct Exchange {
    markets: RwLock<HashMap<String, BookHandle>>,
    book_capacity: usize,
}

impl Exchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books created by [`add_market`](Self::add_market) pre-allocate
    /// `book_capacity` order slots.
    pub fn with_capacity(book_capacity: usize) -> Self {
        Self {
            markets: RwLock::new(HashMap::new()),
            book_capacity,
        }
    }

    /// Exchange with every configured market registered.
    pub fn from_config(config: &AppConfig) -> Self {
        let exchange = Self::with_capacity(config.book.capacity);
        for symbol in &config.markets {
            exchange.add_market(symbol);
        }
        exchange
    }

    /// Register an empty book for `symbol`. Returns `false` if it already exists.
    pub fn add_market(&self, symbol: &str) -> bool {
        let mut markets = self.markets.write();
        if markets.contains_key(symbol) {
            return false;
        }
        markets.insert(
            symbol.to_string(),
            Arc::new(Mutex::new(OrderBook::with_capacity(self.book_capacity))),
        );
        info!(symbol, capacity = self.book_capacity, "market registered");
        true
    }

    /// Registered symbols, sorted
    pub fn markets(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.markets.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn has_market(&self, symbol: &str) -> bool {
        self.markets.read().contains_key(symbol)
    }

    /// Handle to the book for `symbol`. The map lock is released on return.
    pub fn book(&self, symbol: &str) -> Result<BookHandle, BookError> {
        self.markets
            .read()
            .get(symbol)
            .cloned()
            .ok_or_else(|| BookError::MarketNotFound(symbol.to_string()))
    }

    pub fn place_limit(
        &self,
        symbol: &str,
        side: Side,
        price: u64,
        size: u64,
    ) -> Result<Placement, BookError> {
        let book = self.book(symbol)?;
        let mut book = book.lock();
        book.place_limit(side, price, size)
    }

    pub fn place_market(&self, symbol: &str, side: Side, size: u64) -> Result<Vec<Match>, BookError> {
        let book = self.book(symbol)?;
        let mut book = book.lock();
        book.place_market(side, size)
    }

    pub fn place_market_with(
        &self,
        symbol: &str,
        side: Side,
        size: u64,
        policy: MarketPolicy,
    ) -> Result<MarketExecution, BookError> {
        let book = self.book(symbol)?;
        let mut book = book.lock();
        book.place_market_with(side, size, policy)
    }

    pub fn cancel(&self, symbol: &str, order_id: OrderId) -> Result<Order, BookError> {
        let book = self.book(symbol)?;
        let mut book = book.lock();
        book.cancel(order_id)
    }

    /// Full snapshot, or the best `depth` levels per side.
    pub fn snapshot(&self, symbol: &str, depth: Option<usize>) -> Result<BookSnapshot, BookError> {
        let book = self.book(symbol)?;
        let book = book.lock();
        Ok(match depth {
            Some(depth) => book.snapshot_depth(depth),
            None => book.snapshot(),
        })
    }
}
