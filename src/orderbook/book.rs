//! Single-instrument limit order book.
//!
//! ## Layout
//!
//! - **Slab**: owns every resting order node
//! - **BookSide** ×2: price-ordered levels (bids best-high, asks best-low)
//! - **HashMap**: order id → slab key, so cancel never scans
//!
//! Every resting order is reachable from the id index and from exactly one
//! level on its own side; a fully filled or cancelled order leaves both in
//! the same call. When an operation detects that this no longer holds, the
//! book halts: the fault is logged and every later placement or cancel
//! returns [`BookError::Halted`].

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;
use tracing::{debug, error, warn};

use crate::engine::matcher::{self, MarketExecution, MarketPolicy, Placement};
use crate::error::BookError;
use crate::orderbook::{BookSide, OrderNode};
use crate::types::{BookSnapshot, LevelSnapshot, Match, Order, OrderId, RestingOrder, Side};

/// Limit order book for one instrument.
#[derive(Debug)]
pub struct OrderBook {
    /// Resting order storage
    orders: Slab<OrderNode>,

    /// Buy levels, best = highest price
    bids: BookSide,

    /// Sell levels, best = lowest price
    asks: BookSide,

    /// Order id → slab key (resting orders only)
    order_index: HashMap<OrderId, usize>,

    /// Next order id to hand out
    next_order_id: OrderId,

    /// Logical clock for order timestamps
    clock: u64,

    /// Set once an integrity fault is detected
    halted: bool,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create a new empty book
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with `order_capacity` pre-allocated order slots
    ///
    /// ```
    /// use matchbook::orderbook::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(10_000);
    /// assert!(book.capacity() >= 10_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            order_index: HashMap::with_capacity(order_capacity),
            next_order_id: 1,
            clock: 0,
            halted: false,
        }
    }

    // ========================================================================
    // Size and top of book
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_index.is_empty()
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[inline]
    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    #[inline]
    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    /// The index for one side
    #[inline]
    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.best_price()
    }

    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.best_price()
    }

    /// `best_ask - best_bid`, or `None` if either side is empty
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    #[inline]
    pub fn total_bid_volume(&self) -> u64 {
        self.bids.volume()
    }

    #[inline]
    pub fn total_ask_volume(&self) -> u64 {
        self.asks.volume()
    }

    /// Look up a resting order by id
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let key = *self.order_index.get(&order_id)?;
        self.orders.get(key).map(|node| &node.order)
    }

    #[inline]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.order_index.contains_key(&order_id)
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Place a limit order.
    ///
    /// Crossing liquidity at prices at least as good as `price` is taken
    /// first, each fill at the resting level's price; any remainder rests
    /// at `price`.
    ///
    /// ```
    /// use matchbook::orderbook::OrderBook;
    /// use matchbook::types::Side;
    ///
    /// let mut book = OrderBook::new();
    /// let a = book.place_limit(Side::Buy, 100, 10).unwrap();
    /// let b = book.place_limit(Side::Sell, 100, 4).unwrap();
    ///
    /// assert_eq!(b.resting, None);
    /// assert_eq!(b.matches[0].resting_order_id, a.order_id);
    /// assert_eq!(book.order(a.order_id).unwrap().remaining, 6);
    /// ```
    pub fn place_limit(&mut self, side: Side, price: u64, size: u64) -> Result<Placement, BookError> {
        self.ensure_live()?;
        if size == 0 {
            return Err(BookError::InvalidSize);
        }
        if price == 0 {
            return Err(BookError::InvalidPrice);
        }
        // Only the part left after crossing rests on this side
        let resting = size.saturating_sub(self.side(side.opposite()).reachable_volume(price));
        if self.side(side).volume().checked_add(resting).is_none() {
            return Err(BookError::InvalidSize);
        }

        let result = self.execute_limit(side, price, size);
        let placement = self.settle(result)?;
        debug!(
            order_id = placement.order_id,
            %side,
            price,
            size,
            fills = placement.matches.len(),
            resting = placement.resting.is_some(),
            "limit order placed"
        );
        Ok(placement)
    }

    /// Place a market order that must fill completely.
    ///
    /// Fails with [`BookError::InsufficientLiquidity`] when the opposite side
    /// holds less than `size`; the book is then left exactly as it was.
    pub fn place_market(&mut self, side: Side, size: u64) -> Result<Vec<Match>, BookError> {
        self.place_market_with(side, size, MarketPolicy::AllOrNothing)
            .map(|execution| execution.matches)
    }

    /// Place a market order with an explicit shortfall policy.
    pub fn place_market_with(
        &mut self,
        side: Side,
        size: u64,
        policy: MarketPolicy,
    ) -> Result<MarketExecution, BookError> {
        self.ensure_live()?;
        if size == 0 {
            return Err(BookError::InvalidSize);
        }

        let available = self.side(side.opposite()).volume();
        if policy == MarketPolicy::AllOrNothing && available < size {
            warn!(%side, requested = size, available, "market order rejected");
            return Err(BookError::InsufficientLiquidity {
                requested: size,
                available,
            });
        }

        let result = self.execute_market(side, size, policy);
        let execution = self.settle(result)?;
        debug!(
            order_id = execution.order_id,
            %side,
            size,
            fills = execution.matches.len(),
            unfilled = execution.unfilled,
            "market order executed"
        );
        Ok(execution)
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Cancel a resting order, returning it as it stood.
    ///
    /// ```
    /// use matchbook::orderbook::OrderBook;
    /// use matchbook::types::Side;
    /// use matchbook::BookError;
    ///
    /// let mut book = OrderBook::new();
    /// let placed = book.place_limit(Side::Sell, 100, 5).unwrap();
    ///
    /// assert_eq!(book.cancel(placed.order_id).unwrap().remaining, 5);
    /// assert_eq!(book.cancel(placed.order_id), Err(BookError::OrderNotFound(placed.order_id)));
    /// ```
    pub fn cancel(&mut self, order_id: OrderId) -> Result<Order, BookError> {
        self.ensure_live()?;
        let key = *self
            .order_index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound(order_id))?;

        let result = self.remove_resting(order_id, key);
        let order = self.settle(result)?;
        debug!(order_id, side = %order.side(), price = order.price, remaining = order.remaining, "order cancelled");
        Ok(order)
    }

    // ========================================================================
    // Read-only views
    // ========================================================================

    /// Both sides, every level
    pub fn snapshot(&self) -> BookSnapshot {
        self.snapshot_depth(usize::MAX)
    }

    /// Both sides, at most `depth` levels each. Totals cover the whole side.
    pub fn snapshot_depth(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            bids: self.levels(&self.bids, depth),
            asks: self.levels(&self.asks, depth),
            total_bid_volume: self.bids.volume(),
            total_ask_volume: self.asks.volume(),
        }
    }

    fn levels(&self, side: &BookSide, depth: usize) -> Vec<LevelSnapshot> {
        side.iter()
            .take(depth)
            .map(|level| LevelSnapshot {
                price: level.price,
                volume: level.volume,
                orders: level
                    .iter(&self.orders)
                    .map(|node| RestingOrder::from(&node.order))
                    .collect(),
            })
            .collect()
    }

    /// Recompute all derived state and check every cross-reference.
    pub fn verify_integrity(&self) -> Result<(), BookError> {
        let resting = self.bids.verify(&self.orders)? + self.asks.verify(&self.orders)?;
        if resting != self.orders.len() || resting != self.order_index.len() {
            return Err(BookError::Corrupted(format!(
                "{resting} orders on levels, {} stored, {} indexed",
                self.orders.len(),
                self.order_index.len()
            )));
        }
        for (&order_id, &key) in &self.order_index {
            match self.orders.get(key) {
                Some(node) if node.order_id() == order_id && node.is_resting() => {}
                _ => {
                    return Err(BookError::Corrupted(format!(
                        "index entry for order {order_id} is stale"
                    )))
                }
            }
        }
        Ok(())
    }

    /// SHA-256 over the SSZ encoding of every resting order, bids then asks,
    /// each in priority order.
    pub fn state_root(&self) -> Result<[u8; 32], BookError> {
        let mut hasher = Sha256::new();
        for side in [&self.bids, &self.asks] {
            for level in side.iter() {
                for node in level.iter(&self.orders) {
                    let bytes = ssz_rs::serialize(&node.order)
                        .map_err(|e| BookError::Encoding(format!("{e:?}")))?;
                    hasher.update(&bytes);
                }
            }
        }
        Ok(hasher.finalize().into())
    }

    /// [`state_root`](Self::state_root) as lowercase hex
    pub fn state_root_hex(&self) -> Result<String, BookError> {
        self.state_root().map(hex::encode)
    }

    /// Drop every resting order. Ids and the clock keep counting.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        self.order_index.clear();
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn ensure_live(&self) -> Result<(), BookError> {
        if self.halted {
            Err(BookError::Halted)
        } else {
            Ok(())
        }
    }

    /// Halt on integrity faults; pass every result through.
    fn settle<T>(&mut self, result: Result<T, BookError>) -> Result<T, BookError> {
        if let Err(BookError::Corrupted(reason)) = &result {
            self.halted = true;
            error!(%reason, "order book halted");
        }
        result
    }

    fn next_order(&mut self, side: Side, price: u64, size: u64) -> Order {
        let id = self.next_order_id;
        self.next_order_id += 1;
        self.clock += 1;
        Order::new(id, side, price, size, self.clock)
    }

    fn execute_limit(&mut self, side: Side, price: u64, size: u64) -> Result<Placement, BookError> {
        let mut order = self.next_order(side, price, size);
        let order_id = order.id;

        let Self { orders, bids, asks, order_index, .. } = self;
        let (own, contra) = match side {
            Side::Buy => (bids, asks),
            Side::Sell => (asks, bids),
        };

        let sweep = matcher::sweep(contra, orders, &mut order, Some(price))?;
        forget_filled(order_index, &sweep.filled)?;

        let resting = if order.is_filled() {
            None
        } else {
            let key = orders.insert(OrderNode::new(order));
            own.insert(key, orders)?;
            order_index.insert(order_id, key);
            Some(order_id)
        };

        Ok(Placement {
            order_id,
            resting,
            matches: sweep.matches,
        })
    }

    fn execute_market(
        &mut self,
        side: Side,
        size: u64,
        policy: MarketPolicy,
    ) -> Result<MarketExecution, BookError> {
        let mut order = self.next_order(side, 0, size);

        let Self { orders, bids, asks, order_index, .. } = self;
        let contra = match side {
            Side::Buy => asks,
            Side::Sell => bids,
        };

        let sweep = matcher::sweep(contra, orders, &mut order, None)?;
        forget_filled(order_index, &sweep.filled)?;

        if policy == MarketPolicy::AllOrNothing && !order.is_filled() {
            return Err(BookError::Corrupted(format!(
                "side volume covered market order {} but sweep left {}",
                order.id, order.remaining
            )));
        }

        Ok(MarketExecution {
            order_id: order.id,
            matches: sweep.matches,
            unfilled: order.remaining,
        })
    }

    fn remove_resting(&mut self, order_id: OrderId, key: usize) -> Result<Order, BookError> {
        let Self { orders, bids, asks, order_index, .. } = self;

        let side = match orders.get(key) {
            Some(node) if node.order_id() == order_id && node.is_resting() => node.side(),
            _ => {
                return Err(BookError::Corrupted(format!(
                    "index entry for order {order_id} is stale"
                )))
            }
        };
        match side {
            Side::Buy => bids.unlink(key, orders)?,
            Side::Sell => asks.unlink(key, orders)?,
        };

        order_index.remove(&order_id);
        Ok(orders.remove(key).order)
    }
}

/// Drop fully filled resting orders from the id index.
fn forget_filled(index: &mut HashMap<OrderId, usize>, filled: &[OrderId]) -> Result<(), BookError> {
    for order_id in filled {
        if index.remove(order_id).is_none() {
            return Err(BookError::Corrupted(format!(
                "filled order {order_id} missing from index"
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================
