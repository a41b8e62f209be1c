//! One side of the book: price-ordered price levels.
//!
//! Levels live in a `BTreeMap` keyed by raw price, so the map is always
//! sorted ascending. Which end is "best" depends on the side (highest bid,
//! lowest ask); that choice is made here via [`Side::better`] and nowhere
//! else.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::Rev;
use std::ops::Bound::{Excluded, Unbounded};

use slab::Slab;

use crate::error::BookError;
use crate::orderbook::level::LevelFill;
use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{filled_size, Order, Side};

/// Price-ordered index of the levels resting on one side.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<u64, PriceLevel>,
    /// Sum of all level volumes on this side
    volume: u64,
    order_count: usize,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            volume: 0,
            order_count: 0,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Total resting volume on this side
    #[inline]
    pub fn volume(&self) -> u64 {
        self.volume
    }

    /// Number of resting orders on this side
    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_count
    }

    /// Number of price levels
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    // ========================================================================
    // Price-ordered access
    // ========================================================================

    /// Best-priced level, or `None` if the side is empty
    pub fn best(&self) -> Option<&PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values().next_back(),
            Side::Sell => self.levels.values().next(),
        }
    }

    /// Best price, or `None` if the side is empty
    pub fn best_price(&self) -> Option<u64> {
        self.best().map(|level| level.price)
    }

    /// Next level strictly worse than `price`
    pub fn next_after(&self, price: u64) -> Option<&PriceLevel> {
        match self.side {
            Side::Buy => self.levels.range(..price).next_back().map(|(_, level)| level),
            Side::Sell => self
                .levels
                .range((Excluded(price), Unbounded))
                .next()
                .map(|(_, level)| level),
        }
    }

    /// Levels from best to worst
    pub fn iter(&self) -> Levels<'_> {
        match self.side {
            Side::Buy => Levels::Descending(self.levels.values().rev()),
            Side::Sell => Levels::Ascending(self.levels.values()),
        }
    }

    /// Volume a contra order limited at `limit` could take from this side.
    pub fn reachable_volume(&self, limit: u64) -> u64 {
        self.iter()
            .take_while(|level| self.within_limit(level.price, limit))
            .map(|level| level.volume)
            .sum()
    }

    /// Whether a level at `price` is acceptable to a contra order limited at `limit`.
    ///
    /// A limit never crosses a level priced better than it from this side's
    /// point of view.
    #[inline]
    pub fn within_limit(&self, price: u64, limit: u64) -> bool {
        !self.side.better(limit, price)
    }

    // ========================================================================
    // Level maintenance
    // ========================================================================

    pub fn get_or_create(&mut self, price: u64) -> &mut PriceLevel {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    /// Drop the level at `price`. Only empty levels may be removed.
    pub fn remove(&mut self, price: u64) -> Result<Option<PriceLevel>, BookError> {
        if self.levels.get(&price).is_some_and(|level| !level.is_empty()) {
            return Err(BookError::Corrupted(format!(
                "removing non-empty {} level {price}",
                self.side
            )));
        }
        Ok(self.levels.remove(&price))
    }

    // ========================================================================
    // Order operations (keep the side totals in step with the levels)
    // ========================================================================

    /// Rest the node at `key` on the level at its order's price.
    pub fn insert(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<(), BookError> {
        let node = slab
            .get(key)
            .ok_or_else(|| BookError::Corrupted(format!("dangling slab key {key}")))?;
        if node.side() != self.side {
            return Err(BookError::Corrupted(format!(
                "{} order {} inserted on {} side",
                node.side(),
                node.order_id(),
                self.side
            )));
        }
        let (price, quantity) = (node.price(), node.remaining());

        self.get_or_create(price).add(key, slab)?;
        self.volume += quantity;
        self.order_count += 1;
        Ok(())
    }

    /// Unlink the node at `key` from its level, dropping the level if it empties.
    ///
    /// Returns the removed order's remaining size.
    pub fn unlink(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<u64, BookError> {
        let node = slab
            .get(key)
            .ok_or_else(|| BookError::Corrupted(format!("dangling slab key {key}")))?;
        let price = node.level.ok_or_else(|| {
            BookError::Corrupted(format!("order {} has no level", node.order_id()))
        })?;

        let level = self.levels.get_mut(&price).ok_or_else(|| {
            BookError::Corrupted(format!("{} level {price} missing", self.side))
        })?;
        let quantity = level.remove(key, slab)?;
        if level.is_empty() {
            self.remove(price)?;
        }

        self.volume = self.volume.checked_sub(quantity).ok_or_else(|| {
            BookError::Corrupted(format!("{} side volume underflow", self.side))
        })?;
        self.order_count -= 1;
        Ok(quantity)
    }

    /// Fill `incoming` against the level at `price`, dropping it if it empties.
    pub fn fill_level(
        &mut self,
        price: u64,
        incoming: &mut Order,
        slab: &mut Slab<OrderNode>,
    ) -> Result<LevelFill, BookError> {
        let level = self.levels.get_mut(&price).ok_or_else(|| {
            BookError::Corrupted(format!("{} level {price} missing", self.side))
        })?;
        let fill = level.fill_against(incoming, slab)?;
        if level.is_empty() {
            self.remove(price)?;
        }

        let filled = filled_size(&fill.matches);
        self.volume = self.volume.checked_sub(filled).ok_or_else(|| {
            BookError::Corrupted(format!("{} side volume underflow", self.side))
        })?;
        self.order_count -= fill.filled.len();
        Ok(fill)
    }

    /// Recompute every level volume and the side total by walking the queues.
    pub fn verify(&self, slab: &Slab<OrderNode>) -> Result<usize, BookError> {
        let mut total = 0u64;
        let mut orders = 0usize;

        for (&price, level) in &self.levels {
            if level.is_empty() {
                return Err(BookError::Corrupted(format!("empty {} level {price}", self.side)));
            }
            let mut count = 0usize;
            let mut last_ts = None;
            for node in level.iter(slab) {
                if node.level != Some(price) || node.side() != self.side || node.price() != price {
                    return Err(BookError::Corrupted(format!(
                        "order {} misfiled at {} level {price}",
                        node.order_id(),
                        self.side
                    )));
                }
                if node.remaining() == 0 {
                    return Err(BookError::Corrupted(format!(
                        "order {} resting with zero size",
                        node.order_id()
                    )));
                }
                if last_ts.is_some_and(|ts| ts >= node.order.timestamp) {
                    return Err(BookError::Corrupted(format!(
                        "{} level {price} out of time order",
                        self.side
                    )));
                }
                last_ts = Some(node.order.timestamp);
                count += 1;
            }
            if count != level.order_count || level.recompute_volume(slab) != level.volume {
                return Err(BookError::Corrupted(format!(
                    "{} level {price} accounting mismatch",
                    self.side
                )));
            }
            total += level.volume;
            orders += count;
        }

        if total != self.volume || orders != self.order_count {
            return Err(BookError::Corrupted(format!(
                "{} side totals mismatch",
                self.side
            )));
        }
        Ok(orders)
    }

    pub fn clear(&mut self) {
        self.levels.clear();
        self.volume = 0;
        self.order_count = 0;
    }
}

/// Levels of one side in priority order (see [`BookSide::iter`]).
pub enum Levels<'a> {
    Ascending(btree_map::Values<'a, u64, PriceLevel>),
    Descending(Rev<btree_map::Values<'a, u64, PriceLevel>>),
}

impl<'a> Iterator for Levels<'a> {
    type Item = &'a PriceLevel;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Levels::Ascending(levels) => levels.next(),
            Levels::Descending(levels) => levels.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Levels::Ascending(levels) => levels.size_hint(),
            Levels::Descending(levels) => levels.size_hint(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rest(side: &mut BookSide, slab: &mut Slab<OrderNode>, id: u64, price: u64, qty: u64) -> usize {
        let key = slab.insert(OrderNode::new(Order::new(id, side.side(), price, qty, id)));
        side.insert(key, slab).unwrap();
        key
    }

    fn prices(side: &BookSide) -> Vec<u64> {
        side.iter().map(|level| level.price).collect()
    }

    #[test]
    fn test_bid_ordering() {
        let mut slab = Slab::new();
        let mut bids = BookSide::new(Side::Buy);
        rest(&mut bids, &mut slab, 1, 99, 1);
        rest(&mut bids, &mut slab, 2, 101, 1);
        rest(&mut bids, &mut slab, 3, 100, 1);

        assert_eq!(bids.best_price(), Some(101));
        assert_eq!(prices(&bids), vec![101, 100, 99]);
        assert_eq!(bids.next_after(101).map(|l| l.price), Some(100));
        assert_eq!(bids.next_after(99).map(|l| l.price), None);
    }

    #[test]
    fn test_ask_ordering() {
        let mut slab = Slab::new();
        let mut asks = BookSide::new(Side::Sell);
        rest(&mut asks, &mut slab, 1, 52, 1);
        rest(&mut asks, &mut slab, 2, 50, 1);
        rest(&mut asks, &mut slab, 3, 51, 1);

        assert_eq!(asks.best_price(), Some(50));
        assert_eq!(prices(&asks), vec![50, 51, 52]);
        assert_eq!(asks.next_after(50).map(|l| l.price), Some(51));
        // Works for prices not present in the index too
        assert_eq!(asks.next_after(49).map(|l| l.price), Some(50));
        assert_eq!(asks.next_after(52).map(|l| l.price), None);
    }

    #[test]
    fn test_within_limit() {
        let asks = BookSide::new(Side::Sell);
        // Buyer limited at 100 accepts asks at or below 100
        assert!(asks.within_limit(99, 100));
        assert!(asks.within_limit(100, 100));
        assert!(!asks.within_limit(101, 100));

        let bids = BookSide::new(Side::Buy);
        // Seller limited at 100 accepts bids at or above 100
        assert!(bids.within_limit(101, 100));
        assert!(bids.within_limit(100, 100));
        assert!(!bids.within_limit(99, 100));
    }

    #[test]
    fn test_side_totals_track_levels() {
        let mut slab = Slab::new();
        let mut asks = BookSide::new(Side::Sell);
        let key = rest(&mut asks, &mut slab, 1, 50, 5);
        rest(&mut asks, &mut slab, 2, 51, 3);

        assert_eq!(asks.volume(), 8);
        assert_eq!(asks.order_count(), 2);

        assert_eq!(asks.unlink(key, &mut slab).unwrap(), 5);
        assert_eq!(asks.volume(), 3);
        assert_eq!(asks.len(), 1);
        assert_eq!(prices(&asks), vec![51]);
        assert_eq!(asks.verify(&slab).unwrap(), 1);
    }

    #[test]
    fn test_reachable_volume() {
        let mut slab = Slab::new();
        let mut asks = BookSide::new(Side::Sell);
        rest(&mut asks, &mut slab, 1, 50, 5);
        rest(&mut asks, &mut slab, 2, 51, 3);
        rest(&mut asks, &mut slab, 3, 53, 7);

        assert_eq!(asks.reachable_volume(49), 0);
        assert_eq!(asks.reachable_volume(51), 8);
        assert_eq!(asks.reachable_volume(u64::MAX), 15);

        let mut bids = BookSide::new(Side::Buy);
        rest(&mut bids, &mut slab, 4, 100, 2);
        rest(&mut bids, &mut slab, 5, 98, 4);

        assert_eq!(bids.reachable_volume(99), 2);
        assert_eq!(bids.reachable_volume(1), 6);
    }

    #[test]
    fn test_iter_is_exact_size() {
        let mut slab = Slab::new();
        let mut bids = BookSide::new(Side::Buy);
        rest(&mut bids, &mut slab, 1, 100, 1);
        rest(&mut bids, &mut slab, 2, 101, 1);

        assert_eq!(bids.iter().size_hint(), (2, Some(2)));
        assert_eq!(bids.iter().next().map(|l| l.price), Some(101));
    }

    #[test]
    fn test_insert_wrong_side_is_corruption() {
        let mut slab = Slab::new();
        let mut bids = BookSide::new(Side::Buy);
        let key = slab.insert(OrderNode::new(Order::new(1, Side::Sell, 50, 5, 1)));

        assert!(matches!(bids.insert(key, &mut slab), Err(BookError::Corrupted(_))));
        assert!(bids.is_empty());
    }

    #[test]
    fn test_remove_non_empty_level_refused() {
        let mut slab = Slab::new();
        let mut bids = BookSide::new(Side::Buy);
        rest(&mut bids, &mut slab, 1, 100, 5);

        assert!(matches!(bids.remove(100), Err(BookError::Corrupted(_))));
        assert_eq!(bids.len(), 1);
        assert!(bids.remove(42).unwrap().is_none());
    }

    #[test]
    fn test_fill_level_drops_empty_level() {
        let mut slab = Slab::new();
        let mut asks = BookSide::new(Side::Sell);
        rest(&mut asks, &mut slab, 1, 50, 5);
        rest(&mut asks, &mut slab, 2, 51, 3);

        let mut incoming = Order::new(3, Side::Buy, 0, 6, 3);
        let fill = asks.fill_level(50, &mut incoming, &mut slab).unwrap();

        assert_eq!(fill.filled, vec![1]);
        assert_eq!(incoming.remaining, 1);
        assert_eq!(asks.best_price(), Some(51));
        assert_eq!(asks.volume(), 3);
        assert_eq!(asks.order_count(), 1);
    }
}
