//! Price level management for orders at the same price.
//!
//! ## Design
//!
//! A `PriceLevel` represents all orders resting at a single price.
//! Orders form a doubly-linked FIFO queue through their slab nodes
//! (price-time priority):
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! - New orders are appended at the tail
//! - Matching consumes orders from the head
//! - Any order can be removed in O(1) using its slab key
//!
//! `volume` is kept equal to the sum of the members' remaining sizes by
//! every add, remove and fill; [`PriceLevel::recompute_volume`] exists only
//! for integrity checks.

use slab::Slab;

use crate::error::BookError;
use crate::orderbook::OrderNode;
use crate::types::{Match, Order, OrderId};

/// A price level containing orders at a single price.
///
/// The order data lives in the slab; this struct only holds the queue
/// metadata.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price for this level (fixed-point)
    pub price: u64,

    /// Sum of remaining sizes of all orders at this level
    pub volume: u64,

    /// Oldest order (slab key); matched first
    pub head: Option<usize>,

    /// Newest order (slab key)
    pub tail: Option<usize>,

    /// Number of orders at this level
    pub order_count: usize,
}

/// Outcome of [`PriceLevel::fill_against`].
#[derive(Debug, Default)]
pub struct LevelFill {
    /// Fills in execution order
    pub matches: Vec<Match>,
    /// Resting orders that were completely filled and removed from the level
    pub filled: Vec<OrderId>,
}

fn node_mut(slab: &mut Slab<OrderNode>, key: usize) -> Result<&mut OrderNode, BookError> {
    slab.get_mut(key)
        .ok_or_else(|| BookError::Corrupted(format!("dangling slab key {key}")))
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: u64) -> Self {
        Self {
            price,
            volume: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    /// Check if the price level is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append an order to the tail of the queue.
    ///
    /// Sets the node's back-reference to this level and adds its remaining
    /// size to the level volume.
    pub fn add(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<(), BookError> {
        let price = self.price;
        let tail = self.tail;

        let node = node_mut(slab, key)?;
        if node.is_resting() {
            return Err(BookError::Corrupted(format!(
                "order {} added to level {price} while already resting",
                node.order_id()
            )));
        }
        let quantity = node.remaining();
        node.prev = tail;
        node.next = None;
        node.level = Some(price);

        match tail {
            Some(tail_key) => node_mut(slab, tail_key)?.next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.volume += quantity;
        Ok(())
    }

    /// Remove an order from the queue by slab key.
    ///
    /// Relative order of the remaining orders is preserved. Returns the
    /// removed order's remaining size. An order that is not held by this
    /// level is an integrity fault.
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<u64, BookError> {
        let node = slab
            .get(key)
            .ok_or_else(|| BookError::Corrupted(format!("dangling slab key {key}")))?;
        if node.level != Some(self.price) || self.is_empty() {
            return Err(BookError::Corrupted(format!(
                "order {} not found in level {}",
                node.order_id(),
                self.price
            )));
        }
        let quantity = node.remaining();
        let (prev_key, next_key) = (node.prev, node.next);

        match prev_key {
            Some(prev) => node_mut(slab, prev)?.next = next_key,
            None => self.head = next_key,
        }
        match next_key {
            Some(next) => node_mut(slab, next)?.prev = prev_key,
            None => self.tail = prev_key,
        }

        let node = node_mut(slab, key)?;
        node.prev = None;
        node.next = None;
        node.level = None;

        self.order_count -= 1;
        self.volume = self.volume.checked_sub(quantity).ok_or_else(|| {
            BookError::Corrupted(format!("level {} volume underflow", self.price))
        })?;

        Ok(quantity)
    }

    /// Match `incoming` against this level, oldest order first.
    ///
    /// Each fill is `min(resting.remaining, incoming.remaining)` at this
    /// level's price. Resting orders that reach zero are unlinked and
    /// dropped from the slab once the walk is done.
    pub fn fill_against(
        &mut self,
        incoming: &mut Order,
        slab: &mut Slab<OrderNode>,
    ) -> Result<LevelFill, BookError> {
        let mut fill = LevelFill::default();
        let mut exhausted = Vec::new();
        let mut cursor = self.head;

        while let Some(key) = cursor {
            if incoming.is_filled() {
                break;
            }
            let node = node_mut(slab, key)?;
            let size = node.remaining().min(incoming.remaining);

            node.order.fill(size);
            incoming.fill(size);
            self.volume = self.volume.checked_sub(size).ok_or_else(|| {
                BookError::Corrupted(format!("level {} volume underflow", self.price))
            })?;

            fill.matches.push(Match::new(
                node.order_id(),
                incoming.id,
                incoming.side(),
                self.price,
                size,
            ));
            if node.order.is_filled() {
                exhausted.push(key);
            }
            cursor = node.next;
        }

        for key in exhausted {
            self.remove(key, slab)?;
            fill.filled.push(slab.remove(key).order_id());
        }

        Ok(fill)
    }

    /// Iterate the level's nodes in time priority
    pub fn iter<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            slab,
            cursor: self.head,
        }
    }

    /// Sum the members' remaining sizes by walking the queue.
    pub fn recompute_volume(&self, slab: &Slab<OrderNode>) -> u64 {
        self.iter(slab).map(OrderNode::remaining).sum()
    }
}

/// Iterator over a level's queue, oldest first.
pub struct LevelIter<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a OrderNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.slab.get(self.cursor?)?;
        self.cursor = node.next;
        Some(node)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
