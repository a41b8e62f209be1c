//! Order node for slab-based storage.
//!
//! `OrderNode` wraps an `Order` with the links of its price level's FIFO
//! queue and a back-reference to that level. Links and back-reference are
//! keys (slab indices, a price), never pointers, so the price level stays
//! the only owner of queue structure and removal is a handful of index
//! updates.
//!
//! ```text
//! level.head (oldest) <-> node <-> node <-> level.tail (newest)
//! ```

use crate::types::{Order, OrderId, Side};

/// Order node stored in the book's slab.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The actual order data
    pub order: Order,

    /// Next (newer) order in the level queue
    pub next: Option<usize>,

    /// Previous (older) order in the level queue
    pub prev: Option<usize>,

    /// Price of the level holding this order, on `order.side()`.
    /// `None` while the order is not resting.
    pub level: Option<u64>,
}

impl OrderNode {
    /// Create a new, unlinked node
    ///
    /// ```
    /// use matchbook::orderbook::OrderNode;
    /// use matchbook::types::{Order, Side};
    ///
    /// let node = OrderNode::new(Order::new(1, Side::Buy, 100, 10, 1));
    /// assert!(node.is_unlinked());
    /// assert!(node.level.is_none());
    /// ```
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
            level: None,
        }
    }

    /// Check if this node has no queue neighbours
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    /// Check if this node is held by a price level
    #[inline]
    pub fn is_resting(&self) -> bool {
        self.level.is_some()
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.order.side()
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.order.remaining
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
