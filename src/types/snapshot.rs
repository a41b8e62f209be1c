//! Read-only, point-in-time views of an order book.
//!
//! Snapshots own their data, so they can be handed to a transport layer
//! after the book lock is released.

use serde::Serialize;

use crate::types::{Order, OrderId};

/// A resting order as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestingOrder {
    pub id: OrderId,
    /// Unfilled size
    pub size: u64,
    /// Size at placement
    pub original_size: u64,
    pub timestamp: u64,
}

impl From<&Order> for RestingOrder {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            size: order.remaining,
            original_size: order.quantity,
            timestamp: order.timestamp,
        }
    }
}

/// One price level: aggregate volume plus its orders in time priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSnapshot {
    pub price: u64,
    pub volume: u64,
    pub orders: Vec<RestingOrder>,
}

/// Both sides of a book, best level first.
///
/// `total_bid_volume` / `total_ask_volume` cover the whole side even when
/// the level lists are depth-limited.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<LevelSnapshot>,
    pub asks: Vec<LevelSnapshot>,
    pub total_bid_volume: u64,
    pub total_ask_volume: u64,
}

impl BookSnapshot {
    /// Best bid level, if any
    pub fn best_bid(&self) -> Option<&LevelSnapshot> {
        self.bids.first()
    }

    /// Best ask level, if any
    pub fn best_ask(&self) -> Option<&LevelSnapshot> {
        self.asks.first()
    }

    /// True when neither side has resting orders
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
