//! Order types for the matchbook engine.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so resting state has one
//! deterministic byte encoding (used for the book's state root).
//! SSZ encoding rules:
//! - Basic types (u64, u8): direct little-endian encoding
//! - Fixed-size composites: concatenated little-endian fields
//!
//! ## Fixed-Point Representation
//!
//! Prices and sizes are stored as u64 scaled by 10^8 (see [`price`](super::price)).

use std::fmt;

use ssz_rs::prelude::*;

/// Book-assigned order identifier.
pub type OrderId = u64;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Whether price `a` ranks ahead of price `b` for resting orders on this side.
    ///
    /// Bids rank higher prices first, asks rank lower prices first. Every
    /// price comparison in the book goes through here.
    #[inline]
    pub fn better(self, a: u64, b: u64) -> bool {
        match self {
            Side::Buy => a > b,
            Side::Sell => a < b,
        }
    }

    /// Parse `buy`/`bid`/`sell`/`ask` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "bid" | "b" => Some(Side::Buy),
            "sell" | "ask" | "s" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// An order, either resting in the book or being matched on arrival.
///
/// `price` is meaningful only for orders that rest; an incoming market order
/// carries `price == 0`. `timestamp` is the book's logical clock at creation
/// and is strictly increasing across orders of one book.
///
/// ## SSZ Layout
///
/// Fixed-size container: 8+1+8+8+8+8 = 41 bytes.
///
/// ## Example
///
/// ```
/// use matchbook::types::{Order, Side};
///
/// let order = Order::new(1, Side::Buy, 100, 10, 1);
/// assert_eq!(order.side(), Side::Buy);
/// assert_eq!(order.remaining, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier (assigned by the book)
    pub id: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Limit price in fixed-point; 0 for market orders
    pub price: u64,

    /// Original size in fixed-point
    pub quantity: u64,

    /// Unfilled size; decremented as the order is matched
    pub remaining: u64,

    /// Logical creation time, used only for tie-breaking within a level
    pub timestamp: u64,
}

impl Order {
    /// Create a new order with `remaining == quantity`.
    pub fn new(id: OrderId, side: Side, price: u64, quantity: u64, timestamp: u64) -> Self {
        Self {
            id,
            side_raw: side.to_u8(),
            price,
            quantity,
            remaining: quantity,
            timestamp,
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    /// Get the filled quantity
    pub fn filled_quantity(&self) -> u64 {
        self.quantity.saturating_sub(self.remaining)
    }

    /// Fill up to `fill_qty`; returns the amount actually filled.
    pub fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual_fill = fill_qty.min(self.remaining);
        self.remaining -= actual_fill;
        actual_fill
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order{{id: {} | side: {} | price: {} | remaining: {}/{} | ts: {}}}",
            self.id,
            self.side(),
            self.price,
            self.remaining,
            self.quantity,
            self.timestamp
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
