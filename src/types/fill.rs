//! Match record produced when an incoming order trades against a resting one.

use ssz_rs::prelude::*;

use crate::types::{OrderId, Side};

/// A single fill between a resting (maker) order and an incoming (taker) order.
///
/// The fill always executes at the resting level's price, so any price
/// improvement goes to the incoming order.
///
/// ## SSZ Layout
///
/// Fixed-size container: 8+8+1+8+8 = 33 bytes.
///
/// ```
/// use matchbook::types::{Match, Side};
///
/// let m = Match::new(1, 2, Side::Sell, 100, 4);
/// assert_eq!(m.bid_order_id(), 1);
/// assert_eq!(m.ask_order_id(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Match {
    /// The order that was resting in the book
    pub resting_order_id: u64,

    /// The order whose arrival triggered the fill
    pub incoming_order_id: u64,

    /// Side of the incoming order as u8 (0=Buy, 1=Sell)
    pub incoming_side_raw: u8,

    /// Execution price (the resting level's price)
    pub price: u64,

    /// Size filled
    pub size: u64,
}

impl Match {
    pub fn new(
        resting_order_id: OrderId,
        incoming_order_id: OrderId,
        incoming_side: Side,
        price: u64,
        size: u64,
    ) -> Self {
        Self {
            resting_order_id,
            incoming_order_id,
            incoming_side_raw: incoming_side.to_u8(),
            price,
            size,
        }
    }

    /// Side of the incoming (taker) order.
    pub fn incoming_side(&self) -> Side {
        Side::from_u8(self.incoming_side_raw).unwrap_or(Side::Buy)
    }

    /// Id of the buying order in this fill.
    pub fn bid_order_id(&self) -> OrderId {
        match self.incoming_side() {
            Side::Buy => self.incoming_order_id,
            Side::Sell => self.resting_order_id,
        }
    }

    /// Id of the selling order in this fill.
    pub fn ask_order_id(&self) -> OrderId {
        match self.incoming_side() {
            Side::Buy => self.resting_order_id,
            Side::Sell => self.incoming_order_id,
        }
    }
}

/// Sum of fill sizes.
pub fn filled_size(matches: &[Match]) -> u64 {
    matches.iter().map(|m| m.size).sum()
}
