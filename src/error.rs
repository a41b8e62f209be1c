//! Error type shared by the order book and the exchange router.
//!
//! Input errors (`InvalidSize`, `InvalidPrice`) are raised before the book is
//! touched. `InsufficientLiquidity` is an ordinary outcome of a market order
//! and leaves the book unmodified. `Corrupted` means an internal invariant
//! broke; the book that reports it halts and answers every later request
//! with `Halted`.

use thiserror::Error;

use crate::types::OrderId;

/// Errors returned by [`OrderBook`](crate::OrderBook) and
/// [`Exchange`](crate::Exchange) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Order size was zero.
    #[error("invalid size: order size must be positive")]
    InvalidSize,

    /// Limit price was zero.
    #[error("invalid price: limit price must be positive")]
    InvalidPrice,

    /// The opposite side cannot fully satisfy a market order.
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    /// Cancellation target is unknown or no longer resting.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// No book is registered for the symbol.
    #[error("market {0} not found")]
    MarketNotFound(String),

    /// An internal invariant was violated. The book halts after this.
    #[error("order book corrupted: {0}")]
    Corrupted(String),

    /// The book halted after an earlier integrity fault.
    #[error("order book halted after an integrity fault")]
    Halted,

    /// SSZ encoding failed while hashing book state.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl BookError {
    /// True for errors that mean the book can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BookError::Corrupted(_) | BookError::Halted)
    }
}
