//! Core data types for matchbook
//!
//! All numeric values use fixed-point representation (scaled by 10^8).
//!
//! ## Types
//!
//! - [`Order`]: an order resting in, or arriving at, a book
//! - [`Side`]: Buy or Sell
//! - [`Match`]: a fill between a resting and an incoming order
//! - [`BookSnapshot`]: read-only view of both sides of a book

mod order;
mod fill;
mod snapshot;
pub mod price;

pub use order::{Order, OrderId, Side};
pub use fill::{filled_size, Match};
pub use snapshot::{BookSnapshot, LevelSnapshot, RestingOrder};
