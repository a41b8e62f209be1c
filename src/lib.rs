//! # matchbook
//!
//! Price-time priority limit order book and matching engine.
//!
//! ## Architecture
//!
//! - **Types**: Order, Match, snapshots and fixed-point helpers
//! - **OrderBook**: slab-backed levels with O(1) cancel by id
//! - **Engine**: the sweep shared by limit and market placement
//! - **Exchange**: symbol → book routing with one lock per book
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical input sequences give identical books and state roots
//! 2. **No Floating Point**: amounts are `u64` scaled by 10^8
//! 3. **Pre-allocated Memory**: slab allocation for order nodes
//! 4. **Fail closed**: a book that detects an internal inconsistency halts

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Side, Match, snapshots
pub mod types;

/// Order book: levels, sides and the per-instrument book
pub mod orderbook;

/// Matching rules and placement results
pub mod engine;

/// Multi-market routing
pub mod exchange;

/// Line command protocol for the binary
pub mod command;

/// Layered application configuration
pub mod config;

pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::AppConfig;
pub use engine::{MarketExecution, MarketPolicy, Placement};
pub use error::BookError;
pub use exchange::Exchange;
pub use orderbook::OrderBook;
pub use types::{BookSnapshot, LevelSnapshot, Match, Order, OrderId, RestingOrder, Side};
