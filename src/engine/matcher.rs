//! The sweep primitive shared by limit and market placement.

use slab::Slab;
use tracing::trace;

use crate::error::BookError;
use crate::orderbook::{BookSide, OrderNode};
use crate::types::{Match, Order, OrderId};

/// What a market order does when the opposite side is too thin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketPolicy {
    /// Reject the whole order and leave the book untouched.
    #[default]
    AllOrNothing,
    /// Execute against whatever liquidity exists; the rest is dropped, never rested.
    FillAvailable,
}

/// Result of a limit placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Id assigned to the incoming order
    pub order_id: OrderId,
    /// Set when a remainder rests in the book (always equal to `order_id`)
    pub resting: Option<OrderId>,
    /// Fills generated while crossing, in execution order
    pub matches: Vec<Match>,
}

/// Result of a market order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketExecution {
    /// Id assigned to the incoming order
    pub order_id: OrderId,
    /// Fills in execution order
    pub matches: Vec<Match>,
    /// Size left unexecuted; always 0 under [`MarketPolicy::AllOrNothing`]
    pub unfilled: u64,
}

/// Fills and fully consumed resting orders from one sweep.
#[derive(Debug, Default)]
pub struct Sweep {
    pub matches: Vec<Match>,
    pub filled: Vec<OrderId>,
}

/// Match `incoming` against `contra`, best level first.
///
/// With `limit` set the sweep stops at the first level the limit does not
/// reach; without it the sweep runs until `incoming` is filled or the side
/// is empty. Emptied levels are removed as the sweep leaves them.
pub fn sweep(
    contra: &mut BookSide,
    slab: &mut Slab<OrderNode>,
    incoming: &mut Order,
    limit: Option<u64>,
) -> Result<Sweep, BookError> {
    let mut sweep = Sweep::default();
    let mut cursor = contra.best_price();

    while let Some(price) = cursor {
        if incoming.is_filled() {
            break;
        }
        if limit.is_some_and(|limit| !contra.within_limit(price, limit)) {
            break;
        }

        let next = contra.next_after(price).map(|level| level.price);
        let fill = contra.fill_level(price, incoming, slab)?;
        trace!(
            order_id = incoming.id,
            price,
            fills = fill.matches.len(),
            remaining = incoming.remaining,
            "swept level"
        );

        sweep.matches.extend(fill.matches);
        sweep.filled.extend(fill.filled);
        cursor = next;
    }

    Ok(sweep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    fn asks(levels: &[(u64, u64, u64)]) -> (BookSide, Slab<OrderNode>) {
        let mut slab = Slab::new();
        let mut side = BookSide::new(Side::Sell);
        for &(id, price, qty) in levels {
            let key = slab.insert(OrderNode::new(Order::new(id, Side::Sell, price, qty, id)));
            side.insert(key, &mut slab).unwrap();
        }
        (side, slab)
    }

    #[test]
    fn test_sweep_walks_levels_best_first() {
        let (mut side, mut slab) = asks(&[(1, 51, 3), (2, 50, 5)]);
        let mut incoming = Order::new(3, Side::Buy, 0, 6, 3);

        let sweep = sweep(&mut side, &mut slab, &mut incoming, None).unwrap();

        let fills: Vec<(u64, u64)> = sweep.matches.iter().map(|m| (m.price, m.size)).collect();
        assert_eq!(fills, vec![(50, 5), (51, 1)]);
        assert_eq!(sweep.filled, vec![2]);
        assert!(incoming.is_filled());
        assert_eq!(side.best_price(), Some(51));
        assert_eq!(side.volume(), 2);
    }

    #[test]
    fn test_sweep_respects_limit() {
        let (mut side, mut slab) = asks(&[(1, 50, 2), (2, 52, 2)]);
        let mut incoming = Order::new(3, Side::Buy, 51, 10, 3);

        let sweep = sweep(&mut side, &mut slab, &mut incoming, Some(51)).unwrap();

        assert_eq!(sweep.matches.len(), 1);
        assert_eq!(sweep.matches[0].price, 50);
        assert_eq!(incoming.remaining, 8);
        assert_eq!(side.best_price(), Some(52));
    }

    #[test]
    fn test_sweep_empty_side() {
        let (mut side, mut slab) = asks(&[]);
        let mut incoming = Order::new(1, Side::Buy, 0, 4, 1);

        let sweep = sweep(&mut side, &mut slab, &mut incoming, None).unwrap();

        assert!(sweep.matches.is_empty());
        assert_eq!(incoming.remaining, 4);
    }
}
