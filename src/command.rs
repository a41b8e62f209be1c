//! Line-oriented command protocol used by the `repl` binary.
//!
//! Input (one command per line, whitespace separated, amounts in decimal):
//!
//! - `limit <market> <buy|sell> <price> <size>`
//! - `market <market> <buy|sell> <size> [aon|partial]`
//! - `cancel <market> <order_id>`
//! - `book <market> [depth]`
//! - `markets`
//!
//! Blank lines and lines starting with `#` are ignored. Every executed
//! command produces one JSON value; amounts are rendered as decimal strings.

use serde_json::{json, Value};
use thiserror::Error;

use crate::engine::MarketPolicy;
use crate::error::BookError;
use crate::exchange::Exchange;
use crate::types::price::{from_fixed_trimmed, to_fixed};
use crate::types::{filled_size, BookSnapshot, LevelSnapshot, Match, OrderId, Side};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Limit {
        market: String,
        side: Side,
        price: u64,
        size: u64,
    },
    Market {
        market: String,
        side: Side,
        size: u64,
        policy: MarketPolicy,
    },
    Cancel {
        market: String,
        order_id: OrderId,
    },
    Book {
        market: String,
        depth: Option<usize>,
    },
    Markets,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid side `{0}`, expected buy or sell")]
    InvalidSide(String),

    #[error("invalid amount `{0}`")]
    InvalidAmount(String),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error(transparent)]
    Book(#[from] BookError),
}

const LIMIT_USAGE: &str = "limit <market> <buy|sell> <price> <size>";
const MARKET_USAGE: &str = "market <market> <buy|sell> <size> [aon|partial]";
const CANCEL_USAGE: &str = "cancel <market> <order_id>";
const BOOK_USAGE: &str = "book <market> [depth]";

/// Parse one input line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let command = match tokens[0].to_ascii_lowercase().as_str() {
        "limit" => match tokens[1..] {
            [market, side, price, size] => Command::Limit {
                market: market.to_string(),
                side: parse_side(side)?,
                price: parse_amount(price)?,
                size: parse_amount(size)?,
            },
            _ => return Err(CommandError::Usage(LIMIT_USAGE)),
        },
        "market" => {
            let (market, side, size, policy) = match tokens[1..] {
                [market, side, size] => (market, side, size, None),
                [market, side, size, policy] => (market, side, size, Some(policy)),
                _ => return Err(CommandError::Usage(MARKET_USAGE)),
            };
            let policy = match policy.map(str::to_ascii_lowercase).as_deref() {
                None | Some("aon") => MarketPolicy::AllOrNothing,
                Some("partial") => MarketPolicy::FillAvailable,
                Some(_) => return Err(CommandError::Usage(MARKET_USAGE)),
            };
            Command::Market {
                market: market.to_string(),
                side: parse_side(side)?,
                size: parse_amount(size)?,
                policy,
            }
        }
        "cancel" => match tokens[1..] {
            [market, order_id] => Command::Cancel {
                market: market.to_string(),
                order_id: parse_number(order_id)?,
            },
            _ => return Err(CommandError::Usage(CANCEL_USAGE)),
        },
        "book" => match tokens[1..] {
            [market] => Command::Book {
                market: market.to_string(),
                depth: None,
            },
            [market, depth] => Command::Book {
                market: market.to_string(),
                depth: Some(parse_number(depth)?),
            },
            _ => return Err(CommandError::Usage(BOOK_USAGE)),
        },
        "markets" => Command::Markets,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_side(token: &str) -> Result<Side, CommandError> {
    Side::parse(token).ok_or_else(|| CommandError::InvalidSide(token.to_string()))
}

fn parse_amount(token: &str) -> Result<u64, CommandError> {
    to_fixed(token).ok_or_else(|| CommandError::InvalidAmount(token.to_string()))
}

fn parse_number<T: std::str::FromStr>(token: &str) -> Result<T, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

/// Run `command` against `exchange`. `default_depth` applies to `book`
/// commands without an explicit depth.
pub fn execute(exchange: &Exchange, command: Command, default_depth: usize) -> Result<Value, CommandError> {
    let output = match command {
        Command::Limit { market, side, price, size } => {
            let placement = exchange.place_limit(&market, side, price, size)?;
            let remaining = size - filled_size(&placement.matches);
            json!({
                "order_id": placement.order_id,
                "resting": placement.resting.is_some(),
                "remaining": from_fixed_trimmed(remaining),
                "matches": matches_json(&placement.matches),
            })
        }
        Command::Market { market, side, size, policy } => {
            let execution = exchange.place_market_with(&market, side, size, policy)?;
            json!({
                "order_id": execution.order_id,
                "matches": matches_json(&execution.matches),
                "unfilled": from_fixed_trimmed(execution.unfilled),
            })
        }
        Command::Cancel { market, order_id } => {
            let order = exchange.cancel(&market, order_id)?;
            json!({
                "cancelled": order.id,
                "side": order.side(),
                "price": from_fixed_trimmed(order.price),
                "remaining": from_fixed_trimmed(order.remaining),
                "filled": from_fixed_trimmed(order.filled_quantity()),
            })
        }
        Command::Book { market, depth } => {
            let snapshot = exchange.snapshot(&market, Some(depth.unwrap_or(default_depth)))?;
            snapshot_json(&market, &snapshot)
        }
        Command::Markets => json!({ "markets": exchange.markets() }),
    };
    Ok(output)
}

/// JSON for a list of fills, amounts as decimal strings.
pub fn matches_json(matches: &[Match]) -> Value {
    Value::Array(
        matches
            .iter()
            .map(|m| {
                json!({
                    "bid_order_id": m.bid_order_id(),
                    "ask_order_id": m.ask_order_id(),
                    "resting_order_id": m.resting_order_id,
                    "incoming_order_id": m.incoming_order_id,
                    "price": from_fixed_trimmed(m.price),
                    "size": from_fixed_trimmed(m.size),
                })
            })
            .collect(),
    )
}

/// JSON for a book snapshot, amounts as decimal strings.
pub fn snapshot_json(market: &str, snapshot: &BookSnapshot) -> Value {
    fn levels(levels: &[LevelSnapshot]) -> Value {
        Value::Array(
            levels
                .iter()
                .map(|level| {
                    json!({
                        "price": from_fixed_trimmed(level.price),
                        "volume": from_fixed_trimmed(level.volume),
                        "orders": level.orders.iter().map(|o| json!({
                            "id": o.id,
                            "size": from_fixed_trimmed(o.size),
                            "timestamp": o.timestamp,
                        })).collect::<Vec<_>>(),
                    })
                })
                .collect(),
        )
    }

    let best = |level: Option<&LevelSnapshot>| level.map(|l| from_fixed_trimmed(l.price));

    json!({
        "market": market,
        "best_bid": best(snapshot.best_bid()),
        "best_ask": best(snapshot.best_ask()),
        "total_bid_volume": from_fixed_trimmed(snapshot.total_bid_volume),
        "total_ask_volume": from_fixed_trimmed(snapshot.total_ask_volume),
        "bids": levels(&snapshot.bids),
        "asks": levels(&snapshot.asks),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::SCALE;

    fn exchange() -> Exchange {
        let exchange = Exchange::new();
        exchange.add_market("ETH");
        exchange
    }

    fn run(exchange: &Exchange, line: &str) -> Result<Value, CommandError> {
        let command = parse_line(line)?.expect("command");
        execute(exchange, command, 10)
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# seed the book"), Ok(None));
    }

    #[test]
    fn test_parse_limit() {
        let command = parse_line("limit ETH buy 100.5 2").unwrap().unwrap();
        assert_eq!(
            command,
            Command::Limit {
                market: "ETH".to_string(),
                side: Side::Buy,
                price: 10_050_000_000,
                size: 2 * SCALE,
            }
        );
    }

    #[test]
    fn test_parse_market_policy() {
        let command = parse_line("MARKET ETH ask 1 partial").unwrap().unwrap();
        assert_eq!(
            command,
            Command::Market {
                market: "ETH".to_string(),
                side: Side::Sell,
                size: SCALE,
                policy: MarketPolicy::FillAvailable,
            }
        );
        assert!(matches!(
            parse_line("market ETH buy 1").unwrap().unwrap(),
            Command::Market { policy: MarketPolicy::AllOrNothing, .. }
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_line("fly ETH"), Err(CommandError::Unknown("fly".to_string())));
        assert_eq!(parse_line("limit ETH buy 1"), Err(CommandError::Usage(LIMIT_USAGE)));
        assert_eq!(
            parse_line("limit ETH up 1 1"),
            Err(CommandError::InvalidSide("up".to_string()))
        );
        assert_eq!(
            parse_line("limit ETH buy -1 1"),
            Err(CommandError::InvalidAmount("-1".to_string()))
        );
        assert_eq!(
            parse_line("cancel ETH x"),
            Err(CommandError::InvalidNumber("x".to_string()))
        );
        assert_eq!(parse_line("market ETH buy 1 maybe"), Err(CommandError::Usage(MARKET_USAGE)));
    }

    #[test]
    fn test_execute_session() {
        let exchange = exchange();

        let placed = run(&exchange, "limit ETH sell 50 5").unwrap();
        assert_eq!(placed["order_id"], 1);
        assert_eq!(placed["resting"], true);

        let filled = run(&exchange, "market ETH buy 2").unwrap();
        assert_eq!(filled["matches"][0]["ask_order_id"], 1);
        assert_eq!(filled["matches"][0]["bid_order_id"], 2);
        assert_eq!(filled["matches"][0]["price"], "50");
        assert_eq!(filled["unfilled"], "0");

        let book = run(&exchange, "book ETH").unwrap();
        assert_eq!(book["total_ask_volume"], "3");
        assert_eq!(book["asks"][0]["orders"][0]["id"], 1);

        let cancelled = run(&exchange, "cancel ETH 1").unwrap();
        assert_eq!(cancelled["remaining"], "3");
        assert_eq!(cancelled["filled"], "2");
        assert_eq!(cancelled["side"], "sell");
    }

    #[test]
    fn test_limit_reports_remaining() {
        let exchange = exchange();
        run(&exchange, "limit ETH sell 50 1.5").unwrap();

        let crossed = run(&exchange, "limit ETH buy 51 4").unwrap();
        assert_eq!(crossed["resting"], true);
        assert_eq!(crossed["remaining"], "2.5");
        assert_eq!(crossed["matches"][0]["size"], "1.5");

        let filled = run(&exchange, "limit ETH sell 51 2.5").unwrap();
        assert_eq!(filled["resting"], false);
        assert_eq!(filled["remaining"], "0");

        let resting = run(&exchange, "limit ETH sell 60 1").unwrap();
        assert_eq!(resting["remaining"], "1");
    }

    #[test]
    fn test_book_reports_best_prices() {
        let exchange = exchange();
        assert_eq!(run(&exchange, "book ETH").unwrap()["best_bid"], Value::Null);

        run(&exchange, "limit ETH buy 49.5 1").unwrap();
        run(&exchange, "limit ETH buy 49 1").unwrap();
        run(&exchange, "limit ETH sell 50.25 1").unwrap();

        let book = run(&exchange, "book ETH 1").unwrap();
        assert_eq!(book["best_bid"], "49.5");
        assert_eq!(book["best_ask"], "50.25");
        assert_eq!(book["bids"].as_array().map(Vec::len), Some(1));
        assert_eq!(book["total_bid_volume"], "2");
    }

    #[test]
    fn test_execute_errors() {
        let exchange = exchange();

        assert_eq!(
            run(&exchange, "market ETH buy 1"),
            Err(CommandError::Book(BookError::InsufficientLiquidity {
                requested: SCALE,
                available: 0
            }))
        );
        assert_eq!(
            run(&exchange, "book BTC"),
            Err(CommandError::Book(BookError::MarketNotFound("BTC".to_string())))
        );
        assert_eq!(
            run(&exchange, "limit ETH buy 0 1"),
            Err(CommandError::Book(BookError::InvalidPrice))
        );
    }

    #[test]
    fn test_markets_listing() {
        let exchange = exchange();
        exchange.add_market("BTC");

        let listing = run(&exchange, "markets").unwrap();
        assert_eq!(listing["markets"], json!(["BTC", "ETH"]));
    }
}
