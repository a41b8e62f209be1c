use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use matchbook::command::{self, matches_json, snapshot_json, CommandError};
use matchbook::types::price::SCALE;
use matchbook::{config, BookError, Exchange, Side};
use serde_json::json;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "matchbook", about = "Price-time priority matching engine")]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin, one JSON result per line
    Repl,
    /// Replay a short scenario against a fresh market
    Demo,
}

fn init_logging(cfg: &config::AppConfig) {
    match cfg.logger.format {
        config::LogFormat::JSON => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(io::stderr)
                .with_max_level(cfg.logger.level)
                .with_current_span(true)
                .init();
        }
        config::LogFormat::COMPACT => {
            tracing_subscriber::fmt()
                .compact()
                .with_writer(io::stderr)
                .with_max_level(cfg.logger.level)
                .init();
        }
    }
}

fn repl(exchange: &Exchange, depth: usize) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let output = match command::parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(cmd)) => command::execute(exchange, cmd, depth),
            Err(e) => Err(e),
        };
        let output = output.unwrap_or_else(|e| {
            if let CommandError::Book(book_error) = &e {
                if book_error.is_fatal() {
                    error!(error = %book_error, "market unavailable");
                }
            }
            json!({ "error": e.to_string() })
        });
        writeln!(stdout, "{output}")?;
    }
    Ok(())
}

fn demo(exchange: &Exchange, depth: usize) -> Result<(), BookError> {
    let market = "DEMO";
    exchange.add_market(market);

    exchange.place_limit(market, Side::Sell, 50 * SCALE, 5 * SCALE)?;
    exchange.place_limit(market, Side::Sell, 51 * SCALE, 8 * SCALE)?;
    let bid = exchange.place_limit(market, Side::Buy, 48 * SCALE, 3 * SCALE)?;
    println!("{}", snapshot_json(market, &exchange.snapshot(market, Some(depth))?));

    let fills = exchange.place_market(market, Side::Buy, 10 * SCALE)?;
    println!("{}", json!({ "market_buy": matches_json(&fills) }));

    match exchange.place_market(market, Side::Buy, 10 * SCALE) {
        Err(e @ BookError::InsufficientLiquidity { .. }) => {
            println!("{}", json!({ "rejected": e.to_string() }));
        }
        other => {
            other?;
        }
    }

    let cancelled = exchange.cancel(market, bid.order_id)?;
    println!("{}", json!({ "cancelled": cancelled.id }));
    println!("{}", snapshot_json(market, &exchange.snapshot(market, Some(depth))?));
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let config = match config::AppConfig::load(cli.config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not load config: {e}");
            std::process::exit(2);
        }
    };

    init_logging(&config);

    let exchange = Exchange::from_config(&config);
    info!(markets = ?exchange.markets(), "exchange ready");

    let result = match cli.command {
        Commands::Repl => repl(&exchange, config.book.depth).map_err(|e| e.to_string()),
        Commands::Demo => demo(&exchange, config.book.depth).map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        error!(error = %e, "matchbook exited with error");
        std::process::exit(1);
    }
}
