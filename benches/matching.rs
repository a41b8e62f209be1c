//! Benchmarks for the matchbook order book.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- single_match
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use matchbook::{Exchange, OrderBook, Side};

/// 50000.00000000 in fixed-point
const BASE_PRICE: u64 = 5_000_000_000_000;
/// 1.00000000 in fixed-point
const ONE: u64 = 100_000_000;

// ============================================================================
// HELPER FUNCTIONS - Deterministic order generation
// ============================================================================

/// Rest `count` asks at increasing prices starting from `base_price`.
fn populate_asks(book: &mut OrderBook, count: usize, base_price: u64, price_step: u64, quantity: u64) {
    for i in 0..count {
        let price = base_price + (i as u64 * price_step);
        book.place_limit(Side::Sell, price, quantity).expect("populate asks");
    }
}

/// Rest `count` bids at decreasing prices starting from `base_price`.
fn populate_bids(book: &mut OrderBook, count: usize, base_price: u64, price_step: u64, quantity: u64) {
    for i in 0..count {
        let price = base_price - (i as u64 * price_step);
        book.place_limit(Side::Buy, price, quantity).expect("populate bids");
    }
}

/// Deterministic limit order flow: (side, price, quantity).
fn generate_order_batch(count: usize, seed: u64) -> Vec<(Side, u64, u64)> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            // Price variation: ±500.00000000
            let offset: i64 = rng.gen_range(-50_000_000_000i64..=50_000_000_000i64);
            let price = (BASE_PRICE as i64 + offset) as u64;
            // Quantity: 0.01 to 1.0
            let quantity: u64 = rng.gen_range(1_000_000..=ONE);
            (side, price, quantity)
        })
        .collect()
}

// ============================================================================
// BENCHMARK: Single Match Latency
// ============================================================================

fn bench_single_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_match");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("limit_against_best_ask", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(2_000);
                populate_asks(&mut book, 1_000, BASE_PRICE, ONE, ONE);
                book
            },
            |mut book| black_box(book.place_limit(Side::Buy, BASE_PRICE, ONE)),
            BatchSize::LargeInput,
        );
    });

    group.bench_function("market_multi_level_sweep", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(200);
                populate_asks(&mut book, 100, BASE_PRICE, ONE, ONE / 10);
                book
            },
            // Sweeps ~10 levels
            |mut book| black_box(book.place_market(Side::Buy, ONE)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("no_match_rest_on_book", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(2_000);
                populate_asks(&mut book, 1_000, BASE_PRICE, ONE, ONE);
                book
            },
            |mut book| black_box(book.place_limit(Side::Buy, BASE_PRICE - 100 * ONE, ONE)),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Order Operations
// ============================================================================

fn bench_order_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_operations");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("add_to_empty", |b| {
        b.iter_batched(
            OrderBook::new,
            |mut book| black_box(book.place_limit(Side::Buy, BASE_PRICE, ONE)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cancel_mid_book", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(2_000);
                populate_bids(&mut book, 1_000, BASE_PRICE, ONE, ONE);
                book
            },
            // First order has id 1
            |mut book| black_box(book.cancel(500)),
            BatchSize::LargeInput,
        );
    });

    group.bench_function("snapshot_depth_10", |b| {
        let mut book = OrderBook::with_capacity(2_000);
        populate_asks(&mut book, 500, BASE_PRICE, ONE, ONE);
        populate_bids(&mut book, 500, BASE_PRICE - ONE, ONE, ONE);
        b.iter(|| black_box(book.snapshot_depth(10)));
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(15));
    group.sample_size(50);

    for batch_size in [1_000, 10_000, 50_000] {
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::new("orders", batch_size), &batch_size, |b, &size| {
            let orders = generate_order_batch(size, 42);
            b.iter_batched(
                || OrderBook::with_capacity(size),
                |mut book| {
                    for &(side, price, quantity) in &orders {
                        let _ = black_box(book.place_limit(side, price, quantity));
                    }
                    book.order_count()
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("exchange_routed_1k", |b| {
        let orders = generate_order_batch(1_000, 7);
        b.iter_batched(
            || {
                let exchange = Exchange::with_capacity(1_000);
                exchange.add_market("BTC-USD");
                exchange
            },
            |exchange| {
                for &(side, price, quantity) in &orders {
                    let _ = black_box(exchange.place_limit("BTC-USD", side, price, quantity));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Large book and state root
// ============================================================================

fn bench_large_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_book");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    let mut book = OrderBook::with_capacity(120_000);
    populate_asks(&mut book, 50_000, BASE_PRICE, 100_000, 10_000_000);
    populate_bids(&mut book, 50_000, BASE_PRICE - 100_000, 100_000, 10_000_000);

    group.bench_function("state_root_100k", |b| {
        b.iter(|| black_box(book.state_root()));
    });

    group.bench_function("match_in_100k_book", |b| {
        b.iter(|| {
            // Take one unit off the best ask, then put it back
            let matches = book.place_market(Side::Buy, 1).expect("liquidity");
            let price = matches[0].price;
            black_box(book.place_limit(Side::Sell, price, 1))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_match,
    bench_order_operations,
    bench_throughput,
    bench_large_book
);

criterion_main!(benches);
