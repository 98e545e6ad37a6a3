//! Simulated Market Feed - random-walk token quotes
//!
//! Every snapshot moves each token's price by a bounded random step and
//! redraws the market sentiment. Seed it for reproducible runs.

use arena_core::{MarketSnapshot, Sentiment, TokenQuote};
use arena_ports::{Clock, MarketFeed, PortResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::to_amount;

/// Configuration for the simulated feed
#[derive(Debug, Clone)]
pub struct MarketFeedConfig {
    /// Starting quotes, in display order
    pub initial_quotes: Vec<TokenQuote>,
    /// Max relative price move per snapshot (0.01 = 1%)
    pub price_volatility: f64,
    /// Tokens whose price never moves
    pub pegged: Vec<String>,
}

impl Default for MarketFeedConfig {
    fn default() -> Self {
        Self {
            initial_quotes: vec![
                quote("SOL", dec!(95.42), dec!(2.3), dec!(1234567)),
                quote("USDC", dec!(1.00), dec!(0.01), dec!(9876543)),
                quote("RAY", dec!(1.85), dec!(-1.2), dec!(456789)),
                quote("BONK", dec!(0.00001234), dec!(15.6), dec!(234567)),
            ],
            price_volatility: 0.01,
            pegged: vec!["USDC".to_string()],
        }
    }
}

fn quote(symbol: &str, price: Decimal, change_24h: Decimal, volume_24h: Decimal) -> TokenQuote {
    TokenQuote {
        symbol: symbol.to_string(),
        price,
        change_24h,
        volume_24h,
    }
}

struct FeedState {
    quotes: Vec<TokenQuote>,
    rng: StdRng,
}

/// Random-walk market feed
pub struct SimulatedMarketFeed {
    config: MarketFeedConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<FeedState>,
}

impl SimulatedMarketFeed {
    pub fn new(config: MarketFeedConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(config, clock, StdRng::from_entropy())
    }

    /// Create with a specific seed for reproducible simulations
    pub fn with_seed(config: MarketFeedConfig, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(config, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: MarketFeedConfig, clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        let quotes = config.initial_quotes.clone();
        Self {
            config,
            clock,
            state: Mutex::new(FeedState { quotes, rng }),
        }
    }

    /// Current price of a token, if it is quoted
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.state
            .lock()
            .quotes
            .iter()
            .find(|q| q.symbol == symbol)
            .map(|q| q.price)
    }

    fn next_snapshot(&self) -> MarketSnapshot {
        let mut state = self.state.lock();
        let FeedState { quotes, rng } = &mut *state;

        for quote in quotes.iter_mut() {
            if self.config.pegged.contains(&quote.symbol) {
                continue;
            }

            // price * (1 + volatility * u), u in [-1, 1)
            let step: f64 = rng.gen_range(-1.0..1.0);
            let multiplier = 1.0 + self.config.price_volatility * step;
            let current = quote.price.to_f64().unwrap_or(0.0);
            let next = to_amount(current * multiplier);
            if next > Decimal::ZERO {
                quote.price = next;
            }

            let drift: f64 = rng.gen_range(-0.5..0.5);
            quote.change_24h = (quote.change_24h + to_amount(drift)).round_dp(2);

            let volume_step: f64 = rng.gen_range(0.95..1.05);
            quote.volume_24h =
                to_amount(quote.volume_24h.to_f64().unwrap_or(0.0) * volume_step).round_dp(0);
        }

        let sentiment = match rng.gen_range(0..4) {
            0 => Sentiment::Bullish,
            1 => Sentiment::Bearish,
            2 => Sentiment::Neutral,
            _ => Sentiment::Volatile,
        };

        MarketSnapshot {
            timestamp: self.clock.now(),
            tokens: quotes.clone(),
            sentiment,
        }
    }
}

#[async_trait]
impl MarketFeed for SimulatedMarketFeed {
    async fn snapshot(&self) -> PortResult<MarketSnapshot> {
        Ok(self.next_snapshot())
    }
}
