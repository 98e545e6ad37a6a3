//! Social notifications rendered to the log
//!
//! No network posting happens here. Messages are rendered from the same
//! templates a real poster would use and written at info level.

use arena_core::{Action, Personality, TradeRecord, format_survival_time};
use arena_ports::{DeathNotice, NotificationSink};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Render a trade announcement
pub fn render_trade(personality: &Personality, trade: &TradeRecord) -> String {
    let action_emoji = match trade.action {
        Action::Buy => "📈",
        Action::Sell => "📉",
        Action::Hold => "⏸️",
    };
    let profit_emoji = if trade.profit > Decimal::ZERO { "💰" } else { "📉" };
    let sign = if trade.profit >= Decimal::ZERO { "+" } else { "" };

    format!(
        "{} {} {} just {}'d {} {} → {}\n{} P/L: {}{} SOL\n{}",
        action_emoji,
        personality.emoji,
        personality.name,
        trade.action,
        trade.amount_in.round_dp(4),
        trade.token_in,
        trade.token_out,
        profit_emoji,
        sign,
        trade.profit.round_dp(4),
        personality.strategy_headline()
    )
}

/// Render a death announcement
pub fn render_death(personality: &Personality, notice: &DeathNotice) -> String {
    let success_rate = if notice.total_trades == 0 {
        0.0
    } else {
        notice.successful_trades as f64 / notice.total_trades as f64 * 100.0
    };

    format!(
        "💀 {} {} has died.\nSurvived: {}\nReason: {}\nTrades: {} ({:.1}% success)\nNet P/L: {} SOL",
        personality.name,
        personality.emoji,
        format_survival_time(notice.survival_time_ms),
        notice.reason,
        notice.total_trades,
        success_rate,
        notice.net_profit.round_dp(4)
    )
}

pub fn render_thought(personality: &Personality, thought: &str) -> String {
    format!(
        "{} {} thinking:\n\"{}\"",
        personality.emoji, personality.name, thought
    )
}

/// Notification sink that writes posts to the log
///
/// Thoughts are sampled so that only a fraction of them are posted.
pub struct LogNotifier {
    thought_probability: f64,
    rng: Mutex<StdRng>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self {
            thought_probability: 0.1,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_thought_probability(mut self, probability: f64) -> Self {
        self.thought_probability = probability.clamp(0.0, 1.0);
        self
    }

    fn should_post_thought(&self) -> bool {
        self.rng.lock().r#gen::<f64>() < self.thought_probability
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn post_thought(&self, personality: &Personality, thought: &str) {
        if self.should_post_thought() {
            log::info!("[post] {}", render_thought(personality, thought));
        }
    }

    async fn post_trade(&self, personality: &Personality, trade: &TradeRecord) {
        log::info!("[post] {}", render_trade(personality, trade));
    }

    async fn post_death(&self, personality: &Personality, notice: &DeathNotice) {
        log::info!("[post] {}", render_death(personality, notice));
    }
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl NotificationSink for NullNotifier {
    async fn post_thought(&self, _personality: &Personality, _thought: &str) {}

    async fn post_trade(&self, _personality: &Personality, _trade: &TradeRecord) {}

    async fn post_death(&self, _personality: &Personality, _notice: &DeathNotice) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{Fill, builtin_personalities};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_post() {
        let anna = &builtin_personalities()[1];
        let fill = Fill {
            token_in: "SOL".to_string(),
            token_out: "BONK".to_string(),
            amount_in: dec!(0.25),
            amount_out: dec!(0.27),
            profit: dec!(0.02),
            fees: dec!(0.00075),
        };
        let trade = TradeRecord::from_fill(Action::Buy, &fill, Utc::now());

        let text = render_trade(anna, &trade);
        assert!(text.contains("Aggressive Anna just BUY'd 0.25 SOL → BONK"));
        assert!(text.contains("💰 P/L: +0.02 SOL"));
        assert!(text.ends_with("Aggressive momentum trading strategy"));
    }

    #[test]
    fn test_death_post_without_trades() {
        let carl = &builtin_personalities()[0];
        let notice = DeathNotice {
            reason: "insufficient funds to continue operations".to_string(),
            survival_time_ms: 3_723_000,
            total_trades: 0,
            successful_trades: 0,
            net_profit: dec!(0),
        };

        let text = render_death(carl, &notice);
        assert!(text.contains("Survived: 1h 2m 3s"));
        assert!(text.contains("Trades: 0 (0.0% success)"));
    }

    #[tokio::test]
    async fn test_thought_sampling_bounds() {
        let never = LogNotifier::new().with_thought_probability(0.0);
        let always = LogNotifier::new().with_thought_probability(2.0);

        assert!(!never.should_post_thought());
        assert!(always.should_post_thought());
    }
}
