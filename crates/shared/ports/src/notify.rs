use arena_core::{Personality, TradeRecord};
use async_trait::async_trait;

/// Port for the social notification sink
///
/// Posting is best-effort: implementations swallow their own failures and
/// the engine never waits on them.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn post_thought(&self, personality: &Personality, thought: &str);

    async fn post_trade(&self, personality: &Personality, trade: &TradeRecord);

    async fn post_death(&self, personality: &Personality, report: &DeathNotice);
}

/// Summary handed to the sink when an agent dies
#[derive(Debug, Clone, PartialEq)]
pub struct DeathNotice {
    pub reason: String,
    pub survival_time_ms: i64,
    pub total_trades: u64,
    pub successful_trades: u64,
    pub net_profit: arena_core::Amount,
}
