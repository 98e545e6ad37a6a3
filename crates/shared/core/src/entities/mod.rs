mod decision;
mod lifecycle;
mod market;
mod personality;
mod trade;

pub use decision::{Action, Decision, DecisionContext, PerformanceSummary};
pub use lifecycle::{CostSnapshot, DeathCause, format_survival_time};
pub use market::{MarketSnapshot, Sentiment, TokenQuote};
pub use personality::{HoldingPeriod, Personality, Traits, TraitsError, builtin_personalities};
pub use trade::{ExecutionReport, ExecutionRequest, Fill, Position, TradeRecord};
