//! Arena Core Domain
//!
//! Pure domain types for the Arena agent survival simulation.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Decisions
    Action,
    // Lifecycle
    CostSnapshot,
    DeathCause,
    Decision,
    DecisionContext,
    // Execution
    ExecutionReport,
    ExecutionRequest,
    Fill,
    // Personalities
    HoldingPeriod,
    // Market
    MarketSnapshot,
    PerformanceSummary,
    Personality,
    Position,
    Sentiment,
    TokenQuote,
    TradeRecord,
    Traits,
    TraitsError,
    builtin_personalities,
    format_survival_time,
};
pub use values::{AgentId, Amount, Timestamp};
