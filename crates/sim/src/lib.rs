//! Arena Simulated Collaborators
//!
//! Implementations of the Arena ports for paper trading, plus scripted
//! doubles for deterministic tests:
//!
//! - **Ledger**: in-memory balances and paper wallets
//! - **Oracles**: seeded rule-based decisions, primary/fallback chaining,
//!   and parsing of language-model responses
//! - **Venue**: randomized fills settled into the ledger
//! - **Market feed**: random-walk token quotes with a sentiment label
//! - **Notifier**: social posts rendered to the log
//!
//! ## Architecture
//!
//! ```text
//!   RuleBasedOracle ──┐
//!                     ├──► FallbackOracle ──► Agent ──► SimulatedVenue
//!   (LLM oracle) ─────┘                         │             │
//!                                               │ balance     │ settle
//!                                               ▼             ▼
//!                                          PaperWallet ◄── PaperLedger
//! ```

pub mod ledger;
pub mod llm;
pub mod market_feed;
pub mod notifier;
pub mod oracle;
pub mod scripted;
pub mod venue;

// Re-export main types
pub use ledger::{PaperLedger, PaperWallet, WalletFault};
pub use llm::{parse_decision, render_user_prompt};
pub use market_feed::{MarketFeedConfig, SimulatedMarketFeed};
pub use notifier::{LogNotifier, NullNotifier};
pub use oracle::{FallbackOracle, RuleBasedOracle};
pub use scripted::{ScriptedOracle, ScriptedVenue};
pub use venue::{SimulatedVenue, VenueConfig};

use rust_decimal::Decimal;

/// Convert a sampled float to a native amount (9 decimal places, like lamports)
pub(crate) fn to_amount(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(9)
}
