//! Arena Ports
//!
//! Port definitions (traits) for the Arena simulation.
//! These define the boundaries between the agent lifecycle engine and the
//! collaborators it consumes: wallets, decision oracles, execution venues,
//! market feeds and notification sinks.

mod clock;
mod error;
mod market;
mod notify;
mod oracle;
mod venue;
mod wallet;

pub use clock::Clock;
pub use error::{PortError, PortResult, bounded};
pub use market::MarketFeed;
pub use notify::{DeathNotice, NotificationSink};
pub use oracle::DecisionOracle;
pub use venue::ExecutionVenue;
pub use wallet::{TransferReceipt, Wallet, WalletProvider};
