//! Arena Runner - agent survival simulation
//!
//! Runs a population of trading agents that pay to exist and die once their
//! balance no longer covers their costs:
//!
//! - **Cost**: per-agent operating and decision cost accounting
//! - **Agent**: the alive / thinking / dead state machine
//! - **Orchestrator**: agent registry and the status and decision schedules
//! - **Events**: update / trade / death events fanned out to subscribers
//! - **Bootstrap**: personalities and the starting roster
//!
//! ## Architecture
//!
//! ```text
//!                     ┌─────────────────────────────┐
//!                     │        Orchestrator         │
//!                     │  status tick   decision tick│
//!                     └──────┬──────────────┬───────┘
//!                            │              │ gate (trade_frequency)
//!                            ▼              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            AGENTS                               │
//! │                                                                 │
//! │   check_survival()        think() ──► execute_trade()           │
//! │         │                    │               │                  │
//! │         ▼                    ▼               ▼                  │
//! │      Wallet            DecisionOracle   ExecutionVenue          │
//! │                                                                 │
//! │   CostAccountant (operating + decision + trading costs)         │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │ update / trade / death
//!                                 ▼
//!                     ┌───────────────────────┐
//!                     │       EventBus        │──► subscribers
//!                     └───────────────────────┘
//! ```

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod cost;
pub mod error;
pub mod events;
pub mod gate;
pub mod orchestrator;

// Re-export main types
pub use agent::{ADDRESS_PLACEHOLDER, Agent, AgentPorts, AgentSettings, AgentStatus, CycleOutcome};
pub use bootstrap::{Collaborators, PersonalityBook, roster};
pub use config::{AgentSpec, ArenaConfig, ConfigError, CostConfig};
pub use cost::{CostAccountant, CostBreakdown};
pub use error::{ArenaError, Result};
pub use events::{
    AgentEvent, DeathReport, DeathStats, EventBus, StatusUpdate, ThoughtUpdate, TradeEvent,
    UpdateEvent,
};
pub use gate::{DecisionGate, ScriptedGate, SeededGate};
pub use orchestrator::{DonationReceipt, Orchestrator};
