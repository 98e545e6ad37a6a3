use arena_core::AgentId;
use arena_ports::PortError;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures surfaced by the orchestrator's public API
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Agent {0} is dead")]
    AgentDead(AgentId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Agent {0} is already registered")]
    DuplicateAgent(AgentId),

    #[error("Wallet unavailable for agent {agent_id}: {source}")]
    WalletUnavailable {
        agent_id: AgentId,
        #[source]
        source: PortError,
    },

    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    #[error("No agents could be admitted")]
    NoAgents,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
