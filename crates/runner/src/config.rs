//! Arena configuration
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid config
//! that runs the three built-in personalities on paper wallets.
//!
//! ```json
//! {
//!   "status_interval_ms": 30000,
//!   "decision_interval_ms": 120000,
//!   "costs": { "operating_cost_per_hour": "0.001", "decision_cost": "0.0001" },
//!   "agents": [ { "personality": "balanced-bob", "wallet_id": "bob-1" } ]
//! }
//! ```

use arena_core::{Amount, Personality, TraitsError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `costs.operating_cost_per_hour`
pub const ENV_OPERATING_COST: &str = "AGENT_OPERATION_COST_PER_HOUR";
/// Environment variable overriding `costs.decision_cost`
pub const ENV_DECISION_COST: &str = "AI_API_COST_PER_DECISION";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Invalid personality {id}: {source}")]
    Personality {
        id: String,
        #[source]
        source: TraitsError,
    },
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Period of the survival/status schedule
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,

    /// Period of the decision schedule
    #[serde(default = "default_decision_interval_ms")]
    pub decision_interval_ms: u64,

    /// Upper bound on any single collaborator call
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Capacity of the event broadcast channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Trades kept in status reports and decision contexts
    #[serde(default = "default_recent_trades_window")]
    pub recent_trades_window: usize,

    /// Seed for the decision gate (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Balance given to paper wallets when they are first opened
    #[serde(default = "default_paper_funding")]
    pub paper_funding: Amount,

    #[serde(default)]
    pub costs: CostConfig,

    /// Extra personalities, or replacements for built-ins with the same id
    #[serde(default)]
    pub personalities: Vec<Personality>,

    /// Roster admitted on start; empty means one agent per built-in
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
}

fn default_status_interval_ms() -> u64 {
    30_000
}

fn default_decision_interval_ms() -> u64 {
    120_000
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

fn default_event_capacity() -> usize {
    1024
}

fn default_recent_trades_window() -> usize {
    5
}

fn default_paper_funding() -> Amount {
    dec!(1)
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: default_status_interval_ms(),
            decision_interval_ms: default_decision_interval_ms(),
            call_timeout_ms: default_call_timeout_ms(),
            event_capacity: default_event_capacity(),
            recent_trades_window: default_recent_trades_window(),
            seed: None,
            paper_funding: default_paper_funding(),
            costs: CostConfig::default(),
            personalities: Vec::new(),
            agents: Vec::new(),
        }
    }
}

impl ArenaConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply cost overrides from the environment
    ///
    /// `lookup` is normally `|key| std::env::var(key).ok()`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_OPERATING_COST) {
            self.costs.operating_cost_per_hour = parse_amount(ENV_OPERATING_COST, &value)?;
        }
        if let Some(value) = lookup(ENV_DECISION_COST) {
            self.costs.decision_cost = parse_amount(ENV_DECISION_COST, &value)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.status_interval_ms == 0 || self.decision_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "schedule intervals must be positive".to_string(),
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid("call_timeout_ms must be positive".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be positive".to_string()));
        }
        if self.paper_funding < Decimal::ZERO {
            return Err(ConfigError::Invalid("paper_funding must not be negative".to_string()));
        }
        self.costs.validate()?;

        for personality in &self.personalities {
            personality
                .validate()
                .map_err(|source| ConfigError::Personality {
                    id: personality.id.clone(),
                    source,
                })?;
        }

        for spec in &self.agents {
            if spec.personality.is_empty() || spec.wallet_id.is_empty() {
                return Err(ConfigError::Invalid(
                    "agents need both a personality and a wallet_id".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn decision_interval(&self) -> Duration {
        Duration::from_millis(self.decision_interval_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

fn parse_amount(key: &str, value: &str) -> Result<Amount, ConfigError> {
    Decimal::from_str(value.trim())
        .map_err(|e| ConfigError::Invalid(format!("{}={:?}: {}", key, value, e)))
}

/// Per-agent cost parameters, read once when a cost accountant is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    #[serde(default = "default_operating_cost_per_hour")]
    pub operating_cost_per_hour: Amount,

    #[serde(default = "default_decision_cost")]
    pub decision_cost: Amount,

    /// Transaction-fee buffer added to the minimum viable balance
    #[serde(default = "default_fee_buffer")]
    pub fee_buffer: Amount,
}

fn default_operating_cost_per_hour() -> Amount {
    dec!(0.001)
}

fn default_decision_cost() -> Amount {
    dec!(0.0001)
}

fn default_fee_buffer() -> Amount {
    dec!(0.005)
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            operating_cost_per_hour: default_operating_cost_per_hour(),
            decision_cost: default_decision_cost(),
            fee_buffer: default_fee_buffer(),
        }
    }
}

impl CostConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("operating_cost_per_hour", self.operating_cost_per_hour),
            ("decision_cost", self.decision_cost),
            ("fee_buffer", self.fee_buffer),
        ];
        for (name, value) in fields {
            if value < Decimal::ZERO {
                return Err(ConfigError::Invalid(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Personality id (built-in or configured)
    pub personality: String,

    pub wallet_id: String,

    /// Registry id; defaults to the personality id
    #[serde(default)]
    pub agent_id: Option<String>,
}
