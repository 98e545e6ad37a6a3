//! Agent events and the bus that carries them
//!
//! Every agent publishes into one shared `EventBus`; the orchestrator hands
//! out receivers. Wire shape: `{"type": "update" | "trade" | "death", "data": {...}}`.

use arena_core::{AgentId, Amount, DeathCause, Decision, TradeRecord};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::agent::AgentStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AgentEvent {
    Update(UpdateEvent),
    Trade(TradeEvent),
    Death(DeathReport),
}

impl AgentEvent {
    pub fn agent_id(&self) -> &AgentId {
        match self {
            AgentEvent::Update(UpdateEvent::Status(u)) => &u.agent_id,
            AgentEvent::Update(UpdateEvent::Thought(u)) => &u.agent_id,
            AgentEvent::Trade(t) => &t.agent_id,
            AgentEvent::Death(d) => &d.agent_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::Update(_) => "update",
            AgentEvent::Trade(_) => "trade",
            AgentEvent::Death(_) => "death",
        }
    }
}

/// `update` payload: either a full status or a thought
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UpdateEvent {
    Status(StatusUpdate),
    Thought(ThoughtUpdate),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub agent_id: AgentId,
    pub status: Box<AgentStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtUpdate {
    pub agent_id: AgentId,
    pub thought: String,
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub agent_id: AgentId,
    pub trade: TradeRecord,
}

/// Final snapshot published once when an agent dies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathReport {
    pub agent_id: AgentId,
    pub name: String,
    /// Human-readable cause
    pub reason: String,
    pub cause: DeathCause,
    /// Formatted, e.g. `3h 12m 5s`
    pub survival_time: String,
    pub survival_time_ms: i64,
    pub final_balance: Amount,
    pub stats: DeathStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathStats {
    pub total_trades: u64,
    pub successful_trades: u64,
    pub failed_trades: u64,
    pub net_profit: Amount,
    pub success_rate: f64,
}

/// In-process fan-out of agent events
///
/// Slow subscribers may lag and miss events; publishing never blocks.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AgentEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: AgentEvent) {
        let kind = event.kind();
        if self.tx.send(event).is_err() {
            log::trace!("No event subscribers for {} event", kind);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
