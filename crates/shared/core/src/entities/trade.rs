use crate::entities::{Action, Decision};
use crate::values::{AgentId, Amount, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the venue reports back for a settled (non-HOLD) decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Amount,
    pub amount_out: Amount,
    /// Net result of the trade, fees included (negative = loss)
    pub profit: Amount,
    pub fees: Amount,
}

impl Fill {
    pub fn is_profitable(&self) -> bool {
        self.profit > Decimal::ZERO
    }
}

/// Outcome of handing a decision to an execution venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ExecutionReport {
    /// Trade settled
    Filled(Fill),
    /// HOLD decision, nothing settled
    Held,
    /// Venue refused or failed the trade
    Rejected { reason: String },
}

/// Everything a venue needs to settle one decision
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub agent_id: AgentId,
    /// Settlement account; None when the wallet never reported one
    pub wallet_address: Option<String>,
    pub decision: Decision,
    pub current_balance: Amount,
}

/// Completed trade as kept in an agent's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: String,
    pub timestamp: Timestamp,
    pub action: Action,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub profit: Amount,
    pub fees: Amount,
}

impl TradeRecord {
    pub fn from_fill(action: Action, fill: &Fill, timestamp: Timestamp) -> Self {
        Self {
            id: format!("trade-{}", Uuid::new_v4()),
            timestamp,
            action,
            token_in: fill.token_in.clone(),
            token_out: fill.token_out.clone(),
            amount_in: fill.amount_in,
            amount_out: fill.amount_out,
            profit: fill.profit,
            fees: fill.fees,
        }
    }
}

/// Open holding in a token, informational only
///
/// Stop-loss and take-profit levels from the personality are not applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub token: String,
    pub amount: Amount,
    /// Native currency spent to open the position
    pub cost_basis: Amount,
    pub opened_at: Timestamp,
}
