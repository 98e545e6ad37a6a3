use crate::entities::{CostSnapshot, MarketSnapshot, Position, TradeRecord, Traits};
use crate::values::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading action chosen by a decision oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// HOLD is the no-op action: nothing is sent to the venue
    pub fn is_hold(&self) -> bool {
        matches!(self, Action::Hold)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => f.write_str("BUY"),
            Action::Sell => f.write_str("SELL"),
            Action::Hold => f.write_str("HOLD"),
        }
    }
}

/// Output of one decision-oracle consultation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub action: Action,
    #[serde(default)]
    pub token_in: String,
    #[serde(default)]
    pub token_out: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub reasoning: String,
}

impl Decision {
    pub fn hold(reasoning: impl Into<String>) -> Self {
        Self {
            action: Action::Hold,
            token_in: String::new(),
            token_out: String::new(),
            amount: Decimal::ZERO,
            reasoning: reasoning.into(),
        }
    }

    pub fn buy(token_out: impl Into<String>, amount: Amount, reasoning: impl Into<String>) -> Self {
        Self {
            action: Action::Buy,
            token_in: "SOL".to_string(),
            token_out: token_out.into(),
            amount,
            reasoning: reasoning.into(),
        }
    }

    pub fn sell(token_in: impl Into<String>, amount: Amount, reasoning: impl Into<String>) -> Self {
        Self {
            action: Action::Sell,
            token_in: token_in.into(),
            token_out: "SOL".to_string(),
            amount,
            reasoning: reasoning.into(),
        }
    }
}

/// Aggregate performance figures shown to the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_trades: u64,
    /// successful / total, 0 when no trades
    pub success_rate: f64,
    pub net_profit: Amount,
}

/// Snapshot of everything an oracle may consider for one decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionContext {
    pub balance: Amount,
    pub costs: CostSnapshot,
    pub positions: Vec<Position>,
    pub recent_trades: Vec<TradeRecord>,
    /// None when the market feed could not be reached
    pub market: Option<MarketSnapshot>,
    pub traits: Traits,
    pub survival_time_ms: i64,
    pub performance: PerformanceSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_action_wire_format() {
        assert_eq!(serde_json::to_string(&Action::Buy).unwrap(), "\"BUY\"");
        let action: Action = serde_json::from_str("\"HOLD\"").unwrap();
        assert!(action.is_hold());
        assert!(serde_json::from_str::<Action>("\"YOLO\"").is_err());
    }

    #[test]
    fn test_decision_defaults_missing_fields() {
        let decision: Decision = serde_json::from_str(r#"{"action":"HOLD"}"#).unwrap();
        assert_eq!(decision, Decision::hold(""));
    }

    #[test]
    fn test_buy_spends_sol() {
        let decision = Decision::buy("RAY", dec!(0.1), "momentum");
        assert_eq!(decision.token_in, "SOL");
        assert_eq!(decision.token_out, "RAY");
        assert_eq!(decision.action.to_string(), "BUY");
    }
}
