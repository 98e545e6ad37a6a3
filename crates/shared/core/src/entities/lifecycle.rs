use crate::values::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an agent died
///
/// Classification is by variant; the display text is for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Could not pay for the next decision
    InsufficientFundsForDecision,
    /// Balance fell below accrued costs or the minimum viable balance
    InsufficientFundsToOperate,
    /// Killed explicitly by an operator
    Terminated(String),
}

impl DeathCause {
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(
            self,
            DeathCause::InsufficientFundsForDecision | DeathCause::InsufficientFundsToOperate
        )
    }
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathCause::InsufficientFundsForDecision => {
                f.write_str("insufficient funds for decision making")
            }
            DeathCause::InsufficientFundsToOperate => {
                f.write_str("insufficient funds to continue operations")
            }
            DeathCause::Terminated(reason) => write!(f, "terminated: {}", reason),
        }
    }
}

/// Costs accrued by an agent so far
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSnapshot {
    pub operating: Amount,
    pub ai_calls: Amount,
    pub trading: Amount,
    /// operating + ai_calls + trading
    pub total: Amount,
}

/// Render a survival duration the way the dashboard shows it
///
/// `2d 3h 4m`, `3h 4m 5s`, `4m 5s` or `5s`. Negative input renders as `0s`.
pub fn format_survival_time(ms: i64) -> String {
    let seconds = ms.max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h {}m", days, hours % 24, minutes % 60)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
