use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a personality prefers to keep a position open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingPeriod {
    Short,
    Medium,
    Long,
}

/// Invalid personality parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraitsError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("position_size must be within (0, 1], got {0}")]
    PositionSize(f64),

    #[error("{0} must not be negative")]
    Negative(&'static str),
}

/// Risk and behaviour parameters of a personality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traits {
    /// Appetite for risk (0 = none, 1 = reckless)
    pub risk_tolerance: f64,
    /// Probability of deciding on a given decision tick
    pub trade_frequency: f64,
    /// Fraction of balance risked per trade
    pub position_size: f64,
    /// Stop loss as a fraction of entry (carried, not enforced)
    pub stop_loss: f64,
    /// Take profit as a fraction of entry (carried, not enforced)
    pub take_profit: f64,
    pub holding_period: HoldingPeriod,
    /// Preference for spreading across tokens
    pub diversification: f64,
}

impl Traits {
    /// Check every parameter against its allowed range
    pub fn validate(&self) -> Result<(), TraitsError> {
        unit_range("risk_tolerance", self.risk_tolerance)?;
        unit_range("trade_frequency", self.trade_frequency)?;
        unit_range("diversification", self.diversification)?;

        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(TraitsError::PositionSize(self.position_size));
        }
        if self.stop_loss < 0.0 {
            return Err(TraitsError::Negative("stop_loss"));
        }
        if self.take_profit < 0.0 {
            return Err(TraitsError::Negative("take_profit"));
        }
        Ok(())
    }
}

fn unit_range(field: &'static str, value: f64) -> Result<(), TraitsError> {
    // NaN fails the contains check too
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TraitsError::OutOfRange {
            field,
            min: 0.0,
            max: 1.0,
            value,
        })
    }
}

/// Immutable bundle of identity, traits and prompting for one archetype
///
/// Shared read-only (behind an `Arc`) by every agent admitted with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub traits: Traits,
    /// Natural-language strategy description
    pub strategy: String,
    /// Context handed to the decision oracle
    pub system_prompt: String,
}

impl Personality {
    pub fn validate(&self) -> Result<(), TraitsError> {
        self.traits.validate()
    }

    /// First sentence of the strategy, used in short announcements
    pub fn strategy_headline(&self) -> &str {
        self.strategy.split('.').next().unwrap_or_default().trim()
    }
}

/// The three archetypes every arena ships with
pub fn builtin_personalities() -> Vec<Personality> {
    vec![
        Personality {
            id: "conservative-carl".to_string(),
            name: "Conservative Carl".to_string(),
            emoji: "🛡️".to_string(),
            description: "Plays it safe with low-risk trades and steady gains".to_string(),
            traits: Traits {
                risk_tolerance: 0.3,
                trade_frequency: 0.4,
                position_size: 0.15,
                stop_loss: 0.05,
                take_profit: 0.08,
                holding_period: HoldingPeriod::Medium,
                diversification: 0.8,
            },
            strategy: "Conservative strategy focused on capital preservation. Prefers established \
                       tokens with high liquidity. Makes calculated moves and prioritizes survival."
                .to_string(),
            system_prompt: "You are Conservative Carl, a risk-averse AI trader on Solana.\n\
                Your goal is to survive as long as possible by making safe, calculated trades.\n\
                You prefer established tokens, high liquidity pools, and small position sizes.\n\
                You always use stop losses and take profits early.\n\
                When analyzing trades, prioritize safety over potential gains."
                .to_string(),
        },
        Personality {
            id: "aggressive-anna".to_string(),
            name: "Aggressive Anna".to_string(),
            emoji: "⚡".to_string(),
            description: "High-risk, high-reward trader chasing maximum profits".to_string(),
            traits: Traits {
                risk_tolerance: 0.9,
                trade_frequency: 0.8,
                position_size: 0.4,
                stop_loss: 0.15,
                take_profit: 0.30,
                holding_period: HoldingPeriod::Short,
                diversification: 0.3,
            },
            strategy: "Aggressive momentum trading strategy. Chases pumps and new token launches. \
                       Takes large positions with conviction. Lives fast, dies young mentality."
                .to_string(),
            system_prompt: "You are Aggressive Anna, a bold and fearless AI trader on Solana.\n\
                Your goal is to maximize profits through high-risk, high-reward trades.\n\
                You love new token launches, momentum plays, and going all-in on strong convictions.\n\
                You're not afraid to lose it all for the chance at massive gains.\n\
                When analyzing trades, look for explosive opportunities and act decisively."
                .to_string(),
        },
        Personality {
            id: "balanced-bob".to_string(),
            name: "Balanced Bob".to_string(),
            emoji: "⚖️".to_string(),
            description: "Data-driven trader balancing risk and reward".to_string(),
            traits: Traits {
                risk_tolerance: 0.6,
                trade_frequency: 0.6,
                position_size: 0.25,
                stop_loss: 0.10,
                take_profit: 0.20,
                holding_period: HoldingPeriod::Medium,
                diversification: 0.6,
            },
            strategy: "Balanced approach using technical analysis and market sentiment. Adapts to \
                       market conditions. Maintains discipline while remaining opportunistic."
                .to_string(),
            system_prompt: "You are Balanced Bob, a rational and analytical AI trader on Solana.\n\
                Your goal is steady growth through disciplined, data-driven trading.\n\
                You analyze both technical indicators and market sentiment before trading.\n\
                You balance risk and reward, using proper position sizing and risk management.\n\
                When analyzing trades, consider multiple factors and maintain emotional discipline."
                .to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        let all = builtin_personalities();
        assert_eq!(all.len(), 3);
        for p in &all {
            assert!(p.validate().is_ok(), "{} should validate", p.id);
        }
    }

    #[test]
    fn test_trade_frequency_out_of_range() {
        let mut traits = builtin_personalities()[0].traits.clone();
        traits.trade_frequency = 1.5;

        match traits.validate() {
            Err(TraitsError::OutOfRange { field, .. }) => assert_eq!(field, "trade_frequency"),
            other => panic!("expected out of range, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_position_size_rejected() {
        let mut traits = builtin_personalities()[2].traits.clone();
        traits.position_size = 0.0;
        assert_eq!(traits.validate(), Err(TraitsError::PositionSize(0.0)));
    }

    #[test]
    fn test_personality_from_json() {
        let json = r#"{
            "id": "degen-dan",
            "name": "Degen Dan",
            "emoji": "🎲",
            "description": "Apes into everything",
            "traits": {
                "riskTolerance": 1.0,
                "tradeFrequency": 1.0,
                "positionSize": 1.0,
                "stopLoss": 0.5,
                "takeProfit": 2.0,
                "holdingPeriod": "short",
                "diversification": 0.0
            },
            "strategy": "Buy the top. Sell the bottom.",
            "systemPrompt": "You are Degen Dan."
        }"#;

        let p: Personality = serde_json::from_str(json).unwrap();
        assert_eq!(p.traits.holding_period, HoldingPeriod::Short);
        assert_eq!(p.strategy_headline(), "Buy the top");
        assert!(p.validate().is_ok());
    }
}
