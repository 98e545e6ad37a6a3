//! Decision oracles that need no language model
//!
//! `RuleBasedOracle` is the offline fallback: a weighted coin toss that
//! holds more often when money is short. `FallbackOracle` chains a primary
//! oracle (normally LLM-backed) to a secondary one.

use arena_core::{Decision, DecisionContext};
use arena_ports::{DecisionOracle, PortResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::to_amount;

const TOKENS: [&str; 4] = ["SOL", "USDC", "RAY", "BONK"];

/// Randomized BUY / SELL / HOLD picker
pub struct RuleBasedOracle {
    rng: Mutex<StdRng>,
}

impl RuleBasedOracle {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&self, context: &DecisionContext) -> Decision {
        let mut rng = self.rng.lock();

        let hold_probability = if context.balance < dec!(0.1) { 0.7 } else { 0.4 };
        let buy_threshold = hold_probability + (1.0 - hold_probability) / 2.0;

        let roll: f64 = rng.r#gen();
        let sentiment = context
            .market
            .as_ref()
            .map(|m| m.sentiment.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if roll < hold_probability {
            return Decision::hold(format!(
                "Market is {}, waiting for a clearer setup",
                sentiment
            ));
        }

        let balance = context.balance.to_f64().unwrap_or(0.0);
        let amount = to_amount(balance * 0.1 * rng.r#gen::<f64>());
        let token = TOKENS[rng.gen_range(1..TOKENS.len())];

        if roll < buy_threshold {
            Decision::buy(
                token,
                amount,
                format!("Market is {}, taking a small {} position", sentiment, token),
            )
        } else {
            Decision::sell(
                token,
                amount,
                format!("Market is {}, trimming {} exposure", sentiment, token),
            )
        }
    }
}

impl Default for RuleBasedOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionOracle for RuleBasedOracle {
    fn name(&self) -> &str {
        "RuleBasedOracle"
    }

    async fn decide(&self, _system_prompt: &str, context: &DecisionContext) -> PortResult<Decision> {
        Ok(self.pick(context))
    }
}

/// Ask the primary oracle, fall back to the secondary on any error
pub struct FallbackOracle {
    primary: Arc<dyn DecisionOracle>,
    fallback: Arc<dyn DecisionOracle>,
}

impl FallbackOracle {
    pub fn new(primary: Arc<dyn DecisionOracle>, fallback: Arc<dyn DecisionOracle>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl DecisionOracle for FallbackOracle {
    fn name(&self) -> &str {
        "FallbackOracle"
    }

    async fn decide(&self, system_prompt: &str, context: &DecisionContext) -> PortResult<Decision> {
        match self.primary.decide(system_prompt, context).await {
            Ok(decision) => Ok(decision),
            Err(e) => {
                log::warn!(
                    "{} failed ({}), falling back to {}",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                self.fallback.decide(system_prompt, context).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedOracle;
    use arena_core::{Action, CostSnapshot, PerformanceSummary, builtin_personalities};
    use arena_ports::PortError;
    use rust_decimal::Decimal;

    fn context(balance: Decimal) -> DecisionContext {
        DecisionContext {
            balance,
            costs: CostSnapshot::default(),
            positions: vec![],
            recent_trades: vec![],
            market: None,
            traits: builtin_personalities()[1].traits.clone(),
            survival_time_ms: 0,
            performance: PerformanceSummary {
                total_trades: 0,
                success_rate: 0.0,
                net_profit: Decimal::ZERO,
            },
        }
    }

    #[tokio::test]
    async fn test_amount_bounded_by_tenth_of_balance() {
        let oracle = RuleBasedOracle::with_seed(1);

        for _ in 0..100 {
            let decision = oracle.decide("", &context(dec!(2))).await.unwrap();
            match decision.action {
                Action::Hold => assert_eq!(decision.amount, Decimal::ZERO),
                _ => {
                    assert!(decision.amount >= Decimal::ZERO);
                    assert!(decision.amount <= dec!(0.2));
                    assert_ne!(decision.token_out, decision.token_in);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_holds_more_when_poor() {
        let poor = RuleBasedOracle::with_seed(5);
        let rich = RuleBasedOracle::with_seed(5);
        let mut poor_holds = 0;
        let mut rich_holds = 0;

        for _ in 0..500 {
            if poor.decide("", &context(dec!(0.05))).await.unwrap().action.is_hold() {
                poor_holds += 1;
            }
            if rich.decide("", &context(dec!(5))).await.unwrap().action.is_hold() {
                rich_holds += 1;
            }
        }

        assert!(poor_holds > rich_holds);
    }

    #[tokio::test]
    async fn test_fallback_on_primary_error() {
        let primary = Arc::new(ScriptedOracle::new());
        primary.push_error(PortError::Unavailable("llm down".to_string()));
        let fallback = Arc::new(ScriptedOracle::new());
        fallback.push_decision(Decision::buy("RAY", dec!(0.1), "fallback"));

        let oracle = FallbackOracle::new(primary.clone(), fallback.clone());
        let decision = oracle.decide("", &context(dec!(1))).await.unwrap();

        assert_eq!(decision.reasoning, "fallback");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Arc::new(ScriptedOracle::new());
        primary.push_decision(Decision::hold("primary"));
        let fallback = Arc::new(ScriptedOracle::new());

        let oracle = FallbackOracle::new(primary, fallback.clone());
        assert_eq!(
            oracle.decide("", &context(dec!(1))).await.unwrap().reasoning,
            "primary"
        );
        assert_eq!(fallback.calls(), 0);
    }
}
