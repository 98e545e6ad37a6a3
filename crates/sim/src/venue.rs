//! Simulated Venue - randomized swap outcomes
//!
//! Every non-HOLD decision is filled at a size capped to a fraction of the
//! agent's balance. The outcome is a win or a loss drawn from configured
//! bounds, less slippage and fees. When a ledger is attached, the profit
//! (or loss) is settled into the agent's wallet address.

use arena_core::{Amount, ExecutionReport, ExecutionRequest, Fill};
use arena_ports::{ExecutionVenue, PortResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::time::Duration;

use crate::ledger::PaperLedger;
use crate::to_amount;

/// Outcome distribution of the simulated venue
#[derive(Debug, Clone)]
pub struct VenueConfig {
    /// Max share of the current balance a single trade may use
    pub max_trade_fraction: f64,
    pub fee_rate: f64,
    /// Slippage is drawn from [0, max_slippage)
    pub max_slippage: f64,
    pub win_probability: f64,
    /// Price move on a win is drawn from [0, max_gain)
    pub max_gain: f64,
    /// Price move on a loss is drawn from [0, max_loss)
    pub max_loss: f64,
    /// Artificial settlement delay
    pub latency: Duration,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            max_trade_fraction: 0.3,
            fee_rate: 0.003,
            max_slippage: 0.02,
            win_probability: 0.6,
            max_gain: 0.10,
            max_loss: 0.08,
            latency: Duration::ZERO,
        }
    }
}

pub struct SimulatedVenue {
    config: VenueConfig,
    ledger: Option<PaperLedger>,
    rng: Mutex<StdRng>,
}

impl SimulatedVenue {
    pub fn new(config: VenueConfig) -> Self {
        Self {
            config,
            ledger: None,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(config: VenueConfig, seed: u64) -> Self {
        Self {
            config,
            ledger: None,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Settle fills into this ledger
    pub fn settling_into(mut self, ledger: PaperLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    fn trade_size(&self, request: &ExecutionRequest) -> Amount {
        let cap = to_amount(
            request.current_balance.to_f64().unwrap_or(0.0) * self.config.max_trade_fraction,
        );
        request.decision.amount.min(cap)
    }

    fn simulate(&self, request: &ExecutionRequest, amount_in: Amount) -> Fill {
        let (price_change, slippage) = {
            let mut rng = self.rng.lock();
            let slippage = rng.r#gen::<f64>() * self.config.max_slippage;
            let won = rng.r#gen::<f64>() < self.config.win_probability;
            let price_change = if won {
                rng.r#gen::<f64>() * self.config.max_gain
            } else {
                -(rng.r#gen::<f64>() * self.config.max_loss)
            };
            (price_change, slippage)
        };

        let size = amount_in.to_f64().unwrap_or(0.0);
        let amount_out = to_amount(size * (1.0 + price_change - slippage - self.config.fee_rate));
        let fees = to_amount(size * self.config.fee_rate);

        let decision = &request.decision;
        Fill {
            token_in: non_empty(&decision.token_in, "SOL"),
            token_out: non_empty(&decision.token_out, "USDC"),
            amount_in,
            amount_out,
            profit: amount_out - amount_in,
            fees,
        }
    }
}

fn non_empty(token: &str, default: &str) -> String {
    if token.is_empty() {
        default.to_string()
    } else {
        token.to_string()
    }
}

#[async_trait]
impl ExecutionVenue for SimulatedVenue {
    fn name(&self) -> &str {
        "SimulatedVenue"
    }

    async fn execute(&self, request: &ExecutionRequest) -> PortResult<ExecutionReport> {
        if request.decision.action.is_hold() {
            return Ok(ExecutionReport::Held);
        }

        let amount_in = self.trade_size(request);
        if amount_in <= Decimal::ZERO {
            return Ok(ExecutionReport::Rejected {
                reason: format!(
                    "trade size {} (requested {}, balance {})",
                    amount_in, request.decision.amount, request.current_balance
                ),
            });
        }

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        let fill = self.simulate(request, amount_in);

        if let (Some(ledger), Some(address)) = (&self.ledger, &request.wallet_address) {
            ledger.credit(address, fill.profit)?;
        }

        log::debug!(
            "[{}] {} {} {} -> {} {} (profit {})",
            request.agent_id,
            request.decision.action,
            fill.amount_in,
            fill.token_in,
            fill.amount_out,
            fill.token_out,
            fill.profit
        );

        Ok(ExecutionReport::Filled(fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{AgentId, Decision};
    use arena_ports::Wallet;
    use rust_decimal_macros::dec;

    fn request(decision: Decision, balance: Amount, address: Option<String>) -> ExecutionRequest {
        ExecutionRequest {
            agent_id: AgentId::new("tester"),
            wallet_address: address,
            decision,
            current_balance: balance,
        }
    }

    #[tokio::test]
    async fn test_hold_is_not_settled() {
        let venue = SimulatedVenue::with_seed(VenueConfig::default(), 1);
        let report = venue
            .execute(&request(Decision::hold("wait"), dec!(1), None))
            .await
            .unwrap();
        assert_eq!(report, ExecutionReport::Held);
    }

    #[tokio::test]
    async fn test_size_capped_at_balance_fraction() {
        let venue = SimulatedVenue::with_seed(VenueConfig::default(), 2);
        let report = venue
            .execute(&request(Decision::buy("RAY", dec!(5), "all in"), dec!(1), None))
            .await
            .unwrap();

        match report {
            ExecutionReport::Filled(fill) => {
                assert_eq!(fill.amount_in, dec!(0.3));
                assert_eq!(fill.profit, fill.amount_out - fill.amount_in);
                assert_eq!(fill.fees, dec!(0.0009));
                assert_eq!(fill.token_in, "SOL");
                assert_eq!(fill.token_out, "RAY");
            }
            other => panic!("expected fill, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_outcome_within_bounds() {
        let venue = SimulatedVenue::with_seed(VenueConfig::default(), 3);

        for _ in 0..200 {
            let report = venue
                .execute(&request(Decision::sell("BONK", dec!(0.1), "x"), dec!(10), None))
                .await
                .unwrap();
            let ExecutionReport::Filled(fill) = report else {
                panic!("expected fill");
            };
            // +10% gain at best, -8% loss - 2% slippage - 0.3% fee at worst
            assert!(fill.profit <= dec!(0.01));
            assert!(fill.profit >= dec!(-0.0103));
        }
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let venue = SimulatedVenue::with_seed(VenueConfig::default(), 4);
        let report = venue
            .execute(&request(Decision::buy("RAY", dec!(0), "nothing"), dec!(1), None))
            .await
            .unwrap();
        assert!(matches!(report, ExecutionReport::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_fill_settles_into_ledger() {
        let ledger = PaperLedger::new(dec!(1));
        let wallet = ledger.open_wallet("tester");
        let address = wallet.address().await.unwrap();
        let venue =
            SimulatedVenue::with_seed(VenueConfig::default(), 5).settling_into(ledger.clone());

        let report = venue
            .execute(&request(
                Decision::buy("RAY", dec!(0.1), "x"),
                dec!(1),
                Some(address.clone()),
            ))
            .await
            .unwrap();

        let ExecutionReport::Filled(fill) = report else {
            panic!("expected fill");
        };
        assert_eq!(ledger.balance_of(&address), Some(dec!(1) + fill.profit));
    }
}
