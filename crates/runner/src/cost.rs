//! Cost Accountant - operating and decision costs of one agent
//!
//! Operating cost is derived from elapsed clock time on every read and is
//! never stored. Decision and trading costs accumulate as they are recorded.

use arena_core::{Amount, CostSnapshot, Timestamp};
use arena_ports::Clock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::CostConfig;

const MS_PER_HOUR: Decimal = dec!(3600000);

/// Detailed cost view, mostly for dashboards
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub operating_time_ms: i64,
    pub operating_hours: Decimal,
    pub decisions: u64,
    pub costs: CostSnapshot,
    pub minimum_viable_balance: Amount,
}

pub struct CostAccountant {
    clock: Arc<dyn Clock>,
    created_at: Timestamp,
    operating_cost_per_hour: Amount,
    decision_cost: Amount,
    fee_buffer: Amount,
    decisions: u64,
    ai_cost: Amount,
    trading_fees: Amount,
    /// Largest elapsed time observed, so a clock stepping back never lowers cost
    elapsed_peak_ms: AtomicI64,
}

impl CostAccountant {
    pub fn new(config: &CostConfig, clock: Arc<dyn Clock>) -> Self {
        let created_at = clock.now();
        Self {
            clock,
            created_at,
            operating_cost_per_hour: config.operating_cost_per_hour,
            decision_cost: config.decision_cost,
            fee_buffer: config.fee_buffer,
            decisions: 0,
            ai_cost: Decimal::ZERO,
            trading_fees: Decimal::ZERO,
            elapsed_peak_ms: AtomicI64::new(0),
        }
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn elapsed_ms(&self) -> i64 {
        let elapsed = (self.clock.now() - self.created_at).num_milliseconds().max(0);
        let previous = self.elapsed_peak_ms.fetch_max(elapsed, Ordering::AcqRel);
        previous.max(elapsed)
    }

    /// rate × elapsed hours since creation
    pub fn elapsed_operating_cost(&self) -> Amount {
        self.operating_cost_per_hour * Decimal::from(self.elapsed_ms()) / MS_PER_HOUR
    }

    pub fn decision_cost(&self) -> Amount {
        self.decision_cost
    }

    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    pub fn record_decision(&mut self) {
        self.decisions += 1;
        self.ai_cost += self.decision_cost;
    }

    /// Add a trading fee; negative fees are ignored
    pub fn record_trade_fee(&mut self, fee: Amount) {
        if fee < Decimal::ZERO {
            log::warn!("Ignoring negative trade fee {}", fee);
            return;
        }
        self.trading_fees += fee;
    }

    pub fn current_costs(&self) -> CostSnapshot {
        let operating = self.elapsed_operating_cost();
        CostSnapshot {
            operating,
            ai_calls: self.ai_cost,
            trading: self.trading_fees,
            total: operating + self.ai_cost + self.trading_fees,
        }
    }

    /// One hour of operation, one decision and the fee buffer
    pub fn minimum_viable_balance(&self) -> Amount {
        self.operating_cost_per_hour + self.decision_cost + self.fee_buffer
    }

    pub fn breakdown(&self) -> CostBreakdown {
        let operating_time_ms = self.elapsed_ms();
        CostBreakdown {
            operating_time_ms,
            operating_hours: (Decimal::from(operating_time_ms) / MS_PER_HOUR).round_dp(4),
            decisions: self.decisions,
            costs: self.current_costs(),
            minimum_viable_balance: self.minimum_viable_balance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_clock::WorldClock;
    use chrono::{Duration, TimeZone, Utc};

    fn accountant() -> (Arc<WorldClock>, CostAccountant) {
        let clock = WorldClock::fixed(Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        let accountant = CostAccountant::new(&CostConfig::default(), clock.clone());
        (clock, accountant)
    }

    #[test]
    fn test_fresh_accountant_costs_nothing() {
        let (_clock, accountant) = accountant();
        assert_eq!(accountant.current_costs(), CostSnapshot::default());
        assert_eq!(accountant.minimum_viable_balance(), dec!(0.0061));
    }

    #[test]
    fn test_operating_cost_follows_clock() {
        let (clock, accountant) = accountant();

        clock.advance(Duration::minutes(30));
        assert_eq!(accountant.elapsed_operating_cost(), dec!(0.0005));

        clock.advance(Duration::minutes(90));
        assert_eq!(accountant.elapsed_operating_cost(), dec!(0.002));
    }

    #[test]
    fn test_clock_going_back_never_lowers_cost() {
        let (clock, accountant) = accountant();
        let start = clock.now();

        clock.advance(Duration::hours(2));
        let before = accountant.elapsed_operating_cost();

        clock.set_time(start - Duration::hours(1));
        assert_eq!(accountant.elapsed_operating_cost(), before);
    }

    #[test]
    fn test_total_sums_components() {
        let (clock, mut accountant) = accountant();
        clock.advance(Duration::hours(1));

        accountant.record_decision();
        accountant.record_decision();
        accountant.record_trade_fee(dec!(0.001));
        accountant.record_trade_fee(dec!(-5));

        let costs = accountant.current_costs();
        assert_eq!(costs.operating, dec!(0.001));
        assert_eq!(costs.ai_calls, dec!(0.0002));
        assert_eq!(costs.trading, dec!(0.001));
        assert_eq!(costs.total, dec!(0.0022));
        assert_eq!(accountant.decisions(), 2);
    }

    #[test]
    fn test_breakdown() {
        let (clock, mut accountant) = accountant();
        clock.advance(Duration::minutes(90));
        accountant.record_decision();

        let breakdown = accountant.breakdown();
        assert_eq!(breakdown.operating_time_ms, 5_400_000);
        assert_eq!(breakdown.operating_hours, dec!(1.5));
        assert_eq!(breakdown.decisions, 1);
        assert_eq!(breakdown.costs.total, dec!(0.0016));
    }
}
