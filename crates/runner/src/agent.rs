//! Agent - one trading participant and its survival state machine
//!
//! ```text
//!   ALIVE_IDLE ──think()──► ALIVE_THINKING ──► ALIVE_IDLE
//!        │                        │
//!        └──────── die() ─────────┴──────────► DEAD (terminal)
//! ```
//!
//! An agent is shared as `Arc<Agent>`. Its mutable state sits behind a
//! short-lived lock that is never held across a collaborator call, and a
//! separate `thinking` flag keeps decision cycles from overlapping.

use arena_core::{
    Action, AgentId, Amount, CostSnapshot, DeathCause, Decision, DecisionContext,
    ExecutionReport, ExecutionRequest, Fill, MarketSnapshot, PerformanceSummary, Personality,
    Position, Timestamp, TradeRecord, format_survival_time,
};
use arena_ports::{
    Clock, DeathNotice, DecisionOracle, ExecutionVenue, MarketFeed, NotificationSink, PortResult,
    Wallet, bounded,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::{ArenaConfig, CostConfig};
use crate::cost::{CostAccountant, CostBreakdown};
use crate::error::{ArenaError, Result};
use crate::events::{
    AgentEvent, DeathReport, DeathStats, EventBus, StatusUpdate, ThoughtUpdate, TradeEvent,
    UpdateEvent,
};

/// Shown in place of the wallet address until the wallet reports one
pub const ADDRESS_PLACEHOLDER: &str = "Not initialized";

/// Collaborators an agent talks to
#[derive(Clone)]
pub struct AgentPorts {
    pub wallet: Arc<dyn Wallet>,
    pub oracle: Arc<dyn DecisionOracle>,
    pub venue: Arc<dyn ExecutionVenue>,
    /// Optional; decisions are made without market data when absent
    pub market: Option<Arc<dyn MarketFeed>>,
    pub notifier: Arc<dyn NotificationSink>,
}

/// Per-agent tuning taken from the arena configuration
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub costs: CostConfig,
    /// Upper bound on each collaborator call
    pub call_timeout: Duration,
    /// Trades shown in status and passed to the oracle
    pub recent_trades_window: usize,
}

impl AgentSettings {
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            costs: config.costs.clone(),
            call_timeout: config.call_timeout(),
            recent_trades_window: config.recent_trades_window,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default())
    }
}

/// Read-only projection of an agent, safe to serialize
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub id: AgentId,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub personality_id: String,
    pub wallet_id: String,
    pub wallet_address: String,
    pub is_alive: bool,
    pub is_ready: bool,
    pub is_thinking: bool,
    pub balance: Amount,
    pub started_at: Timestamp,
    pub died_at: Option<Timestamp>,
    pub death_reason: Option<String>,
    pub death_cause: Option<DeathCause>,
    pub survival_time_ms: i64,
    pub survival_time_formatted: String,
    pub costs: CostSnapshot,
    pub minimum_viable_balance: Amount,
    pub total_trades: u64,
    pub successful_trades: u64,
    pub failed_trades: u64,
    /// successful / total, 0 with no trades
    pub success_rate: f64,
    pub total_profit: Amount,
    pub total_loss: Amount,
    pub net_profit: Amount,
    pub recent_trades: Vec<TradeRecord>,
    pub positions: Vec<Position>,
    pub last_thought: Option<String>,
    pub last_decision_at: Option<Timestamp>,
}

/// What one decision cycle ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was running, or the agent is dead
    Skipped,
    /// No decision was produced (oracle failure, death, unreachable wallet)
    NoDecision,
    Held,
    Traded,
    TradeFailed,
}

struct AgentState {
    balance: Amount,
    ready: bool,
    alive: bool,
    died_at: Option<Timestamp>,
    death_cause: Option<DeathCause>,
    wallet_address: Option<String>,
    total_trades: u64,
    successful_trades: u64,
    failed_trades: u64,
    total_profit: Amount,
    total_loss: Amount,
    trades: Vec<TradeRecord>,
    positions: Vec<Position>,
    last_thought: Option<String>,
    last_decision_at: Option<Timestamp>,
    costs: CostAccountant,
}

impl AgentState {
    fn success_rate(&self) -> f64 {
        if self.total_trades == 0 {
            0.0
        } else {
            self.successful_trades as f64 / self.total_trades as f64
        }
    }

    fn net_profit(&self) -> Amount {
        self.total_profit - self.total_loss
    }

    fn recent_trades(&self, window: usize) -> Vec<TradeRecord> {
        let start = self.trades.len().saturating_sub(window);
        self.trades[start..].to_vec()
    }

    fn apply_fill(&mut self, action: Action, fill: &Fill, record: TradeRecord) {
        self.total_trades += 1;
        if fill.is_profitable() {
            self.successful_trades += 1;
            self.total_profit += fill.profit;
        } else {
            self.failed_trades += 1;
            self.total_loss += fill.profit.abs();
        }

        match action {
            Action::Buy => self.positions.push(Position {
                token: fill.token_out.clone(),
                amount: fill.amount_out,
                cost_basis: fill.amount_in,
                opened_at: record.timestamp,
            }),
            Action::Sell => self.reduce_positions(&fill.token_in, fill.amount_in),
            Action::Hold => {}
        }

        self.costs.record_trade_fee(fill.fees);
        self.trades.push(record);
    }

    /// Close out `amount` of `token`, oldest positions first
    fn reduce_positions(&mut self, token: &str, mut amount: Amount) {
        for position in self.positions.iter_mut().filter(|p| p.token == token) {
            if amount <= Decimal::ZERO {
                break;
            }
            let taken = position.amount.min(amount);
            if position.amount > Decimal::ZERO {
                position.cost_basis -= position.cost_basis * taken / position.amount;
            }
            position.amount -= taken;
            amount -= taken;
        }
        self.positions.retain(|p| p.amount > Decimal::ZERO);
    }
}

/// Marks an agent as thinking for as long as it lives
struct ThinkingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ThinkingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ThinkingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Agent {
    id: AgentId,
    personality: Arc<Personality>,
    ports: AgentPorts,
    settings: AgentSettings,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    started_at: Timestamp,
    thinking: AtomicBool,
    state: Mutex<AgentState>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        personality: Arc<Personality>,
        ports: AgentPorts,
        settings: AgentSettings,
        clock: Arc<dyn Clock>,
        bus: EventBus,
    ) -> Self {
        let costs = CostAccountant::new(&settings.costs, clock.clone());
        let started_at = costs.created_at();

        log::info!("[{}] {} {} created", id, personality.emoji, personality.name);

        Self {
            id,
            personality,
            ports,
            settings,
            clock,
            bus,
            started_at,
            thinking: AtomicBool::new(false),
            state: Mutex::new(AgentState {
                balance: Decimal::ZERO,
                ready: false,
                alive: true,
                died_at: None,
                death_cause: None,
                wallet_address: None,
                total_trades: 0,
                successful_trades: 0,
                failed_trades: 0,
                total_profit: Decimal::ZERO,
                total_loss: Decimal::ZERO,
                trades: Vec::new(),
                positions: Vec::new(),
                last_thought: None,
                last_decision_at: None,
                costs,
            }),
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn personality(&self) -> &Arc<Personality> {
        &self.personality
    }

    pub fn is_alive(&self) -> bool {
        self.state.lock().alive
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.load(Ordering::Acquire)
    }

    pub fn balance(&self) -> Amount {
        self.state.lock().balance
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.state.lock().death_cause.clone()
    }

    pub fn trade_history(&self) -> Vec<TradeRecord> {
        self.state.lock().trades.clone()
    }

    pub fn cost_breakdown(&self) -> CostBreakdown {
        self.state.lock().costs.breakdown()
    }

    pub fn minimum_viable_balance(&self) -> Amount {
        self.state.lock().costs.minimum_viable_balance()
    }

    async fn call<T, F>(&self, call: F) -> PortResult<T>
    where
        F: Future<Output = PortResult<T>>,
    {
        bounded(self.settings.call_timeout, call).await
    }

    /// Activate the wallet and pull the starting balance
    ///
    /// On failure the agent stays not-ready and the error is returned.
    pub async fn initialize(&self) -> PortResult<()> {
        self.call(self.ports.wallet.initialize()).await?;

        match self.call(self.ports.wallet.address()).await {
            Ok(address) => self.state.lock().wallet_address = Some(address),
            Err(e) => log::warn!("[{}] Wallet address unavailable: {}", self.id, e),
        }

        let balance = self.call(self.ports.wallet.balance()).await?;

        let minimum = {
            let mut state = self.state.lock();
            state.balance = balance;
            state.ready = true;
            state.costs.minimum_viable_balance()
        };

        log::info!("[{}] Starting balance: {} SOL", self.id, balance);
        if balance < minimum {
            log::warn!(
                "[{}] Starting balance {} is below the minimum viable balance {}",
                self.id,
                balance,
                minimum
            );
        }
        Ok(())
    }

    /// Overwrite the balance with the wallet's figure
    ///
    /// Once dead the last known balance is returned without asking the wallet.
    pub async fn refresh_balance(&self) -> PortResult<Amount> {
        if !self.is_alive() {
            return Ok(self.balance());
        }

        let balance = self.call(self.ports.wallet.balance()).await?;

        let mut state = self.state.lock();
        if state.alive {
            state.balance = balance;
        }
        Ok(state.balance)
    }

    /// Refresh the balance and die if it no longer covers costs
    ///
    /// Returns whether the agent is still alive. A wallet failure is
    /// reported as an error and does not kill the agent.
    pub async fn check_survival(&self) -> PortResult<bool> {
        if !self.is_alive() {
            return Ok(false);
        }

        let balance = self.refresh_balance().await?;

        let broke = {
            let state = self.state.lock();
            let costs = state.costs.current_costs();
            balance < costs.total || balance < state.costs.minimum_viable_balance()
        };

        if broke {
            self.die(DeathCause::InsufficientFundsToOperate);
        }
        Ok(self.is_alive())
    }

    /// Consult the decision oracle
    ///
    /// Returns None when dead, when a decision is already being made, when
    /// the agent cannot pay for the decision (it dies), or on any collaborator
    /// failure.
    pub async fn think(&self) -> Option<Decision> {
        let _guard = ThinkingGuard::acquire(&self.thinking)?;
        self.think_exclusive().await
    }

    async fn think_exclusive(&self) -> Option<Decision> {
        if !self.is_alive() {
            return None;
        }
        self.state.lock().last_decision_at = Some(self.clock.now());

        let balance = match self.refresh_balance().await {
            Ok(balance) => balance,
            Err(e) => {
                log::warn!("[{}] Balance refresh failed before deciding: {}", self.id, e);
                return None;
            }
        };

        let affordable = {
            let state = self.state.lock();
            let needed = state.costs.current_costs().total + state.costs.decision_cost();
            balance >= needed
        };
        if !affordable {
            self.die(DeathCause::InsufficientFundsForDecision);
            return None;
        }

        let market = self.market_snapshot().await;
        let context = {
            let mut state = self.state.lock();
            if !state.alive {
                return None;
            }
            let context = self.decision_context(&state, balance, market);
            // Charged once the oracle is consulted, whatever it answers
            state.costs.record_decision();
            context
        };

        let decision = match self
            .call(
                self.ports
                    .oracle
                    .decide(&self.personality.system_prompt, &context),
            )
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!("[{}] {} failed: {}", self.id, self.ports.oracle.name(), e);
                return None;
            }
        };

        {
            let mut state = self.state.lock();
            if !state.alive {
                return None;
            }
            state.last_thought = Some(decision.reasoning.clone());
        }

        log::debug!(
            "[{}] Decided {}: {}",
            self.id,
            decision.action,
            decision.reasoning
        );

        self.bus.publish(AgentEvent::Update(UpdateEvent::Thought(ThoughtUpdate {
            agent_id: self.id.clone(),
            thought: decision.reasoning.clone(),
            decision: decision.clone(),
        })));

        let thought = decision.reasoning.clone();
        self.notify(move |sink, personality| async move {
            sink.post_thought(&personality, &thought).await
        });

        Some(decision)
    }

    async fn market_snapshot(&self) -> Option<MarketSnapshot> {
        let feed = self.ports.market.as_ref()?;
        match self.call(feed.snapshot()).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("[{}] Market data unavailable: {}", self.id, e);
                None
            }
        }
    }

    fn decision_context(
        &self,
        state: &AgentState,
        balance: Amount,
        market: Option<MarketSnapshot>,
    ) -> DecisionContext {
        DecisionContext {
            balance,
            costs: state.costs.current_costs(),
            positions: state.positions.clone(),
            recent_trades: state.recent_trades(self.settings.recent_trades_window),
            market,
            traits: self.personality.traits.clone(),
            survival_time_ms: (self.clock.now() - self.started_at).num_milliseconds().max(0),
            performance: PerformanceSummary {
                total_trades: state.total_trades,
                success_rate: state.success_rate(),
                net_profit: state.net_profit(),
            },
        }
    }

    /// Hand a decision to the execution venue
    ///
    /// HOLD succeeds without reaching the venue. Any venue failure or
    /// rejection returns false and leaves the agent untouched.
    pub async fn execute_trade(&self, decision: &Decision) -> bool {
        if !self.is_alive() {
            return false;
        }
        if decision.action.is_hold() {
            log::debug!("[{}] Holding: {}", self.id, decision.reasoning);
            return true;
        }

        let request = {
            let state = self.state.lock();
            ExecutionRequest {
                agent_id: self.id.clone(),
                wallet_address: state.wallet_address.clone(),
                decision: decision.clone(),
                current_balance: state.balance,
            }
        };

        let fill = match self.call(self.ports.venue.execute(&request)).await {
            Ok(ExecutionReport::Filled(fill)) => fill,
            Ok(ExecutionReport::Held) => return true,
            Ok(ExecutionReport::Rejected { reason }) => {
                log::warn!("[{}] {} rejected: {}", self.id, decision.action, reason);
                return false;
            }
            Err(e) => {
                log::warn!("[{}] {} failed: {}", self.id, self.ports.venue.name(), e);
                return false;
            }
        };

        let record = TradeRecord::from_fill(decision.action, &fill, self.clock.now());
        {
            let mut state = self.state.lock();
            if !state.alive {
                log::info!("[{}] Discarding trade completed after death", self.id);
                return false;
            }
            state.apply_fill(decision.action, &fill, record.clone());
        }

        if let Err(e) = self.refresh_balance().await {
            log::warn!("[{}] Balance refresh failed after trade: {}", self.id, e);
        }

        log::info!(
            "[{}] Executed {} {} {} -> {} (profit {})",
            self.id,
            decision.action,
            fill.amount_in,
            fill.token_in,
            fill.token_out,
            fill.profit
        );

        self.bus.publish(AgentEvent::Trade(TradeEvent {
            agent_id: self.id.clone(),
            trade: record.clone(),
        }));
        self.notify(move |sink, personality| async move {
            sink.post_trade(&personality, &record).await
        });

        true
    }

    /// Think and, unless the decision is HOLD, trade, as one exclusive cycle
    pub async fn run_decision_cycle(&self) -> CycleOutcome {
        let Some(_guard) = ThinkingGuard::acquire(&self.thinking) else {
            return CycleOutcome::Skipped;
        };
        if !self.is_alive() {
            return CycleOutcome::Skipped;
        }

        let Some(decision) = self.think_exclusive().await else {
            return CycleOutcome::NoDecision;
        };
        if decision.action.is_hold() {
            log::debug!("[{}] Holding: {}", self.id, decision.reasoning);
            return CycleOutcome::Held;
        }

        if self.execute_trade(&decision).await {
            CycleOutcome::Traded
        } else {
            CycleOutcome::TradeFailed
        }
    }

    /// The one irreversible transition
    ///
    /// Returns true if this call killed the agent, false if it was already dead.
    pub fn die(&self, cause: DeathCause) -> bool {
        let report = {
            let mut state = self.state.lock();
            if !state.alive {
                return false;
            }
            let now = self.clock.now();
            state.alive = false;
            state.died_at = Some(now);
            state.death_cause = Some(cause.clone());

            let survival_time_ms = (now - self.started_at).num_milliseconds().max(0);
            DeathReport {
                agent_id: self.id.clone(),
                name: self.personality.name.clone(),
                reason: cause.to_string(),
                cause,
                survival_time: format_survival_time(survival_time_ms),
                survival_time_ms,
                final_balance: state.balance,
                stats: DeathStats {
                    total_trades: state.total_trades,
                    successful_trades: state.successful_trades,
                    failed_trades: state.failed_trades,
                    net_profit: state.net_profit(),
                    success_rate: state.success_rate(),
                },
            }
        };

        log::info!(
            "[{}] {} {} has died: {} (survived {}, {} trades, {} successful)",
            self.id,
            self.personality.emoji,
            self.personality.name,
            report.reason,
            report.survival_time,
            report.stats.total_trades,
            report.stats.successful_trades
        );

        let notice = DeathNotice {
            reason: report.reason.clone(),
            survival_time_ms: report.survival_time_ms,
            total_trades: report.stats.total_trades,
            successful_trades: report.stats.successful_trades,
            net_profit: report.stats.net_profit,
        };
        self.bus.publish(AgentEvent::Death(report));
        self.notify(move |sink, personality| async move {
            sink.post_death(&personality, &notice).await
        });

        true
    }

    /// Add out-of-band funds; returns the new balance
    pub fn receive_donation(&self, amount: Amount) -> Result<Amount> {
        if amount <= Decimal::ZERO {
            return Err(ArenaError::InvalidAmount(format!(
                "donation must be positive, got {}",
                amount
            )));
        }

        let new_balance = {
            let mut state = self.state.lock();
            if !state.alive {
                return Err(ArenaError::AgentDead(self.id.clone()));
            }
            state.balance += amount;
            state.balance
        };

        log::info!(
            "[{}] Received donation of {} SOL (balance {})",
            self.id,
            amount,
            new_balance
        );
        self.publish_status();
        Ok(new_balance)
    }

    /// Publish the current status as an `update` event
    pub fn publish_status(&self) {
        self.bus.publish(AgentEvent::Update(UpdateEvent::Status(StatusUpdate {
            agent_id: self.id.clone(),
            status: Box::new(self.status()),
        })));
    }

    pub fn status(&self) -> AgentStatus {
        let state = self.state.lock();
        let end = state.died_at.unwrap_or_else(|| self.clock.now());
        let survival_time_ms = (end - self.started_at).num_milliseconds().max(0);

        AgentStatus {
            id: self.id.clone(),
            name: self.personality.name.clone(),
            emoji: self.personality.emoji.clone(),
            description: self.personality.description.clone(),
            personality_id: self.personality.id.clone(),
            wallet_id: self.ports.wallet.wallet_id().to_string(),
            wallet_address: state
                .wallet_address
                .clone()
                .unwrap_or_else(|| ADDRESS_PLACEHOLDER.to_string()),
            is_alive: state.alive,
            is_ready: state.ready,
            is_thinking: self.is_thinking(),
            balance: state.balance,
            started_at: self.started_at,
            died_at: state.died_at,
            death_reason: state.death_cause.as_ref().map(|c| c.to_string()),
            death_cause: state.death_cause.clone(),
            survival_time_ms,
            survival_time_formatted: format_survival_time(survival_time_ms),
            costs: state.costs.current_costs(),
            minimum_viable_balance: state.costs.minimum_viable_balance(),
            total_trades: state.total_trades,
            successful_trades: state.successful_trades,
            failed_trades: state.failed_trades,
            success_rate: state.success_rate(),
            total_profit: state.total_profit,
            total_loss: state.total_loss,
            net_profit: state.net_profit(),
            recent_trades: state.recent_trades(self.settings.recent_trades_window),
            positions: state.positions.clone(),
            last_thought: state.last_thought.clone(),
            last_decision_at: state.last_decision_at,
        }
    }

    /// Fire-and-forget post to the notification sink
    fn notify<F, Fut>(&self, post: F)
    where
        F: FnOnce(Arc<dyn NotificationSink>, Arc<Personality>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::debug!("[{}] No runtime, notification dropped", self.id);
            return;
        };

        let id = self.id.clone();
        let limit = self.settings.call_timeout;
        let fut = post(self.ports.notifier.clone(), self.personality.clone());
        handle.spawn(async move {
            if tokio::time::timeout(limit, fut).await.is_err() {
                log::debug!("[{}] Notification timed out", id);
            }
        });
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("personality", &self.personality.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_clock::WorldClock;
    use arena_core::builtin_personalities;
    use arena_ports::PortError;
    use arena_sim::{NullNotifier, PaperLedger, ScriptedOracle, ScriptedVenue, WalletFault};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    struct Harness {
        agent: Agent,
        ledger: PaperLedger,
        oracle: Arc<ScriptedOracle>,
        venue: Arc<ScriptedVenue>,
        clock: Arc<WorldClock>,
        bus: EventBus,
    }

    fn harness(funding: Amount) -> Harness {
        let _ = env_logger::try_init();
        let clock = WorldClock::fixed(Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        let ledger = PaperLedger::new(funding);
        let oracle = Arc::new(ScriptedOracle::new());
        let venue = Arc::new(ScriptedVenue::settling_into(ledger.clone()));
        let bus = EventBus::new(64);

        let ports = AgentPorts {
            wallet: Arc::new(ledger.open_wallet("bob-wallet")),
            oracle: oracle.clone(),
            venue: venue.clone(),
            market: None,
            notifier: Arc::new(NullNotifier),
        };
        let personality = Arc::new(builtin_personalities().remove(2));
        let agent = Agent::new(
            AgentId::new("balanced-bob"),
            personality,
            ports,
            AgentSettings::default(),
            clock.clone(),
            bus.clone(),
        );

        Harness {
            agent,
            ledger,
            oracle,
            venue,
            clock,
            bus,
        }
    }

    fn fill(profit: Amount, fees: Amount) -> ExecutionReport {
        ExecutionReport::Filled(Fill {
            token_in: "SOL".to_string(),
            token_out: "RAY".to_string(),
            amount_in: dec!(0.1),
            amount_out: dec!(0.1) + profit,
            profit,
            fees,
        })
    }

    #[tokio::test]
    async fn test_initialize_pulls_balance_and_address() {
        let h = harness(dec!(1));
        assert_eq!(h.agent.status().wallet_address, ADDRESS_PLACEHOLDER);

        h.agent.initialize().await.unwrap();

        let status = h.agent.status();
        assert!(status.is_ready);
        assert_eq!(status.balance, dec!(1));
        assert!(status.wallet_address.starts_with("paper-"));
        assert_eq!(status.wallet_id, "bob-wallet");
    }

    #[tokio::test]
    async fn test_initialize_failure_leaves_agent_not_ready() {
        let h = harness(dec!(1));
        h.ledger.inject_fault("bob-wallet", WalletFault::Initialize);

        assert!(h.agent.initialize().await.is_err());
        assert!(!h.agent.is_ready());
        assert!(h.agent.is_alive());
    }

    #[tokio::test]
    async fn test_hold_changes_nothing() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();

        assert!(h.agent.execute_trade(&Decision::hold("patience")).await);

        let status = h.agent.status();
        assert_eq!(status.balance, dec!(1));
        assert_eq!(status.total_trades, 0);
        assert!(status.recent_trades.is_empty());
        assert!(h.venue.requests().is_empty());
    }

    #[tokio::test]
    async fn test_profitable_trade_updates_counters_and_fees() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        h.venue.push_report(fill(dec!(0.05), dec!(0.001)));

        let traded = h
            .agent
            .execute_trade(&Decision::buy("RAY", dec!(0.1), "breakout"))
            .await;

        assert!(traded);
        let status = h.agent.status();
        assert_eq!(status.successful_trades, 1);
        assert_eq!(status.failed_trades, 0);
        assert_eq!(status.total_profit, dec!(0.05));
        assert_eq!(status.costs.trading, dec!(0.001));
        assert_eq!(status.balance, dec!(1.05));
        assert_eq!(status.positions.len(), 1);
        assert_eq!(status.positions[0].token, "RAY");
    }

    #[tokio::test]
    async fn test_losing_trade_counts_as_failed() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        h.venue.push_report(fill(dec!(-0.02), dec!(0.0003)));
        h.venue.push_report(fill(Decimal::ZERO, dec!(0.0003)));

        let decision = Decision::sell("RAY", dec!(0.1), "cut");
        assert!(h.agent.execute_trade(&decision).await);
        assert!(h.agent.execute_trade(&decision).await);

        let status = h.agent.status();
        assert_eq!(status.failed_trades, 2);
        assert_eq!(status.total_loss, dec!(0.02));
        assert_eq!(status.net_profit, dec!(-0.02));
        assert_eq!(
            status.total_trades,
            status.successful_trades + status.failed_trades
        );
    }

    #[tokio::test]
    async fn test_rejected_trade_mutates_nothing() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        h.venue.push_report(ExecutionReport::Rejected {
            reason: "no liquidity".to_string(),
        });
        h.venue
            .push_error(PortError::Unavailable("venue down".to_string()));

        let decision = Decision::buy("RAY", dec!(0.1), "x");
        assert!(!h.agent.execute_trade(&decision).await);
        assert!(!h.agent.execute_trade(&decision).await);
        assert_eq!(h.agent.status().total_trades, 0);
    }

    #[tokio::test]
    async fn test_sell_reduces_oldest_position_first() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        {
            let mut state = h.agent.state.lock();
            let opened_at = h.clock.now();
            for amount in [dec!(2), dec!(3)] {
                state.positions.push(Position {
                    token: "BONK".to_string(),
                    amount,
                    cost_basis: amount,
                    opened_at,
                });
            }
        }
        h.venue.push_report(ExecutionReport::Filled(Fill {
            token_in: "BONK".to_string(),
            token_out: "SOL".to_string(),
            amount_in: dec!(2.5),
            amount_out: dec!(2.6),
            profit: dec!(0.1),
            fees: dec!(0.0075),
        }));

        assert!(h.agent.execute_trade(&Decision::sell("BONK", dec!(2.5), "x")).await);

        let positions = h.agent.status().positions;
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].amount, dec!(2.5));
    }

    #[tokio::test]
    async fn test_think_records_decision_cost_even_on_oracle_error() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        h.oracle
            .push_error(PortError::InvalidResponse("garbage".to_string()));

        assert!(h.agent.think().await.is_none());
        assert_eq!(h.agent.status().costs.ai_calls, dec!(0.0001));
        assert!(!h.agent.is_thinking());
        assert!(h.agent.is_alive());
    }

    #[tokio::test]
    async fn test_think_publishes_thought() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        h.oracle.push_decision(Decision::buy("RAY", dec!(0.1), "momentum"));
        let mut rx = h.bus.subscribe();

        let decision = h.agent.think().await.unwrap();
        assert_eq!(decision.reasoning, "momentum");
        assert_eq!(h.oracle.prompts()[0], h.agent.personality().system_prompt);

        match rx.recv().await.unwrap() {
            AgentEvent::Update(UpdateEvent::Thought(update)) => {
                assert_eq!(update.thought, "momentum");
                assert_eq!(update.decision.action, Action::Buy);
            }
            other => panic!("expected thought, got {:?}", other),
        }
        assert_eq!(h.agent.status().last_thought.as_deref(), Some("momentum"));
    }

    #[tokio::test]
    async fn test_cannot_afford_decision_dies_without_oracle_call() {
        let h = harness(dec!(0.00005));
        h.agent.initialize().await.unwrap();

        assert!(h.agent.think().await.is_none());
        assert_eq!(h.oracle.calls(), 0);
        assert_eq!(
            h.agent.death_cause(),
            Some(DeathCause::InsufficientFundsForDecision)
        );
    }

    #[tokio::test]
    async fn test_survival_floor() {
        let h = harness(dec!(0.006));
        h.agent.initialize().await.unwrap();

        assert!(!h.agent.check_survival().await.unwrap());
        assert!(h.agent.death_cause().unwrap().is_insufficient_funds());
    }

    #[tokio::test]
    async fn test_survival_wallet_failure_is_an_error_not_a_death() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        h.ledger.inject_fault("bob-wallet", WalletFault::Balance);

        assert!(h.agent.check_survival().await.is_err());
        assert!(h.agent.is_alive());
    }

    #[tokio::test]
    async fn test_death_is_idempotent_and_final() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();
        let mut rx = h.bus.subscribe();

        assert!(h.agent.die(DeathCause::Terminated("test".to_string())));
        let died_at = h.agent.status().died_at;
        h.clock.advance(chrono::Duration::minutes(5));
        assert!(!h.agent.die(DeathCause::InsufficientFundsToOperate));

        assert_eq!(h.agent.status().died_at, died_at);
        assert!(matches!(rx.recv().await.unwrap(), AgentEvent::Death(_)));
        assert!(rx.try_recv().is_err());

        // Nothing brings it back or moves its books
        h.ledger.fund("bob-wallet", dec!(100));
        assert!(!h.agent.check_survival().await.unwrap());
        assert_eq!(h.agent.refresh_balance().await.unwrap(), dec!(1));
        assert!(h.agent.think().await.is_none());
        assert!(!h.agent.execute_trade(&Decision::buy("RAY", dec!(0.1), "x")).await);
        assert!(matches!(
            h.agent.receive_donation(dec!(0.5)),
            Err(ArenaError::AgentDead(_))
        ));
        assert!(!h.agent.is_alive());
        assert_eq!(h.agent.balance(), dec!(1));
    }

    #[tokio::test]
    async fn test_survival_time_frozen_at_death() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();

        h.clock.advance(chrono::Duration::seconds(90));
        h.agent.die(DeathCause::Terminated("done".to_string()));
        h.clock.advance(chrono::Duration::hours(3));

        let status = h.agent.status();
        assert_eq!(status.survival_time_ms, 90_000);
        assert_eq!(status.survival_time_formatted, "1m 30s");
        assert_eq!(status.death_reason.as_deref(), Some("terminated: done"));
    }

    #[tokio::test]
    async fn test_donation() {
        let h = harness(dec!(1));
        h.agent.initialize().await.unwrap();

        assert_eq!(h.agent.receive_donation(dec!(0.5)).unwrap(), dec!(1.5));
        assert!(matches!(
            h.agent.receive_donation(Decimal::ZERO),
            Err(ArenaError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_zero_trade_success_rate() {
        let h = harness(dec!(1));
        let status = h.agent.status();
        assert_eq!(status.success_rate, 0.0);
        assert_eq!(status.total_trades, 0);
    }
}
