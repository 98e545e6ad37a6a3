//! Orchestrator - owns the agents and drives both schedules
//!
//! Two independent periodic schedules run as tokio tasks:
//! - **status** (fast): survival check and status update for every live agent
//! - **decision** (slow): each live agent is admitted by the decision gate
//!   with probability `trade_frequency`, then thinks and maybe trades
//!
//! Within a tick agents are visited in registration order. Each agent's work
//! runs in its own task so a panic in one agent cannot take down the tick.

use arena_core::{AgentId, Amount, DeathCause, Personality};
use arena_ports::{Clock, Wallet};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::agent::{Agent, AgentPorts, AgentSettings, AgentStatus, CycleOutcome};
use crate::bootstrap::{self, Collaborators, PersonalityBook};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, Result};
use crate::events::{AgentEvent, EventBus};
use crate::gate::{DecisionGate, SeededGate};

/// Result of a successful donation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    pub agent_id: AgentId,
    pub amount: Amount,
    pub new_balance: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule {
    Status,
    Decision,
}

impl Schedule {
    fn name(&self) -> &'static str {
        match self {
            Schedule::Status => "status",
            Schedule::Decision => "decision",
        }
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

struct Inner {
    config: ArenaConfig,
    book: PersonalityBook,
    services: Collaborators,
    settings: AgentSettings,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    gate: Mutex<Box<dyn DecisionGate>>,
    agents: RwLock<Vec<Arc<Agent>>>,
}

pub struct Orchestrator {
    inner: Arc<Inner>,
    running: tokio::sync::Mutex<Option<Running>>,
}

impl Orchestrator {
    /// Build an arena; agents are admitted by `admit` or on `start`
    pub fn new(
        config: ArenaConfig,
        services: Collaborators,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let book = PersonalityBook::from_config(&config)?;
        let settings = AgentSettings::from_config(&config);
        let bus = EventBus::new(config.event_capacity);
        let gate: Box<dyn DecisionGate> = Box::new(SeededGate::new(config.seed));

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                book,
                services,
                settings,
                clock,
                bus,
                gate: Mutex::new(gate),
                agents: RwLock::new(Vec::new()),
            }),
            running: tokio::sync::Mutex::new(None),
        })
    }

    /// Replace the decision gate (e.g. with a scripted one in tests)
    pub fn with_gate(self, gate: impl DecisionGate + 'static) -> Self {
        *self.inner.gate.lock() = Box::new(gate);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.inner.bus.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn personalities(&self) -> &PersonalityBook {
        &self.inner.book
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.inner.config
    }

    /// Admit an agent under its personality's id
    pub async fn admit(
        &self,
        personality: Arc<Personality>,
        wallet: Arc<dyn Wallet>,
    ) -> Result<AgentId> {
        let id = AgentId::new(personality.id.clone());
        self.admit_as(id, personality, wallet).await
    }

    /// Construct, initialize and register an agent
    ///
    /// An agent whose wallet cannot initialize is not registered.
    pub async fn admit_as(
        &self,
        id: AgentId,
        personality: Arc<Personality>,
        wallet: Arc<dyn Wallet>,
    ) -> Result<AgentId> {
        self.inner.admit(id, personality, wallet).await
    }

    /// Survival check and status update for every live agent
    pub async fn tick_status(&self) {
        self.inner.tick_status().await
    }

    /// Gate every live agent and run a decision cycle for those admitted
    pub async fn tick_decision(&self) -> Vec<(AgentId, CycleOutcome)> {
        self.inner.tick_decision().await
    }

    pub fn donate(&self, id: &AgentId, amount: Amount) -> Result<DonationReceipt> {
        let agent = self.agent(id).ok_or_else(|| ArenaError::AgentNotFound(id.clone()))?;
        let new_balance = agent.receive_donation(amount)?;
        Ok(DonationReceipt {
            agent_id: id.clone(),
            amount,
            new_balance,
        })
    }

    /// Kill an agent on operator request
    pub fn terminate(&self, id: &AgentId, reason: impl Into<String>) -> Result<()> {
        let agent = self.agent(id).ok_or_else(|| ArenaError::AgentNotFound(id.clone()))?;
        if agent.die(DeathCause::Terminated(reason.into())) {
            Ok(())
        } else {
            Err(ArenaError::AgentDead(id.clone()))
        }
    }

    /// Admit the configured roster if needed and start both schedules
    ///
    /// Calling `start` while running does nothing.
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            log::debug!("Arena already running");
            return Ok(());
        }

        if self.is_empty() {
            let admitted = self.inner.admit_roster().await;
            log::info!("Admitted {} agents from roster", admitted);
        }
        if self.is_empty() {
            return Err(ArenaError::NoAgents);
        }

        let (shutdown, _) = watch::channel(false);
        let handles = vec![
            self.spawn_schedule(
                Schedule::Status,
                self.inner.config.status_interval(),
                shutdown.subscribe(),
            ),
            self.spawn_schedule(
                Schedule::Decision,
                self.inner.config.decision_interval(),
                shutdown.subscribe(),
            ),
        ];
        *running = Some(Running { shutdown, handles });

        log::info!(
            "Arena started with {} agents (status every {:?}, decisions every {:?})",
            self.len(),
            self.inner.config.status_interval(),
            self.inner.config.decision_interval()
        );
        Ok(())
    }

    /// Stop both schedules, waiting for any tick in progress to finish
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };

        // Receivers are owned by the schedule tasks, so this only fails once they exited
        let _ = running.shutdown.send(true);
        for handle in running.handles {
            if let Err(e) = handle.await {
                log::error!("Schedule task failed: {}", e);
            }
        }
        log::info!("Arena stopped");
    }

    /// Stop, discard every agent, re-admit the roster and start again
    pub async fn reset(&self) -> Result<()> {
        log::info!("Resetting arena");
        self.stop().await;
        self.inner.agents.write().clear();
        self.start().await
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    pub fn agent(&self, id: &AgentId) -> Option<Arc<Agent>> {
        self.inner.find(id)
    }

    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.inner.snapshot()
    }

    pub fn alive_agents(&self) -> Vec<Arc<Agent>> {
        self.inner.snapshot().into_iter().filter(|a| a.is_alive()).collect()
    }

    pub fn dead_agents(&self) -> Vec<Arc<Agent>> {
        self.inner.snapshot().into_iter().filter(|a| !a.is_alive()).collect()
    }

    pub fn status(&self, id: &AgentId) -> Option<AgentStatus> {
        self.agent(id).map(|a| a.status())
    }

    pub fn statuses(&self) -> Vec<AgentStatus> {
        self.inner.snapshot().iter().map(|a| a.status()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn spawn_schedule(
        &self,
        schedule: Schedule,
        period: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let inner = self.inner.clone();

        tokio::spawn(async move {
            // Status fires at once, decisions only after a full period
            let first = match schedule {
                Schedule::Status => Instant::now(),
                Schedule::Decision => Instant::now() + period,
            };
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            log::info!("{} schedule started ({:?})", schedule.name(), period);

            loop {
                tokio::select! {
                    _ = interval.tick() => match schedule {
                        Schedule::Status => inner.tick_status().await,
                        Schedule::Decision => {
                            inner.tick_decision().await;
                        }
                    },
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            log::info!("{} schedule stopped", schedule.name());
        })
    }
}

impl Inner {
    fn snapshot(&self) -> Vec<Arc<Agent>> {
        self.agents.read().clone()
    }

    fn find(&self, id: &AgentId) -> Option<Arc<Agent>> {
        self.agents.read().iter().find(|a| a.id() == id).cloned()
    }

    async fn admit(
        &self,
        id: AgentId,
        personality: Arc<Personality>,
        wallet: Arc<dyn Wallet>,
    ) -> Result<AgentId> {
        if self.find(&id).is_some() {
            return Err(ArenaError::DuplicateAgent(id));
        }

        let ports = AgentPorts {
            wallet,
            oracle: self.services.oracle.clone(),
            venue: self.services.venue.clone(),
            market: self.services.market.clone(),
            notifier: self.services.notifier.clone(),
        };
        let agent = Arc::new(Agent::new(
            id.clone(),
            personality,
            ports,
            self.settings.clone(),
            self.clock.clone(),
            self.bus.clone(),
        ));

        agent
            .initialize()
            .await
            .map_err(|source| ArenaError::WalletUnavailable {
                agent_id: id.clone(),
                source,
            })?;

        let mut agents = self.agents.write();
        if agents.iter().any(|a| a.id() == &id) {
            return Err(ArenaError::DuplicateAgent(id));
        }
        agents.push(agent);
        log::info!("[{}] Admitted ({} agents)", id, agents.len());
        Ok(id)
    }

    /// Admit every roster entry that can be admitted; returns how many were
    async fn admit_roster(&self) -> usize {
        let mut admitted = 0;

        for spec in bootstrap::roster(&self.config) {
            let Some(personality) = self.book.get(&spec.personality) else {
                log::warn!(
                    "Skipping wallet {}: {}",
                    spec.wallet_id,
                    ArenaError::UnknownPersonality(spec.personality.clone())
                );
                continue;
            };

            let wallet = match self.services.wallets.open(&spec.wallet_id).await {
                Ok(wallet) => wallet,
                Err(e) => {
                    log::warn!("Skipping wallet {}: {}", spec.wallet_id, e);
                    continue;
                }
            };

            let id = AgentId::new(spec.agent_id.unwrap_or_else(|| personality.id.clone()));
            match self.admit(id, personality, wallet).await {
                Ok(_) => admitted += 1,
                Err(e) => log::warn!("Admission failed: {}", e),
            }
        }
        admitted
    }

    async fn tick_status(&self) {
        for agent in self.snapshot() {
            if !agent.is_alive() {
                continue;
            }

            let id = agent.id().clone();
            let work = tokio::spawn(async move {
                if let Err(e) = agent.check_survival().await {
                    log::error!("[{}] Survival check failed: {}", agent.id(), e);
                }
                agent.publish_status();
            });

            if let Err(e) = work.await {
                log::error!("[{}] Status tick failed: {}", id, e);
            }
        }
    }

    async fn tick_decision(&self) -> Vec<(AgentId, CycleOutcome)> {
        let mut outcomes = Vec::new();

        for agent in self.snapshot() {
            if !agent.is_alive() {
                continue;
            }

            let frequency = agent.personality().traits.trade_frequency;
            if !self.gate.lock().admits(frequency) {
                log::trace!("[{}] Not deciding this tick", agent.id());
                continue;
            }

            let id = agent.id().clone();
            let work = tokio::spawn(async move { agent.run_decision_cycle().await });

            match work.await {
                Ok(outcome) => outcomes.push((id, outcome)),
                Err(e) => log::error!("[{}] Decision tick failed: {}", id, e),
            }
        }
        outcomes
    }
}
