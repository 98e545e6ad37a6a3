//! Scripted oracle and venue for deterministic tests
//!
//! Both replay a queue of canned responses and record how they were called.
//! Once the queue is empty the oracle holds and the venue rejects.

use arena_core::{Decision, DecisionContext, ExecutionReport, ExecutionRequest};
use arena_ports::{DecisionOracle, ExecutionVenue, PortError, PortResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::ledger::PaperLedger;

/// Oracle replaying queued decisions and errors
#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<PortResult<Decision>>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_decision(&self, decision: Decision) {
        self.script.lock().push_back(Ok(decision));
    }

    pub fn push_error(&self, error: PortError) {
        self.script.lock().push_back(Err(error));
    }

    /// Make every call take this long before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// System prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "ScriptedOracle"
    }

    async fn decide(&self, system_prompt: &str, _context: &DecisionContext) -> PortResult<Decision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(system_prompt.to_string());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        next.unwrap_or_else(|| Ok(Decision::hold("script exhausted")))
    }
}

/// Venue replaying queued reports
///
/// With a ledger attached, the profit of each replayed fill is credited to
/// the requesting wallet address, as the simulated venue does.
#[derive(Default)]
pub struct ScriptedVenue {
    script: Mutex<VecDeque<PortResult<ExecutionReport>>>,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<ExecutionRequest>>,
    ledger: Option<PaperLedger>,
}

impl ScriptedVenue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settling_into(ledger: PaperLedger) -> Self {
        Self {
            ledger: Some(ledger),
            ..Self::default()
        }
    }

    pub fn push_report(&self, report: ExecutionReport) {
        self.script.lock().push_back(Ok(report));
    }

    pub fn push_error(&self, error: PortError) {
        self.script.lock().push_back(Err(error));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Requests received, in call order
    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ExecutionVenue for ScriptedVenue {
    fn name(&self) -> &str {
        "ScriptedVenue"
    }

    async fn execute(&self, request: &ExecutionRequest) -> PortResult<ExecutionReport> {
        self.requests.lock().push(request.clone());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().pop_front();
        let report = next.unwrap_or_else(|| {
            Ok(ExecutionReport::Rejected {
                reason: "script exhausted".to_string(),
            })
        })?;

        if let (ExecutionReport::Filled(fill), Some(ledger), Some(address)) =
            (&report, &self.ledger, &request.wallet_address)
        {
            ledger.credit(address, fill.profit)?;
        }
        Ok(report)
    }
}
