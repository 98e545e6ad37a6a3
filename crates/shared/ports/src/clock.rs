use arena_core::Timestamp;

/// Source of "now" for agents and cost accounting
///
/// Survival time, operating cost accrual and trade timestamps all read
/// time through this port, so a test can freeze or fast-forward an agent's
/// life without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    fn name(&self) -> &str {
        "Clock"
    }
}
