use crate::error::PortResult;
use arena_core::{Decision, DecisionContext};
use async_trait::async_trait;

/// Port for the decision source (language model, rule engine, test stub)
///
/// Implementations must only return decisions whose action is one of
/// BUY, SELL or HOLD; anything else is a `PortError::InvalidResponse`.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Oracle name for logging
    fn name(&self) -> &str;

    async fn decide(&self, system_prompt: &str, context: &DecisionContext) -> PortResult<Decision>;
}
