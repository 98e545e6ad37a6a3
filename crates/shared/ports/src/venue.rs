use crate::error::PortResult;
use arena_core::{ExecutionReport, ExecutionRequest};
use async_trait::async_trait;

/// Port for the trade execution venue
///
/// HOLD decisions short-circuit to `ExecutionReport::Held` without any
/// settlement. A venue may return `Rejected` for a trade it refuses, or an
/// error when it could not be reached.
#[async_trait]
pub trait ExecutionVenue: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, request: &ExecutionRequest) -> PortResult<ExecutionReport>;
}
