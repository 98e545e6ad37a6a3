use crate::error::PortResult;
use arena_core::MarketSnapshot;
use async_trait::async_trait;

/// Port for the external market overview included in decision contexts
#[async_trait]
pub trait MarketFeed: Send + Sync {
    async fn snapshot(&self) -> PortResult<MarketSnapshot>;
}
