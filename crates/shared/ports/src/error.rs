use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by (or on behalf of) a collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type PortResult<T> = std::result::Result<T, PortError>;

/// Await a collaborator call for at most `limit`
///
/// An elapsed limit becomes `PortError::Timeout`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> PortResult<T>
where
    F: Future<Output = PortResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PortError::Timeout(limit)),
    }
}
