use crate::error::PortResult;
use arena_core::Amount;
use async_trait::async_trait;
use std::sync::Arc;

/// Confirmation of a completed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub remaining_balance: Amount,
}

/// Port for an agent's custodial wallet
///
/// The balance reported here is ground truth; the engine only ever adds to
/// it locally through donations.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Identifier the wallet was opened with
    fn wallet_id(&self) -> &str;

    /// Activate the wallet (connect, unlock, ...)
    async fn initialize(&self) -> PortResult<()>;

    /// Current balance in native units
    async fn balance(&self) -> PortResult<Amount>;

    /// Public address
    async fn address(&self) -> PortResult<String>;

    /// Send funds to another address
    async fn transfer(&self, destination: &str, amount: Amount) -> PortResult<TransferReceipt>;
}

/// Port for opening wallets by id when bootstrapping a roster
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn open(&self, wallet_id: &str) -> PortResult<Arc<dyn Wallet>>;
}
