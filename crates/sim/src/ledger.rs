//! Paper Ledger - in-memory custody for simulated agents
//!
//! Balances are keyed by wallet address. Every `PaperWallet` is a handle
//! into the same ledger, which is also where the simulated venue settles
//! trade results, so a wallet balance refresh after a fill sees the profit.

use arena_core::Amount;
use arena_ports::{PortError, PortResult, TransferReceipt, Wallet, WalletProvider};
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Failure a wallet can be told to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletFault {
    /// `initialize` fails
    Initialize,
    /// `balance` fails
    Balance,
}

struct LedgerInner {
    /// address -> balance
    balances: DashMap<String, Amount>,
    /// wallet id -> address
    addresses: DashMap<String, String>,
    /// wallet id -> injected faults
    faults: DashMap<String, HashSet<WalletFault>>,
    /// Balance given to wallets opened for the first time
    initial_funding: Amount,
}

/// Shared in-memory balances (cheap to clone)
#[derive(Clone)]
pub struct PaperLedger {
    inner: Arc<LedgerInner>,
}

impl PaperLedger {
    pub fn new(initial_funding: Amount) -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                balances: DashMap::new(),
                addresses: DashMap::new(),
                faults: DashMap::new(),
                initial_funding,
            }),
        }
    }

    /// Open (or reopen) the wallet with this id
    ///
    /// A wallet id seen for the first time gets a fresh address funded with
    /// the initial funding amount.
    pub fn open_wallet(&self, wallet_id: &str) -> PaperWallet {
        let address = self
            .inner
            .addresses
            .entry(wallet_id.to_string())
            .or_insert_with(|| {
                let address = format!("paper-{}", Uuid::new_v4().simple());
                self.inner
                    .balances
                    .insert(address.clone(), self.inner.initial_funding);
                address
            })
            .value()
            .clone();

        PaperWallet {
            ledger: self.clone(),
            wallet_id: wallet_id.to_string(),
            address,
        }
    }

    /// Address assigned to a wallet id
    pub fn address_of(&self, wallet_id: &str) -> Option<String> {
        self.inner.addresses.get(wallet_id).map(|a| a.value().clone())
    }

    pub fn balance_of(&self, address: &str) -> Option<Amount> {
        self.inner.balances.get(address).map(|b| *b)
    }

    pub fn wallet_balance(&self, wallet_id: &str) -> Option<Amount> {
        self.address_of(wallet_id)
            .and_then(|address| self.balance_of(&address))
    }

    /// Overwrite the balance of a wallet, opening it first if needed
    pub fn fund(&self, wallet_id: &str, amount: Amount) {
        let wallet = self.open_wallet(wallet_id);
        self.inner.balances.insert(wallet.address, amount);
    }

    /// Add `delta` to an address (negative to debit), never going below zero
    ///
    /// Returns the new balance.
    pub fn credit(&self, address: &str, delta: Amount) -> PortResult<Amount> {
        let mut balance = self
            .inner
            .balances
            .get_mut(address)
            .ok_or_else(|| PortError::NotFound(format!("address {}", address)))?;

        *balance = (*balance + delta).max(Decimal::ZERO);
        Ok(*balance)
    }

    pub fn inject_fault(&self, wallet_id: &str, fault: WalletFault) {
        self.inner
            .faults
            .entry(wallet_id.to_string())
            .or_default()
            .insert(fault);
    }

    pub fn clear_faults(&self, wallet_id: &str) {
        self.inner.faults.remove(wallet_id);
    }

    fn has_fault(&self, wallet_id: &str, fault: WalletFault) -> bool {
        self.inner
            .faults
            .get(wallet_id)
            .is_some_and(|faults| faults.contains(&fault))
    }
}

#[async_trait]
impl WalletProvider for PaperLedger {
    async fn open(&self, wallet_id: &str) -> PortResult<Arc<dyn Wallet>> {
        Ok(Arc::new(self.open_wallet(wallet_id)))
    }
}

/// Handle on one account of a `PaperLedger`
#[derive(Clone)]
pub struct PaperWallet {
    ledger: PaperLedger,
    wallet_id: String,
    address: String,
}

impl PaperWallet {
    fn check(&self, fault: WalletFault) -> PortResult<()> {
        if self.ledger.has_fault(&self.wallet_id, fault) {
            return Err(PortError::Unavailable(format!(
                "paper wallet {} ({:?} fault)",
                self.wallet_id, fault
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Wallet for PaperWallet {
    fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    async fn initialize(&self) -> PortResult<()> {
        self.check(WalletFault::Initialize)
    }

    async fn balance(&self) -> PortResult<Amount> {
        self.check(WalletFault::Balance)?;
        self.ledger
            .balance_of(&self.address)
            .ok_or_else(|| PortError::NotFound(format!("address {}", self.address)))
    }

    async fn address(&self) -> PortResult<String> {
        Ok(self.address.clone())
    }

    async fn transfer(&self, destination: &str, amount: Amount) -> PortResult<TransferReceipt> {
        if amount <= Decimal::ZERO {
            return Err(PortError::Rejected(format!(
                "transfer amount must be positive, got {}",
                amount
            )));
        }

        {
            // Hold the source entry while checking and debiting
            let mut source = self
                .ledger
                .inner
                .balances
                .get_mut(&self.address)
                .ok_or_else(|| PortError::NotFound(format!("address {}", self.address)))?;
            if *source < amount {
                return Err(PortError::InsufficientFunds(format!(
                    "balance {} < {}",
                    *source, amount
                )));
            }
            *source -= amount;
        }

        *self
            .ledger
            .inner
            .balances
            .entry(destination.to_string())
            .or_insert(Decimal::ZERO) += amount;

        Ok(TransferReceipt {
            from: self.address.clone(),
            to: destination.to_string(),
            amount,
            remaining_balance: self.ledger.balance_of(&self.address).unwrap_or_default(),
        })
    }
}
