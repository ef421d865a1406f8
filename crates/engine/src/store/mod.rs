//! Storage port.
//!
//! The engine never talks to a database directly. It opens a unit of work
//! with [`Store::begin`], issues reads and writes through the returned
//! [`StoreTx`] and finally calls [`StoreTx::commit`]. Dropping a `StoreTx`
//! without committing discards every write issued through it.
//!
//! Two adapters implement the same contract:
//!
//! - [`SqlStore`]: sea-orm over sqlite, one `DatabaseTransaction` per unit.
//! - [`MemoryStore`]: in-process tables, one writer at a time.
//!
//! ## Ordering contract
//!
//! - [`WalletScope::Active`] / [`WalletScope::All`]: `created_at` ascending.
//! - [`WalletScope::Archived`]: `archived_at` descending.
//! - transactions: `date` descending, then `created_at` descending.
//! - outbox: `created_at` ascending.
//!
//! Ties are broken by id, which is time ordered.

use async_trait::async_trait;

use crate::{
    AppState, CurrencyPreference, OutboxEntry, OutboxStatus, ResultEngine, Transaction, Wallet,
};

mod memory;
mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletScope {
    Active,
    Archived,
    All,
}

/// A transaction-capable store.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Open a unit of work.
    async fn begin(&self) -> ResultEngine<Box<dyn StoreTx>>;
}

/// An open unit of work. See the module docs for rollback semantics.
#[async_trait]
pub trait StoreTx: Send {
    async fn wallet(&mut self, id: &str) -> ResultEngine<Option<Wallet>>;
    async fn wallets(&mut self, scope: WalletScope) -> ResultEngine<Vec<Wallet>>;
    async fn insert_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()>;
    /// Overwrite an existing wallet row. Fails if the row is missing.
    async fn update_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()>;

    async fn transaction(&mut self, id: &str) -> ResultEngine<Option<Transaction>>;
    async fn transactions_for_wallets(
        &mut self,
        wallet_ids: &[String],
    ) -> ResultEngine<Vec<Transaction>>;
    async fn transactions_by_transfer(
        &mut self,
        transfer_id: &str,
    ) -> ResultEngine<Vec<Transaction>>;
    async fn insert_transaction(&mut self, tx: &Transaction) -> ResultEngine<()>;
    /// Overwrite an existing transaction row. Fails if the row is missing.
    async fn update_transaction(&mut self, tx: &Transaction) -> ResultEngine<()>;
    /// Returns the number of rows removed.
    async fn delete_transaction(&mut self, id: &str) -> ResultEngine<u64>;
    /// Removes every row carrying `transfer_id`. Returns the number removed.
    async fn delete_transfer(&mut self, transfer_id: &str) -> ResultEngine<u64>;

    async fn currency_preference(&mut self) -> ResultEngine<Option<CurrencyPreference>>;
    /// Insert or replace the singleton row.
    async fn put_currency_preference(&mut self, pref: &CurrencyPreference) -> ResultEngine<()>;
    async fn app_state(&mut self) -> ResultEngine<Option<AppState>>;
    /// Insert or replace the singleton row.
    async fn put_app_state(&mut self, state: &AppState) -> ResultEngine<()>;

    async fn insert_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()>;
    async fn outbox_entry(&mut self, id: &str) -> ResultEngine<Option<OutboxEntry>>;
    async fn outbox_entries(
        &mut self,
        status: Option<OutboxStatus>,
    ) -> ResultEngine<Vec<OutboxEntry>>;
    async fn update_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()>;
    async fn delete_outbox(&mut self, id: &str) -> ResultEngine<u64>;
    async fn clear_outbox(&mut self) -> ResultEngine<u64>;

    /// Remove wallets, transactions and both singleton rows.
    async fn clear_ledger(&mut self) -> ResultEngine<()>;

    async fn commit(self: Box<Self>) -> ResultEngine<()>;
}
