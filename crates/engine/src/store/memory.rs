//! In-process adapter.
//!
//! A unit of work holds the table lock for its whole lifetime and works on a
//! private copy of the tables; `commit` swaps the copy in. Dropping the unit
//! of work leaves the shared tables untouched.

use std::{cmp::Reverse, collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use sea_orm::DbErr;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    AppState, CurrencyPreference, OutboxEntry, OutboxStatus, ResultEngine, Transaction, Wallet,
};

use super::{Store, StoreTx, WalletScope};

#[derive(Clone, Debug, Default)]
struct Tables {
    wallets: BTreeMap<String, Wallet>,
    transactions: BTreeMap<String, Transaction>,
    currency_preference: Option<CurrencyPreference>,
    app_state: Option<AppState>,
    outbox: BTreeMap<String, OutboxEntry>,
}

/// Store keeping every table in memory. Cloning shares the tables.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> ResultEngine<Box<dyn StoreTx>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = Tables::clone(&guard);
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

fn duplicate_key(table: &str, id: &str) -> DbErr {
    DbErr::Custom(format!("UNIQUE constraint failed: {table}.id ({id})"))
}

fn insert_unique<T: Clone>(
    table: &mut BTreeMap<String, T>,
    name: &str,
    id: &str,
    value: &T,
) -> ResultEngine<()> {
    if table.contains_key(id) {
        return Err(duplicate_key(name, id).into());
    }
    table.insert(id.to_string(), value.clone());
    Ok(())
}

fn replace_existing<T: Clone>(
    table: &mut BTreeMap<String, T>,
    id: &str,
    value: &T,
) -> ResultEngine<()> {
    match table.get_mut(id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(DbErr::RecordNotUpdated.into()),
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn wallet(&mut self, id: &str) -> ResultEngine<Option<Wallet>> {
        Ok(self.working.wallets.get(id).cloned())
    }

    async fn wallets(&mut self, scope: WalletScope) -> ResultEngine<Vec<Wallet>> {
        let mut wallets: Vec<Wallet> = self
            .working
            .wallets
            .values()
            .filter(|w| match scope {
                WalletScope::Active => w.is_active(),
                WalletScope::Archived => w.is_archived(),
                WalletScope::All => true,
            })
            .cloned()
            .collect();
        match scope {
            WalletScope::Active | WalletScope::All => {
                wallets.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
            }
            WalletScope::Archived => {
                wallets.sort_by_key(|w| Reverse((w.archived_at, w.id.clone())));
            }
        }
        Ok(wallets)
    }

    async fn insert_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()> {
        insert_unique(&mut self.working.wallets, "wallets", &wallet.id, wallet)
    }

    async fn update_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()> {
        replace_existing(&mut self.working.wallets, &wallet.id, wallet)
    }

    async fn transaction(&mut self, id: &str) -> ResultEngine<Option<Transaction>> {
        Ok(self.working.transactions.get(id).cloned())
    }

    async fn transactions_for_wallets(
        &mut self,
        wallet_ids: &[String],
    ) -> ResultEngine<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .working
            .transactions
            .values()
            .filter(|tx| wallet_ids.contains(&tx.wallet_id))
            .cloned()
            .collect();
        rows.sort_by_key(|tx| Reverse((tx.date, tx.created_at, tx.id.clone())));
        Ok(rows)
    }

    async fn transactions_by_transfer(
        &mut self,
        transfer_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        // BTreeMap iteration is already ordered by id.
        Ok(self
            .working
            .transactions
            .values()
            .filter(|tx| tx.transfer_id.as_deref() == Some(transfer_id))
            .cloned()
            .collect())
    }

    async fn insert_transaction(&mut self, tx: &Transaction) -> ResultEngine<()> {
        if !self.working.wallets.contains_key(&tx.wallet_id) {
            return Err(DbErr::Custom(format!(
                "FOREIGN KEY constraint failed: transactions.wallet_id ({})",
                tx.wallet_id
            ))
            .into());
        }
        insert_unique(&mut self.working.transactions, "transactions", &tx.id, tx)
    }

    async fn update_transaction(&mut self, tx: &Transaction) -> ResultEngine<()> {
        replace_existing(&mut self.working.transactions, &tx.id, tx)
    }

    async fn delete_transaction(&mut self, id: &str) -> ResultEngine<u64> {
        Ok(u64::from(self.working.transactions.remove(id).is_some()))
    }

    async fn delete_transfer(&mut self, transfer_id: &str) -> ResultEngine<u64> {
        let before = self.working.transactions.len();
        self.working
            .transactions
            .retain(|_, tx| tx.transfer_id.as_deref() != Some(transfer_id));
        Ok((before - self.working.transactions.len()) as u64)
    }

    async fn currency_preference(&mut self) -> ResultEngine<Option<CurrencyPreference>> {
        Ok(self.working.currency_preference.clone())
    }

    async fn put_currency_preference(&mut self, pref: &CurrencyPreference) -> ResultEngine<()> {
        // Upsert keeps the first creation time, like the SQL `ON CONFLICT` clause.
        let created_at = self
            .working
            .currency_preference
            .as_ref()
            .map_or(pref.created_at, |existing| existing.created_at);
        self.working.currency_preference = Some(CurrencyPreference {
            created_at,
            ..pref.clone()
        });
        Ok(())
    }

    async fn app_state(&mut self) -> ResultEngine<Option<AppState>> {
        Ok(self.working.app_state.clone())
    }

    async fn put_app_state(&mut self, state: &AppState) -> ResultEngine<()> {
        let created_at = self
            .working
            .app_state
            .as_ref()
            .map_or(state.created_at, |existing| existing.created_at);
        self.working.app_state = Some(AppState {
            created_at,
            ..state.clone()
        });
        Ok(())
    }

    async fn insert_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()> {
        insert_unique(&mut self.working.outbox, "outbox", &entry.id, entry)
    }

    async fn outbox_entry(&mut self, id: &str) -> ResultEngine<Option<OutboxEntry>> {
        Ok(self.working.outbox.get(id).cloned())
    }

    async fn outbox_entries(
        &mut self,
        status: Option<OutboxStatus>,
    ) -> ResultEngine<Vec<OutboxEntry>> {
        let mut entries: Vec<OutboxEntry> = self
            .working
            .outbox
            .values()
            .filter(|entry| status.is_none_or(|wanted| entry.status == wanted))
            .cloned()
            .collect();
        entries.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(entries)
    }

    async fn update_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()> {
        replace_existing(&mut self.working.outbox, &entry.id, entry)
    }

    async fn delete_outbox(&mut self, id: &str) -> ResultEngine<u64> {
        Ok(u64::from(self.working.outbox.remove(id).is_some()))
    }

    async fn clear_outbox(&mut self) -> ResultEngine<u64> {
        let removed = self.working.outbox.len() as u64;
        self.working.outbox.clear();
        Ok(removed)
    }

    async fn clear_ledger(&mut self) -> ResultEngine<()> {
        self.working.transactions.clear();
        self.working.wallets.clear();
        self.working.currency_preference = None;
        self.working.app_state = None;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> ResultEngine<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::WalletIcon;

    fn wallet(name: &str) -> Wallet {
        Wallet::new(name.to_string(), 0, WalletIcon::Wallet, Utc::now())
    }

    #[tokio::test]
    async fn dropped_unit_of_work_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_wallet(&wallet("Cash")).await.unwrap();
        }
        let mut tx = store.begin().await.unwrap();
        assert!(tx.wallets(WalletScope::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = MemoryStore::new();
        let cash = wallet("Cash");
        let mut tx = store.begin().await.unwrap();
        tx.insert_wallet(&cash).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.wallet(&cash.id).await.unwrap(), Some(cash));
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        let cash = wallet("Cash");
        let mut tx = store.begin().await.unwrap();
        tx.insert_wallet(&cash).await.unwrap();
        assert!(tx.insert_wallet(&cash).await.is_err());
    }

    #[tokio::test]
    async fn update_of_missing_row_fails() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = tx.update_wallet(&wallet("Ghost")).await.unwrap_err();
        assert_eq!(err, crate::EngineError::Database(DbErr::RecordNotUpdated));
    }
}
