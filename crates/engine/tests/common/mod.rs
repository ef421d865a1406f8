#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{Database, DbErr};

use engine::{
    AppState, CurrencyPreference, Engine, EngineError, MemoryStore, OutboxEntry, OutboxStatus,
    ResultEngine, SqlStore, Store, StoreTx, Transaction, TransactionType, Wallet, WalletScope,
};
use migration::MigratorTrait;

#[derive(Clone, Copy, Debug)]
pub enum Backend {
    Sqlite,
    Memory,
}

pub async fn store(backend: Backend) -> Arc<dyn Store> {
    match backend {
        Backend::Sqlite => {
            let db = Database::connect("sqlite::memory:").await.unwrap();
            migration::Migrator::up(&db, None).await.unwrap();
            Arc::new(SqlStore::new(db))
        }
        Backend::Memory => Arc::new(MemoryStore::new()),
    }
}

pub async fn engine(backend: Backend) -> Engine {
    Engine::builder()
        .store(store(backend).await)
        .build()
        .await
        .unwrap()
}

/// Engine over a store that fails the writes armed in the returned plan.
pub async fn faulty_engine(backend: Backend) -> (Engine, Arc<Mutex<FaultPlan>>) {
    let plan = Arc::new(Mutex::new(FaultPlan::default()));
    let store = FaultyStore {
        inner: store(backend).await,
        plan: plan.clone(),
    };
    let engine = Engine::builder()
        .store(Arc::new(store))
        .build()
        .await
        .unwrap();
    (engine, plan)
}

/// Writes to reject. Each armed fault stays armed until reset.
#[derive(Debug, Default)]
pub struct FaultPlan {
    pub insert_transaction: Option<TransactionType>,
    pub update_transaction: Option<TransactionType>,
    pub delete_transfer: bool,
    pub insert_outbox: bool,
}

fn injected(what: &str) -> EngineError {
    EngineError::Database(DbErr::Custom(format!("injected fault: {what}")))
}

#[derive(Debug)]
struct FaultyStore {
    inner: Arc<dyn Store>,
    plan: Arc<Mutex<FaultPlan>>,
}

#[async_trait]
impl Store for FaultyStore {
    async fn begin(&self) -> ResultEngine<Box<dyn StoreTx>> {
        Ok(Box::new(FaultyTx {
            inner: self.inner.begin().await?,
            plan: self.plan.clone(),
        }))
    }
}

struct FaultyTx {
    inner: Box<dyn StoreTx>,
    plan: Arc<Mutex<FaultPlan>>,
}

#[async_trait]
impl StoreTx for FaultyTx {
    async fn wallet(&mut self, id: &str) -> ResultEngine<Option<Wallet>> {
        self.inner.wallet(id).await
    }

    async fn wallets(&mut self, scope: WalletScope) -> ResultEngine<Vec<Wallet>> {
        self.inner.wallets(scope).await
    }

    async fn insert_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()> {
        self.inner.insert_wallet(wallet).await
    }

    async fn update_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()> {
        self.inner.update_wallet(wallet).await
    }

    async fn transaction(&mut self, id: &str) -> ResultEngine<Option<Transaction>> {
        self.inner.transaction(id).await
    }

    async fn transactions_for_wallets(
        &mut self,
        wallet_ids: &[String],
    ) -> ResultEngine<Vec<Transaction>> {
        self.inner.transactions_for_wallets(wallet_ids).await
    }

    async fn transactions_by_transfer(
        &mut self,
        transfer_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        self.inner.transactions_by_transfer(transfer_id).await
    }

    async fn insert_transaction(&mut self, tx: &Transaction) -> ResultEngine<()> {
        let armed = self.plan.lock().unwrap().insert_transaction;
        if armed == Some(tx.kind) {
            return Err(injected("insert_transaction"));
        }
        self.inner.insert_transaction(tx).await
    }

    async fn update_transaction(&mut self, tx: &Transaction) -> ResultEngine<()> {
        let armed = self.plan.lock().unwrap().update_transaction;
        if armed == Some(tx.kind) {
            return Err(injected("update_transaction"));
        }
        self.inner.update_transaction(tx).await
    }

    async fn delete_transaction(&mut self, id: &str) -> ResultEngine<u64> {
        self.inner.delete_transaction(id).await
    }

    async fn delete_transfer(&mut self, transfer_id: &str) -> ResultEngine<u64> {
        // Remove the rows first so the failure lands after a real write.
        let removed = self.inner.delete_transfer(transfer_id).await?;
        if self.plan.lock().unwrap().delete_transfer {
            return Err(injected("delete_transfer"));
        }
        Ok(removed)
    }

    async fn currency_preference(&mut self) -> ResultEngine<Option<CurrencyPreference>> {
        self.inner.currency_preference().await
    }

    async fn put_currency_preference(&mut self, pref: &CurrencyPreference) -> ResultEngine<()> {
        self.inner.put_currency_preference(pref).await
    }

    async fn app_state(&mut self) -> ResultEngine<Option<AppState>> {
        self.inner.app_state().await
    }

    async fn put_app_state(&mut self, state: &AppState) -> ResultEngine<()> {
        self.inner.put_app_state(state).await
    }

    async fn insert_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()> {
        if self.plan.lock().unwrap().insert_outbox {
            return Err(injected("insert_outbox"));
        }
        self.inner.insert_outbox(entry).await
    }

    async fn outbox_entry(&mut self, id: &str) -> ResultEngine<Option<OutboxEntry>> {
        self.inner.outbox_entry(id).await
    }

    async fn outbox_entries(
        &mut self,
        status: Option<OutboxStatus>,
    ) -> ResultEngine<Vec<OutboxEntry>> {
        self.inner.outbox_entries(status).await
    }

    async fn update_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()> {
        self.inner.update_outbox(entry).await
    }

    async fn delete_outbox(&mut self, id: &str) -> ResultEngine<u64> {
        self.inner.delete_outbox(id).await
    }

    async fn clear_outbox(&mut self) -> ResultEngine<u64> {
        self.inner.clear_outbox().await
    }

    async fn clear_ledger(&mut self) -> ResultEngine<()> {
        self.inner.clear_ledger().await
    }

    async fn commit(self: Box<Self>) -> ResultEngine<()> {
        self.inner.commit().await
    }
}

/// Run each scenario against the sqlite and the in-memory store.
macro_rules! on_both_backends {
    ($($name:ident),* $(,)?) => {
        mod sqlite {
            $(
                #[tokio::test]
                async fn $name() {
                    super::$name(super::common::Backend::Sqlite).await;
                }
            )*
        }

        mod memory {
            $(
                #[tokio::test]
                async fn $name() {
                    super::$name(super::common::Backend::Memory).await;
                }
            )*
        }
    };
}
