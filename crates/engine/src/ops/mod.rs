use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::{
    EngineError, OutboxEntity, OutboxEntry, OutboxOperation, ResultEngine,
    store::{SqlStore, Store},
};

mod balances;
mod outbox;
mod preferences;
mod transactions;
mod transfers;
mod wallets;

pub use balances::WalletBalance;
pub use transfers::TransferPair;

/// Run a block inside a store unit of work, committing on success.
///
/// On error (including an early `?` return from the block) the unit of work is
/// dropped, which rolls back every write issued through it.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let mut $tx = $self.store.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every ledger operation.
#[derive(Clone, Debug)]
pub struct Engine {
    store: Arc<dyn Store>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The backing store, for maintenance work outside the validated
    /// operations.
    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    /// Append an outbox entry describing a committed mutation.
    ///
    /// Runs in its own unit of work, after the mutation has committed.
    async fn record<T: Serialize + ?Sized>(
        &self,
        operation: OutboxOperation,
        entity: OutboxEntity,
        entity_id: &str,
        payload: &T,
    ) -> ResultEngine<()> {
        let payload = serde_json::to_value(payload)?;
        self.enqueue_outbox(operation, entity, entity_id, payload)
            .await
            .map(|_: OutboxEntry| ())
    }
}

/// The builder for `Engine`
#[derive(Debug, Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn Store>>,
}

impl EngineBuilder {
    /// Use a migrated sea-orm database as the store.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.store = Some(Arc::new(SqlStore::new(db)));
        self
    }

    /// Use any [`Store`] implementation.
    pub fn store(mut self, store: Arc<dyn Store>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::validation("engine store is not configured"))?;
        Ok(Engine { store })
    }
}
