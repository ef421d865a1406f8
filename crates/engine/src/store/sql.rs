//! sea-orm adapter.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait, sea_query::OnConflict,
};

use crate::{
    AppState, CurrencyPreference, OutboxEntry, OutboxStatus, ResultEngine, Transaction, Wallet,
    app_state, currency, outbox, transactions, wallets,
};

use super::{Store, StoreTx, WalletScope};

/// Store backed by a sea-orm connection (sqlite in practice).
///
/// The schema is owned by the `migration` crate and must be applied before
/// the store is used.
#[derive(Clone, Debug)]
pub struct SqlStore {
    database: DatabaseConnection,
}

impl SqlStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

#[async_trait]
impl Store for SqlStore {
    async fn begin(&self) -> ResultEngine<Box<dyn StoreTx>> {
        let tx = self.database.begin().await?;
        Ok(Box::new(SqlTx { tx }))
    }
}

/// Dropping the inner `DatabaseTransaction` without commit rolls it back.
struct SqlTx {
    tx: DatabaseTransaction,
}

#[async_trait]
impl StoreTx for SqlTx {
    async fn wallet(&mut self, id: &str) -> ResultEngine<Option<Wallet>> {
        wallets::Entity::find_by_id(id.to_string())
            .one(&self.tx)
            .await?
            .map(Wallet::try_from)
            .transpose()
    }

    async fn wallets(&mut self, scope: WalletScope) -> ResultEngine<Vec<Wallet>> {
        let query = wallets::Entity::find();
        let query = match scope {
            WalletScope::Active => query
                .filter(wallets::Column::ArchivedAt.is_null())
                .order_by_asc(wallets::Column::CreatedAt)
                .order_by_asc(wallets::Column::Id),
            WalletScope::Archived => query
                .filter(wallets::Column::ArchivedAt.is_not_null())
                .order_by_desc(wallets::Column::ArchivedAt)
                .order_by_desc(wallets::Column::Id),
            WalletScope::All => query
                .order_by_asc(wallets::Column::CreatedAt)
                .order_by_asc(wallets::Column::Id),
        };
        query
            .all(&self.tx)
            .await?
            .into_iter()
            .map(Wallet::try_from)
            .collect()
    }

    async fn insert_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()> {
        wallets::ActiveModel::from(wallet).insert(&self.tx).await?;
        Ok(())
    }

    async fn update_wallet(&mut self, wallet: &Wallet) -> ResultEngine<()> {
        wallets::ActiveModel::from(wallet).update(&self.tx).await?;
        Ok(())
    }

    async fn transaction(&mut self, id: &str) -> ResultEngine<Option<Transaction>> {
        transactions::Entity::find_by_id(id.to_string())
            .one(&self.tx)
            .await?
            .map(Transaction::try_from)
            .transpose()
    }

    async fn transactions_for_wallets(
        &mut self,
        wallet_ids: &[String],
    ) -> ResultEngine<Vec<Transaction>> {
        if wallet_ids.is_empty() {
            return Ok(Vec::new());
        }
        transactions::Entity::find()
            .filter(transactions::Column::WalletId.is_in(wallet_ids.iter().cloned()))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.tx)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn transactions_by_transfer(
        &mut self,
        transfer_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::TransferId.eq(transfer_id))
            .order_by_asc(transactions::Column::Id)
            .all(&self.tx)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn insert_transaction(&mut self, tx: &Transaction) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).insert(&self.tx).await?;
        Ok(())
    }

    async fn update_transaction(&mut self, tx: &Transaction) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).update(&self.tx).await?;
        Ok(())
    }

    async fn delete_transaction(&mut self, id: &str) -> ResultEngine<u64> {
        let res = transactions::Entity::delete_by_id(id.to_string())
            .exec(&self.tx)
            .await?;
        Ok(res.rows_affected)
    }

    async fn delete_transfer(&mut self, transfer_id: &str) -> ResultEngine<u64> {
        let res = transactions::Entity::delete_many()
            .filter(transactions::Column::TransferId.eq(transfer_id))
            .exec(&self.tx)
            .await?;
        Ok(res.rows_affected)
    }

    async fn currency_preference(&mut self) -> ResultEngine<Option<CurrencyPreference>> {
        currency::Entity::find_by_id(currency::CURRENCY_PREFERENCE_ID.to_string())
            .one(&self.tx)
            .await?
            .map(CurrencyPreference::try_from)
            .transpose()
    }

    async fn put_currency_preference(&mut self, pref: &CurrencyPreference) -> ResultEngine<()> {
        currency::Entity::insert(currency::ActiveModel::from(pref))
            .on_conflict(
                OnConflict::column(currency::Column::Id)
                    .update_columns([
                        currency::Column::CurrencyCode,
                        currency::Column::CurrencySymbol,
                        currency::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.tx)
            .await?;
        Ok(())
    }

    async fn app_state(&mut self) -> ResultEngine<Option<AppState>> {
        app_state::Entity::find_by_id(app_state::APP_STATE_ID.to_string())
            .one(&self.tx)
            .await?
            .map(AppState::try_from)
            .transpose()
    }

    async fn put_app_state(&mut self, state: &AppState) -> ResultEngine<()> {
        app_state::Entity::insert(app_state::ActiveModel::from(state))
            .on_conflict(
                OnConflict::column(app_state::Column::Id)
                    .update_columns([
                        app_state::Column::SelectedWalletContext,
                        app_state::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.tx)
            .await?;
        Ok(())
    }

    async fn insert_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()> {
        outbox::ActiveModel::try_from(entry)?
            .insert(&self.tx)
            .await?;
        Ok(())
    }

    async fn outbox_entry(&mut self, id: &str) -> ResultEngine<Option<OutboxEntry>> {
        outbox::Entity::find_by_id(id.to_string())
            .one(&self.tx)
            .await?
            .map(OutboxEntry::try_from)
            .transpose()
    }

    async fn outbox_entries(
        &mut self,
        status: Option<OutboxStatus>,
    ) -> ResultEngine<Vec<OutboxEntry>> {
        let mut query = outbox::Entity::find();
        if let Some(status) = status {
            query = query.filter(outbox::Column::Status.eq(status.as_str()));
        }
        query
            .order_by_asc(outbox::Column::CreatedAt)
            .order_by_asc(outbox::Column::Id)
            .all(&self.tx)
            .await?
            .into_iter()
            .map(OutboxEntry::try_from)
            .collect()
    }

    async fn update_outbox(&mut self, entry: &OutboxEntry) -> ResultEngine<()> {
        outbox::ActiveModel::try_from(entry)?
            .update(&self.tx)
            .await?;
        Ok(())
    }

    async fn delete_outbox(&mut self, id: &str) -> ResultEngine<u64> {
        let res = outbox::Entity::delete_by_id(id.to_string())
            .exec(&self.tx)
            .await?;
        Ok(res.rows_affected)
    }

    async fn clear_outbox(&mut self) -> ResultEngine<u64> {
        let res = outbox::Entity::delete_many().exec(&self.tx).await?;
        Ok(res.rows_affected)
    }

    async fn clear_ledger(&mut self) -> ResultEngine<()> {
        transactions::Entity::delete_many().exec(&self.tx).await?;
        wallets::Entity::delete_many().exec(&self.tx).await?;
        currency::Entity::delete_many().exec(&self.tx).await?;
        app_state::Entity::delete_many().exec(&self.tx).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> ResultEngine<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
