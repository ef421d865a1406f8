use chrono::Utc;

use crate::{
    EngineError, OutboxEntity, OutboxOperation, ResultEngine, Wallet, WalletIcon,
    store::WalletScope,
    util::{normalize_required_text, require_balance_in_range, require_id},
};

use super::{Engine, with_tx};

impl Engine {
    /// Return a wallet by id, archived or not.
    pub async fn wallet(&self, wallet_id: &str) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            db_tx
                .wallet(wallet_id)
                .await?
                .ok_or_else(|| EngineError::not_found("wallet not exists"))
        })
    }

    /// Add a new wallet.
    ///
    /// `initial_balance` is in minor units and may be negative, up to
    /// [`MAX_AMOUNT`](crate::MAX_AMOUNT) either way. `icon_key` must name one
    /// of [`WalletIcon::ALL`].
    pub async fn new_wallet(
        &self,
        name: &str,
        initial_balance: i64,
        icon_key: &str,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_text(name, "wallet name")?;
        let initial_balance = require_balance_in_range(initial_balance)?;
        let icon = WalletIcon::try_from(icon_key)?;
        let wallet = Wallet::new(name, initial_balance, icon, Utc::now());

        with_tx!(self, |db_tx| db_tx.insert_wallet(&wallet).await)?;
        tracing::info!(wallet_id = %wallet.id, name = %wallet.name, "wallet created");

        self.record(
            OutboxOperation::Create,
            OutboxEntity::Wallet,
            &wallet.id,
            &wallet,
        )
        .await?;
        Ok(wallet)
    }

    /// Rename a wallet and/or change its icon.
    ///
    /// Archived wallets are read-only: editing one fails with
    /// [`EngineError::NotFound`], exactly like editing an unknown id.
    pub async fn edit_wallet(
        &self,
        wallet_id: &str,
        name: &str,
        icon_key: &str,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_text(name, "wallet name")?;
        let icon = WalletIcon::try_from(icon_key)?;

        let wallet = with_tx!(self, |db_tx| {
            let mut wallet = db_tx
                .wallet(wallet_id)
                .await?
                .filter(Wallet::is_active)
                .ok_or_else(|| EngineError::not_found("active wallet not exists"))?;
            wallet.name = name;
            wallet.icon = icon;
            wallet.updated_at = Utc::now();
            db_tx.update_wallet(&wallet).await?;
            Ok(wallet)
        })?;
        tracing::info!(wallet_id = %wallet.id, "wallet edited");

        self.record(
            OutboxOperation::Update,
            OutboxEntity::Wallet,
            &wallet.id,
            &wallet,
        )
        .await?;
        Ok(wallet)
    }

    /// Archive a wallet.
    ///
    /// Idempotent: archiving an archived wallet returns it unchanged and keeps
    /// the original `archived_at`.
    pub async fn archive_wallet(&self, wallet_id: &str) -> ResultEngine<Wallet> {
        let wallet_id = require_id(wallet_id, "wallet")?;
        let (wallet, changed) = with_tx!(self, |db_tx| {
            let mut wallet = db_tx
                .wallet(&wallet_id)
                .await?
                .ok_or_else(|| EngineError::not_found("wallet not exists"))?;
            let changed = wallet.archive(Utc::now());
            if changed {
                db_tx.update_wallet(&wallet).await?;
            }
            Ok((wallet, changed))
        })?;

        if changed {
            tracing::info!(wallet_id = %wallet.id, "wallet archived");
            self.record(
                OutboxOperation::Update,
                OutboxEntity::Wallet,
                &wallet.id,
                &wallet,
            )
            .await?;
        }
        Ok(wallet)
    }

    pub async fn count_active_wallets(&self) -> ResultEngine<usize> {
        Ok(self.active_wallets().await?.len())
    }

    /// Oldest active wallet, if any.
    pub async fn first_active_wallet(&self) -> ResultEngine<Option<Wallet>> {
        Ok(self.active_wallets().await?.into_iter().next())
    }

    /// Active wallets, oldest first.
    pub async fn active_wallets(&self) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| db_tx.wallets(WalletScope::Active).await)
    }

    /// Archived wallets, most recently archived first.
    pub async fn archived_wallets(&self) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| db_tx.wallets(WalletScope::Archived).await)
    }
}
