use serde::Serialize;

use crate::{
    EngineError, ResultEngine, Wallet, WalletContext, fold_balance, store::WalletScope,
};

use super::{Engine, with_tx};

/// A wallet together with its folded balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub wallet: Wallet,
    /// `initial_balance` plus the signed amount of every row, in minor units.
    pub balance: i64,
}

impl Engine {
    /// Current balance of a wallet, archived or not.
    ///
    /// Balances are never stored: this folds the wallet's rows on every call.
    pub async fn current_balance(&self, wallet_id: &str) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let wallet = db_tx
                .wallet(wallet_id)
                .await?
                .ok_or_else(|| EngineError::not_found("wallet not exists"))?;
            let rows = db_tx
                .transactions_for_wallets(std::slice::from_ref(&wallet.id))
                .await?;
            fold_balance(wallet.initial_balance, &rows)
        })
    }

    /// Balances of every active wallet, oldest wallet first.
    pub async fn wallet_balances(&self) -> ResultEngine<Vec<WalletBalance>> {
        let balances = with_tx!(self, |db_tx| {
            let wallets = db_tx.wallets(WalletScope::Active).await?;
            let ids: Vec<String> = wallets.iter().map(|w| w.id.clone()).collect();
            let rows = db_tx.transactions_for_wallets(&ids).await?;
            wallets
                .into_iter()
                .map(|wallet| {
                    let balance = fold_balance(
                        wallet.initial_balance,
                        rows.iter().filter(|tx| tx.wallet_id == wallet.id),
                    )?;
                    Ok(WalletBalance { wallet, balance })
                })
                .collect::<ResultEngine<Vec<_>>>()
        })?;
        tracing::debug!(wallets = balances.len(), "folded wallet balances");
        Ok(balances)
    }

    /// Balance of a wallet context: one wallet, or the sum of active wallets
    /// for [`WalletContext::All`].
    pub async fn total_balance(&self, context: &WalletContext) -> ResultEngine<i64> {
        match context {
            WalletContext::All => self
                .wallet_balances()
                .await?
                .iter()
                .try_fold(0i64, |total, b| total.checked_add(b.balance))
                .ok_or_else(|| EngineError::InvalidAmount("total balance overflows".to_string())),
            WalletContext::Wallet(wallet_id) => self.current_balance(wallet_id).await,
        }
    }
}
