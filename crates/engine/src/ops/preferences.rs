//! Singleton preference rows: display currency and last used wallet context.
//!
//! Both rows are created lazily on first read with their defaults and
//! replaced wholesale on save.

use chrono::Utc;

use crate::{
    AppState, CurrencyCode, CurrencyPreference, OutboxEntity, OutboxOperation, ResultEngine,
    WalletContext, app_state::APP_STATE_ID, currency::CURRENCY_PREFERENCE_ID,
    store::WalletScope,
};

use super::{Engine, with_tx};

impl Engine {
    /// The selected currency, `USD` until one is saved.
    pub async fn selected_currency(&self) -> ResultEngine<CurrencyPreference> {
        with_tx!(self, |db_tx| {
            match db_tx.currency_preference().await? {
                Some(pref) => Ok(pref),
                None => {
                    let pref = CurrencyPreference::new(CurrencyCode::default(), Utc::now());
                    db_tx.put_currency_preference(&pref).await?;
                    tracing::debug!(code = %pref.currency_code, "initialised currency preference");
                    Ok(pref)
                }
            }
        })
    }

    /// Select a currency by ISO code. Symbol and fraction digits come from
    /// the built-in table.
    pub async fn save_currency_preference(&self, code: &str) -> ResultEngine<CurrencyPreference> {
        let code = CurrencyCode::try_from(code)?;
        let pref = with_tx!(self, |db_tx| {
            let now = Utc::now();
            let pref = match db_tx.currency_preference().await? {
                Some(existing) => existing.with_code(code, now),
                None => CurrencyPreference::new(code, now),
            };
            db_tx.put_currency_preference(&pref).await?;
            Ok(pref)
        })?;
        tracing::info!(code = %pref.currency_code, "currency preference saved");

        self.record(
            OutboxOperation::Update,
            OutboxEntity::CurrencyPreference,
            CURRENCY_PREFERENCE_ID,
            &pref,
        )
        .await?;
        Ok(pref)
    }

    /// The stored wallet context, `all` until one is saved.
    ///
    /// The value is returned as stored. Use
    /// [`resolve_wallet_context`](Self::resolve_wallet_context) for a
    /// preselection that is guaranteed to point at an active wallet.
    pub async fn last_used_wallet_context(&self) -> ResultEngine<WalletContext> {
        let state = with_tx!(self, |db_tx| {
            match db_tx.app_state().await? {
                Some(state) => Ok(state),
                None => {
                    let state = AppState::new(WalletContext::All, Utc::now());
                    db_tx.put_app_state(&state).await?;
                    Ok(state)
                }
            }
        })?;
        Ok(state.selected_wallet_context)
    }

    pub async fn save_last_used_wallet_context(
        &self,
        context: WalletContext,
    ) -> ResultEngine<AppState> {
        // Round-trip through the parser so blank ids are rejected.
        let context = WalletContext::parse(context.as_str())?;
        let state = with_tx!(self, |db_tx| {
            let now = Utc::now();
            let state = match db_tx.app_state().await? {
                Some(existing) => AppState {
                    selected_wallet_context: context,
                    created_at: existing.created_at,
                    updated_at: now,
                },
                None => AppState::new(context, now),
            };
            db_tx.put_app_state(&state).await?;
            Ok(state)
        })?;
        tracing::debug!(context = %state.selected_wallet_context, "wallet context saved");

        self.record(
            OutboxOperation::Update,
            OutboxEntity::AppState,
            APP_STATE_ID,
            &state,
        )
        .await?;
        Ok(state)
    }

    /// The stored wallet context, re-checked against the active wallets.
    ///
    /// Falls back to [`WalletContext::All`] when the stored wallet was
    /// archived or no longer exists.
    pub async fn resolve_wallet_context(&self) -> ResultEngine<WalletContext> {
        let stored = self.last_used_wallet_context().await?;
        let Some(wallet_id) = stored.wallet_id() else {
            return Ok(stored);
        };
        let still_active = with_tx!(self, |db_tx| {
            let active = db_tx.wallets(WalletScope::Active).await?;
            Ok(active.iter().any(|w| w.id == wallet_id))
        })?;
        if still_active {
            Ok(stored)
        } else {
            tracing::debug!(wallet_id, "stored wallet context is stale, using all");
            Ok(WalletContext::All)
        }
    }
}
