//! Paired transfer legs.
//!
//! A transfer is either absent or fully present: one `transfer_out` row on
//! the source wallet and one `transfer_in` row on the destination wallet,
//! sharing a `transfer_id` and carrying the same amount, date and note. Every
//! operation below writes both legs inside a single unit of work.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, OutboxEntity, OutboxOperation, ResultEngine, TRANSFER_CATEGORY, Transaction,
    TransactionType, TransferCmd,
    store::{StoreTx, WalletScope},
    util::{normalize_optional_text, parse_date, require_id, require_positive_amount},
};

use super::{Engine, with_tx};

/// Both legs of a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPair {
    pub transfer_id: String,
    /// `transfer_out` leg, on the source wallet.
    pub outflow: Transaction,
    /// `transfer_in` leg, on the destination wallet.
    pub inflow: Transaction,
}

impl TransferPair {
    /// Assemble a pair from the rows stored under `transfer_id`.
    ///
    /// No rows is [`EngineError::NotFound`]; anything other than exactly one
    /// leg of each direction is [`EngineError::IncompleteTransfer`].
    fn from_legs(transfer_id: &str, legs: Vec<Transaction>) -> ResultEngine<Self> {
        if legs.is_empty() {
            return Err(EngineError::not_found("transfer not exists"));
        }

        let mut outflow = None;
        let mut inflow = None;
        for leg in legs {
            let slot = match leg.kind {
                TransactionType::TransferOut => &mut outflow,
                TransactionType::TransferIn => &mut inflow,
                other => {
                    return Err(EngineError::IncompleteTransfer(format!(
                        "transfer {transfer_id} has a {} row",
                        other.as_str()
                    )));
                }
            };
            if slot.replace(leg).is_some() {
                return Err(EngineError::IncompleteTransfer(format!(
                    "transfer {transfer_id} has more than two legs"
                )));
            }
        }

        match (outflow, inflow) {
            (Some(outflow), Some(inflow)) => Ok(Self {
                transfer_id: transfer_id.to_string(),
                outflow,
                inflow,
            }),
            (None, _) => Err(EngineError::IncompleteTransfer(format!(
                "transfer {transfer_id} is missing its transfer_out leg"
            ))),
            (_, None) => Err(EngineError::IncompleteTransfer(format!(
                "transfer {transfer_id} is missing its transfer_in leg"
            ))),
        }
    }
}

struct ValidatedTransfer {
    from_wallet_id: String,
    to_wallet_id: String,
    amount: i64,
    date: NaiveDate,
    note: Option<String>,
}

impl ValidatedTransfer {
    fn new(cmd: &TransferCmd) -> ResultEngine<Self> {
        let from_wallet_id = require_id(&cmd.from_wallet_id, "source wallet")?;
        let to_wallet_id = require_id(&cmd.to_wallet_id, "destination wallet")?;
        if from_wallet_id == to_wallet_id {
            return Err(EngineError::validation(
                "source and destination wallets must differ",
            ));
        }
        Ok(Self {
            from_wallet_id,
            to_wallet_id,
            amount: require_positive_amount(cmd.amount)?,
            date: parse_date(&cmd.date)?,
            note: normalize_optional_text(cmd.note.as_deref()),
        })
    }

    fn leg(&self, kind: TransactionType, transfer_id: &str) -> Transaction {
        let wallet_id = match kind {
            TransactionType::TransferOut => self.from_wallet_id.clone(),
            _ => self.to_wallet_id.clone(),
        };
        Transaction::new(
            kind,
            wallet_id,
            self.amount,
            TRANSFER_CATEGORY.to_string(),
            self.date,
            self.note.clone(),
            Some(transfer_id.to_string()),
            Utc::now(),
        )
    }

    /// Move an existing leg to the new values. Identity fields stay.
    fn apply_to(&self, leg: &mut Transaction, wallet_id: &str) {
        leg.wallet_id = wallet_id.to_string();
        leg.amount = self.amount;
        leg.date = self.date;
        leg.note = self.note.clone();
        leg.updated_at = Utc::now();
    }

    /// Both endpoints must be in the active wallet set, read inside the
    /// current unit of work.
    async fn require_active_endpoints(&self, db_tx: &mut dyn StoreTx) -> ResultEngine<()> {
        let active = db_tx.wallets(WalletScope::Active).await?;
        for (label, wallet_id) in [
            ("source", &self.from_wallet_id),
            ("destination", &self.to_wallet_id),
        ] {
            if active.iter().any(|w| &w.id == wallet_id) {
                continue;
            }
            let message = match db_tx.wallet(wallet_id).await? {
                Some(_) => format!(
                    "archived wallet cannot be a transfer endpoint ({label} {wallet_id})"
                ),
                None => format!("{label} wallet {wallet_id} does not exist"),
            };
            return Err(EngineError::Validation(message));
        }
        Ok(())
    }
}

/// Delete every row of `transfer_id` and return what was removed.
pub(super) async fn remove_transfer_pair(
    db_tx: &mut dyn StoreTx,
    transfer_id: &str,
) -> ResultEngine<Vec<Transaction>> {
    let legs = db_tx.transactions_by_transfer(transfer_id).await?;
    if legs.is_empty() {
        return Err(EngineError::not_found("transfer not exists"));
    }
    db_tx.delete_transfer(transfer_id).await?;
    Ok(legs)
}

impl Engine {
    /// Move money between two active wallets.
    ///
    /// Both legs are inserted in one unit of work: either the pair exists
    /// afterwards or nothing was written.
    pub async fn new_transfer(&self, cmd: TransferCmd) -> ResultEngine<TransferPair> {
        let transfer = ValidatedTransfer::new(&cmd)?;
        let transfer_id = Uuid::now_v7().to_string();
        let pair = TransferPair {
            outflow: transfer.leg(TransactionType::TransferOut, &transfer_id),
            inflow: transfer.leg(TransactionType::TransferIn, &transfer_id),
            transfer_id,
        };

        with_tx!(self, |db_tx| {
            transfer.require_active_endpoints(db_tx.as_mut()).await?;
            db_tx.insert_transaction(&pair.outflow).await?;
            db_tx.insert_transaction(&pair.inflow).await?;
            Ok(())
        })?;
        tracing::info!(
            transfer_id = %pair.transfer_id,
            from = %pair.outflow.wallet_id,
            to = %pair.inflow.wallet_id,
            amount = pair.outflow.amount,
            "transfer created"
        );

        self.record(
            OutboxOperation::Create,
            OutboxEntity::Transfer,
            &pair.transfer_id,
            &pair,
        )
        .await?;
        Ok(pair)
    }

    /// Rewrite both legs of a transfer.
    ///
    /// Either leg may move to another active wallet. Ids, types, category,
    /// transfer id and creation times never change. A pair with a missing leg
    /// fails with [`EngineError::IncompleteTransfer`] and nothing is written.
    pub async fn edit_transfer(
        &self,
        transfer_id: &str,
        cmd: TransferCmd,
    ) -> ResultEngine<TransferPair> {
        let transfer_id = require_id(transfer_id, "transfer")?;
        let transfer = ValidatedTransfer::new(&cmd)?;

        let pair = with_tx!(self, |db_tx| {
            transfer.require_active_endpoints(db_tx.as_mut()).await?;
            let legs = db_tx.transactions_by_transfer(&transfer_id).await?;
            let mut pair = TransferPair::from_legs(&transfer_id, legs).inspect_err(|err| {
                if let EngineError::IncompleteTransfer(reason) = err {
                    tracing::warn!(
                transfer_id = %transfer_id,
                reason = %reason,
                "refusing to edit transfer"
            );
                }
            })?;
            transfer.apply_to(&mut pair.outflow, &transfer.from_wallet_id);
            transfer.apply_to(&mut pair.inflow, &transfer.to_wallet_id);
            db_tx.update_transaction(&pair.outflow).await?;
            db_tx.update_transaction(&pair.inflow).await?;
            Ok(pair)
        })?;
        tracing::info!(transfer_id = %pair.transfer_id, "transfer edited");

        self.record(
            OutboxOperation::Update,
            OutboxEntity::Transfer,
            &pair.transfer_id,
            &pair,
        )
        .await?;
        Ok(pair)
    }

    /// Delete both legs of a transfer. Returns the number of rows removed.
    pub async fn delete_transfer(&self, transfer_id: &str) -> ResultEngine<u64> {
        let transfer_id = require_id(transfer_id, "transfer")?;
        let removed = with_tx!(self, |db_tx| {
            remove_transfer_pair(db_tx.as_mut(), &transfer_id).await
        })?;
        tracing::info!(transfer_id = %transfer_id, rows = removed.len(), "transfer deleted");

        self.record(
            OutboxOperation::Delete,
            OutboxEntity::Transfer,
            &transfer_id,
            &removed,
        )
        .await?;
        Ok(removed.len() as u64)
    }

    /// Every row stored under `transfer_id`. Empty when the transfer is
    /// absent.
    pub async fn transfer_legs(&self, transfer_id: &str) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| db_tx.transactions_by_transfer(transfer_id).await)
    }

    /// The typed pair stored under `transfer_id`.
    pub async fn transfer_pair(&self, transfer_id: &str) -> ResultEngine<TransferPair> {
        let legs = self.transfer_legs(transfer_id).await?;
        TransferPair::from_legs(transfer_id, legs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd() -> TransferCmd {
        TransferCmd::new("cash", "bank", 2_500, "2026-02-21").note("  rent  ")
    }

    #[test]
    fn legs_mirror_each_other() {
        let transfer = ValidatedTransfer::new(&cmd()).unwrap();
        let out = transfer.leg(TransactionType::TransferOut, "t1");
        let inn = transfer.leg(TransactionType::TransferIn, "t1");

        assert_eq!(out.wallet_id, "cash");
        assert_eq!(inn.wallet_id, "bank");
        assert_eq!(out.amount, inn.amount);
        assert_eq!(out.date, inn.date);
        assert_eq!(out.note.as_deref(), Some("rent"));
        assert_eq!(out.note, inn.note);
        assert_eq!(out.category, TRANSFER_CATEGORY);
        assert_eq!(out.transfer_id.as_deref(), Some("t1"));
        assert_ne!(out.id, inn.id);
    }

    #[test]
    fn same_wallet_is_rejected() {
        let err = ValidatedTransfer::new(&TransferCmd::new("cash", "cash", 1, "2026-02-21"))
            .err()
            .unwrap();
        assert_eq!(
            err,
            EngineError::Validation("source and destination wallets must differ".to_string())
        );
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for amount in [0, -10] {
            let cmd = TransferCmd::new("cash", "bank", amount, "2026-02-21");
            assert!(matches!(
                ValidatedTransfer::new(&cmd),
                Err(EngineError::Validation(_))
            ));
        }
    }

    #[test]
    fn pair_requires_both_directions() {
        let transfer = ValidatedTransfer::new(&cmd()).unwrap();
        let out = transfer.leg(TransactionType::TransferOut, "t1");
        let inn = transfer.leg(TransactionType::TransferIn, "t1");

        let pair = TransferPair::from_legs("t1", vec![inn.clone(), out.clone()]).unwrap();
        assert_eq!(pair.outflow, out);
        assert_eq!(pair.inflow, inn);

        assert!(matches!(
            TransferPair::from_legs("t1", vec![out.clone()]),
            Err(EngineError::IncompleteTransfer(_))
        ));
        assert!(matches!(
            TransferPair::from_legs("t1", vec![out.clone(), out]),
            Err(EngineError::IncompleteTransfer(_))
        ));
        assert_eq!(
            TransferPair::from_legs("t1", Vec::new()).unwrap_err(),
            EngineError::NotFound("transfer not exists".to_string())
        );
    }
}
