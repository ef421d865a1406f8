use chrono::{NaiveDate, Utc};

use crate::{
    ADJUSTMENT_CATEGORY, AdjustmentCmd, EngineError, IncomeExpenseCmd, OutboxEntity,
    OutboxOperation, ResultEngine, Transaction, TransactionType,
    store::StoreTx,
    util::{
        normalize_optional_text, normalize_required_text, parse_date, require_id,
        require_non_zero_amount, require_positive_amount,
    },
};

use super::{Engine, transfers::remove_transfer_pair, with_tx};

/// Validated fields shared by create and edit.
struct ValidatedRow {
    wallet_id: String,
    kind: TransactionType,
    amount: i64,
    category: String,
    date: NaiveDate,
    note: Option<String>,
}

impl ValidatedRow {
    fn income_expense(cmd: &IncomeExpenseCmd) -> ResultEngine<Self> {
        let wallet_id = require_id(&cmd.wallet_id, "wallet")?;
        if !cmd.kind.is_income_expense() {
            return Err(EngineError::validation(format!(
                "expected income or expense, got {}",
                cmd.kind.as_str()
            )));
        }
        Ok(Self {
            wallet_id,
            kind: cmd.kind,
            amount: require_positive_amount(cmd.amount)?,
            category: normalize_required_text(&cmd.category, "category")?,
            date: parse_date(&cmd.date)?,
            note: normalize_optional_text(cmd.note.as_deref()),
        })
    }

    fn adjustment(cmd: &AdjustmentCmd) -> ResultEngine<Self> {
        Ok(Self {
            wallet_id: require_id(&cmd.wallet_id, "wallet")?,
            kind: TransactionType::Adjustment,
            amount: require_non_zero_amount(cmd.amount)?,
            category: ADJUSTMENT_CATEGORY.to_string(),
            date: parse_date(&cmd.date)?,
            note: normalize_optional_text(cmd.note.as_deref()),
        })
    }

    fn into_transaction(self) -> Transaction {
        Transaction::new(
            self.kind,
            self.wallet_id,
            self.amount,
            self.category,
            self.date,
            self.note,
            None,
            Utc::now(),
        )
    }

    /// Overwrite the mutable fields of `tx`; id, transfer id and creation
    /// time are kept.
    fn apply_to(self, tx: &mut Transaction) {
        tx.wallet_id = self.wallet_id;
        tx.kind = self.kind;
        tx.amount = self.amount;
        tx.category = self.category;
        tx.date = self.date;
        tx.note = self.note;
        tx.updated_at = Utc::now();
    }
}

async fn require_wallet(db_tx: &mut dyn StoreTx, wallet_id: &str) -> ResultEngine<()> {
    if db_tx.wallet(wallet_id).await?.is_none() {
        return Err(EngineError::validation(format!(
            "wallet {wallet_id} does not exist"
        )));
    }
    Ok(())
}

impl Engine {
    /// Return a single ledger row.
    pub async fn transaction(&self, id: &str) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            db_tx
                .transaction(id)
                .await?
                .ok_or_else(|| EngineError::not_found("transaction not exists"))
        })
    }

    /// Rows of the given wallets, newest date first.
    pub async fn transactions_for_wallets(
        &self,
        wallet_ids: &[String],
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| db_tx.transactions_for_wallets(wallet_ids).await)
    }

    /// Record an income or an expense.
    pub async fn new_income_expense(&self, cmd: IncomeExpenseCmd) -> ResultEngine<Transaction> {
        let row = ValidatedRow::income_expense(&cmd)?;
        self.insert_single_row(row).await
    }

    /// Record a balance adjustment. The sign of `cmd.amount` is the direction.
    pub async fn new_adjustment(&self, cmd: AdjustmentCmd) -> ResultEngine<Transaction> {
        let row = ValidatedRow::adjustment(&cmd)?;
        self.insert_single_row(row).await
    }

    /// Edit an income/expense row in place. The type may switch between
    /// income and expense.
    pub async fn edit_income_expense(
        &self,
        id: &str,
        cmd: IncomeExpenseCmd,
    ) -> ResultEngine<Transaction> {
        let row = ValidatedRow::income_expense(&cmd)?;
        self.update_single_row(id, row, TransactionType::is_income_expense)
            .await
    }

    /// Edit an adjustment row in place.
    pub async fn edit_adjustment(&self, id: &str, cmd: AdjustmentCmd) -> ResultEngine<Transaction> {
        let row = ValidatedRow::adjustment(&cmd)?;
        self.update_single_row(id, row, |kind| kind == TransactionType::Adjustment)
            .await
    }

    /// Delete a ledger row.
    ///
    /// A transfer leg is never removed alone: the whole pair goes, in the same
    /// unit of work. Returns the number of rows deleted.
    pub async fn delete_transaction(&self, id: &str) -> ResultEngine<u64> {
        let id = require_id(id, "transaction")?;
        let (target, removed) = with_tx!(self, |db_tx| {
            let target = db_tx
                .transaction(&id)
                .await?
                .ok_or_else(|| EngineError::not_found("transaction not exists"))?;
            let removed = match target.transfer_id.as_deref() {
                Some(transfer_id) => remove_transfer_pair(db_tx.as_mut(), transfer_id).await?,
                None => {
                    db_tx.delete_transaction(&id).await?;
                    vec![target.clone()]
                }
            };
            Ok((target, removed))
        })?;

        match target.transfer_id.as_deref() {
            Some(transfer_id) => {
                tracing::info!(transfer_id, transaction_id = %id, "transfer deleted via leg");
                self.record(
                    OutboxOperation::Delete,
                    OutboxEntity::Transfer,
                    transfer_id,
                    &removed,
                )
                .await?;
            }
            None => {
                tracing::info!(transaction_id = %id, "transaction deleted");
                self.record(
                    OutboxOperation::Delete,
                    OutboxEntity::Transaction,
                    &id,
                    &target,
                )
                .await?;
            }
        }
        Ok(removed.len() as u64)
    }

    async fn insert_single_row(&self, row: ValidatedRow) -> ResultEngine<Transaction> {
        let tx = row.into_transaction();
        with_tx!(self, |db_tx| {
            require_wallet(db_tx.as_mut(), &tx.wallet_id).await?;
            db_tx.insert_transaction(&tx).await
        })?;
        tracing::info!(
            transaction_id = %tx.id,
            wallet_id = %tx.wallet_id,
            kind = tx.kind.as_str(),
            amount = tx.amount,
            "transaction created"
        );

        self.record(
            OutboxOperation::Create,
            OutboxEntity::Transaction,
            &tx.id,
            &tx,
        )
        .await?;
        Ok(tx)
    }

    async fn update_single_row(
        &self,
        id: &str,
        row: ValidatedRow,
        kind_matches: impl Fn(TransactionType) -> bool + Send,
    ) -> ResultEngine<Transaction> {
        let id = require_id(id, "transaction")?;
        let tx = with_tx!(self, |db_tx| {
            let mut tx = db_tx
                .transaction(&id)
                .await?
                .filter(|tx| kind_matches(tx.kind))
                .ok_or_else(|| EngineError::not_found("transaction not exists"))?;
            require_wallet(db_tx.as_mut(), &row.wallet_id).await?;
            row.apply_to(&mut tx);
            db_tx.update_transaction(&tx).await?;
            Ok(tx)
        })?;
        tracing::info!(transaction_id = %tx.id, "transaction edited");

        self.record(
            OutboxOperation::Update,
            OutboxEntity::Transaction,
            &tx.id,
            &tx,
        )
        .await?;
        Ok(tx)
    }
}
