//! Ledger rows.
//!
//! A `Transaction` is a single row against one wallet. Transfers are two rows
//! (`transfer_out` + `transfer_in`) sharing a `transfer_id`.
//!
//! Amounts are integer **minor units**. Income, expense and transfer legs
//! store a non-negative magnitude and the type gives the direction;
//! adjustments store a signed amount. [`signed_amount`] is the only place
//! that turns a row into a balance delta.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Category stored on both legs of a transfer.
pub const TRANSFER_CATEGORY: &str = "Transfer";
/// Category stored on balance adjustments.
pub const ADJUSTMENT_CATEGORY: &str = "Adjustment";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
    TransferIn,
    TransferOut,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::Adjustment => "adjustment",
        }
    }

    #[must_use]
    pub fn is_transfer(self) -> bool {
        matches!(self, Self::TransferIn | Self::TransferOut)
    }

    #[must_use]
    pub fn is_income_expense(self) -> bool {
        matches!(self, Self::Income | Self::Expense)
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer_in" => Ok(Self::TransferIn),
            "transfer_out" => Ok(Self::TransferOut),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(EngineError::validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub wallet_id: String,
    pub amount: i64,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
    /// Shared by the two legs of a transfer, `None` otherwise.
    pub transfer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        kind: TransactionType,
        wallet_id: String,
        amount: i64,
        category: String,
        date: NaiveDate,
        note: Option<String>,
        transfer_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            kind,
            wallet_id,
            amount,
            category,
            date,
            note,
            transfer_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Balance delta of this row. See [`signed_amount`].
    pub fn signed_amount(&self) -> ResultEngine<i64> {
        signed_amount(self)
    }
}

/// Balance delta contributed by `tx` to its wallet.
///
/// - `income` / `transfer_in` → `+amount`
/// - `expense` / `transfer_out` → `-|amount|`
/// - `adjustment` → `amount` as stored (already signed)
///
/// Fails with [`EngineError::InvalidAmount`] for an outflow of `i64::MIN`.
pub fn signed_amount(tx: &Transaction) -> ResultEngine<i64> {
    match tx.kind {
        TransactionType::Income | TransactionType::TransferIn => Ok(tx.amount),
        TransactionType::Expense | TransactionType::TransferOut => tx
            .amount
            .checked_abs()
            .map(|abs| -abs)
            .ok_or_else(|| overflow(&tx.id)),
        TransactionType::Adjustment => Ok(tx.amount),
    }
}

/// Fold `transactions` on top of `initial_balance` with checked arithmetic.
pub fn fold_balance<'a>(
    initial_balance: i64,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> ResultEngine<i64> {
    transactions
        .into_iter()
        .try_fold(initial_balance, |balance, tx| {
            balance
                .checked_add(signed_amount(tx)?)
                .ok_or_else(|| overflow(&tx.id))
        })
}

fn overflow(transaction_id: &str) -> EngineError {
    EngineError::InvalidAmount(format!(
        "balance overflows at transaction {transaction_id}"
    ))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub wallet_id: String,
    pub amount: i64,
    pub category: String,
    pub date: Date,
    pub note: Option<String>,
    pub transfer_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            wallet_id: ActiveValue::Set(tx.wallet_id.clone()),
            amount: ActiveValue::Set(tx.amount),
            category: ActiveValue::Set(tx.category.clone()),
            date: ActiveValue::Set(tx.date),
            note: ActiveValue::Set(tx.note.clone()),
            transfer_id: ActiveValue::Set(tx.transfer_id.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: TransactionType::try_from(model.kind.as_str())?,
            id: model.id,
            wallet_id: model.wallet_id,
            amount: model.amount,
            category: model.category,
            date: model.date,
            note: model.note,
            transfer_id: model.transfer_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionType, amount: i64) -> Transaction {
        Transaction::new(
            kind,
            "wallet".to_string(),
            amount,
            "Misc".to_string(),
            NaiveDate::from_ymd_opt(2026, 2, 21).unwrap(),
            None,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn signed_amount_follows_type() {
        let cases = [
            (TransactionType::Income, 500, 500),
            (TransactionType::TransferIn, 500, 500),
            (TransactionType::Expense, 500, -500),
            (TransactionType::TransferOut, 500, -500),
            (TransactionType::Adjustment, -950, -950),
            (TransactionType::Adjustment, 120, 120),
        ];
        for (kind, amount, expected) in cases {
            assert_eq!(signed_amount(&tx(kind, amount)).unwrap(), expected);
        }
    }

    #[test]
    fn outflows_never_add_even_if_stored_negative() {
        assert_eq!(signed_amount(&tx(TransactionType::Expense, -300)).unwrap(), -300);
        assert_eq!(
            signed_amount(&tx(TransactionType::TransferOut, -300)).unwrap(),
            -300
        );
    }

    #[test]
    fn fold_starts_from_initial_balance() {
        let rows = [
            tx(TransactionType::Income, 2_000),
            tx(TransactionType::Expense, 500),
            tx(TransactionType::Adjustment, -950),
        ];
        assert_eq!(fold_balance(10_000, &rows).unwrap(), 10_550);
        assert_eq!(fold_balance(-100, std::iter::empty()).unwrap(), -100);
    }

    #[test]
    fn fold_reports_overflow_instead_of_wrapping() {
        let up = [tx(TransactionType::Income, 1)];
        assert!(matches!(
            fold_balance(i64::MAX, &up),
            Err(EngineError::InvalidAmount(_))
        ));

        let down = [tx(TransactionType::Adjustment, i64::MIN)];
        assert!(matches!(
            fold_balance(-1, &down),
            Err(EngineError::InvalidAmount(_))
        ));

        assert!(matches!(
            signed_amount(&tx(TransactionType::Expense, i64::MIN)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn type_names_round_trip() {
        for kind in [
            TransactionType::Income,
            TransactionType::Expense,
            TransactionType::TransferIn,
            TransactionType::TransferOut,
            TransactionType::Adjustment,
        ] {
            assert_eq!(TransactionType::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionType::try_from("refund").is_err());
    }
}
