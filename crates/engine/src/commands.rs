//! Command structs for engine operations.
//!
//! These types group parameters for write operations
//! (income/expense/adjustment/transfer), keeping call sites readable and
//! avoiding long argument lists. Inputs are raw: validation happens in the
//! engine, before anything is written.

use crate::TransactionType;

/// Create or edit an income/expense row.
#[derive(Clone, Debug)]
pub struct IncomeExpenseCmd {
    pub wallet_id: String,
    pub kind: TransactionType,
    pub amount: i64,
    pub category: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub note: Option<String>,
}

impl IncomeExpenseCmd {
    #[must_use]
    pub fn new(
        wallet_id: impl Into<String>,
        kind: TransactionType,
        amount: i64,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            kind,
            amount,
            category: category.into(),
            date: date.into(),
            note: None,
        }
    }

    #[must_use]
    pub fn income(
        wallet_id: impl Into<String>,
        amount: i64,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self::new(wallet_id, TransactionType::Income, amount, category, date)
    }

    #[must_use]
    pub fn expense(
        wallet_id: impl Into<String>,
        amount: i64,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self::new(wallet_id, TransactionType::Expense, amount, category, date)
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create or edit a balance adjustment.
///
/// The sign of `amount` is the direction: positive raises the balance,
/// negative lowers it.
#[derive(Clone, Debug)]
pub struct AdjustmentCmd {
    pub wallet_id: String,
    pub amount: i64,
    pub date: String,
    pub note: Option<String>,
}

impl AdjustmentCmd {
    #[must_use]
    pub fn new(wallet_id: impl Into<String>, amount: i64, date: impl Into<String>) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            amount,
            date: date.into(),
            note: None,
        }
    }

    /// Build from an unsigned magnitude and a direction toggle.
    ///
    /// A magnitude past `i64::MAX` saturates; the engine then rejects it as
    /// out of range.
    #[must_use]
    pub fn with_direction(
        wallet_id: impl Into<String>,
        magnitude: u64,
        increase: bool,
        date: impl Into<String>,
    ) -> Self {
        let magnitude = i64::try_from(magnitude).unwrap_or(i64::MAX);
        let amount = if increase { magnitude } else { -magnitude };
        Self::new(wallet_id, amount, date)
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create or edit a transfer between two wallets.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: i64,
    pub date: String,
    pub note: Option<String>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        from_wallet_id: impl Into<String>,
        to_wallet_id: impl Into<String>,
        amount: i64,
        date: impl Into<String>,
    ) -> Self {
        Self {
            from_wallet_id: from_wallet_id.into(),
            to_wallet_id: to_wallet_id.into(),
            amount,
            date: date.into(),
            note: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_toggle_maps_to_sign() {
        let down = AdjustmentCmd::with_direction("w", 950, false, "2026-02-21");
        assert_eq!(down.amount, -950);
        let up = AdjustmentCmd::with_direction("w", 950, true, "2026-02-21");
        assert_eq!(up.amount, 950);
    }

    #[test]
    fn oversized_magnitude_saturates() {
        let up = AdjustmentCmd::with_direction("w", u64::MAX, true, "2026-02-21");
        assert_eq!(up.amount, i64::MAX);
        let down = AdjustmentCmd::with_direction("w", i64::MIN.unsigned_abs(), false, "2026-02-21");
        assert_eq!(down.amount, -i64::MAX);
    }
}
