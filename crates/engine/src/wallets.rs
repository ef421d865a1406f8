//! The module contains `Wallet` struct and its implementation.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Icon shown next to a wallet. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletIcon {
    Wallet,
    Bank,
    Cash,
    Card,
    Savings,
    Investment,
    Gift,
    Other,
}

impl WalletIcon {
    pub const ALL: [WalletIcon; 8] = [
        WalletIcon::Wallet,
        WalletIcon::Bank,
        WalletIcon::Cash,
        WalletIcon::Card,
        WalletIcon::Savings,
        WalletIcon::Investment,
        WalletIcon::Gift,
        WalletIcon::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Savings => "savings",
            Self::Investment => "investment",
            Self::Gift => "gift",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for WalletIcon {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|icon| icon.as_str() == value)
            .ok_or_else(|| EngineError::validation(format!("unsupported wallet icon: {value}")))
    }
}

/// A wallet.
///
/// A wallet is a place where money is kept: a purse, a bank account, a card.
/// Its balance is never stored: it is folded from `initial_balance` and the
/// wallet's transactions on read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Stable identifier, generated once and never reused.
    pub id: String,
    pub name: String,
    /// Opening balance in minor units. May be negative.
    pub initial_balance: i64,
    pub icon: WalletIcon,
    /// Once set the wallet is read-only and hidden from active listings.
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(name: String, initial_balance: i64, icon: WalletIcon, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name,
            initial_balance,
            icon,
            archived_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_archived()
    }

    /// Marks the wallet archived. Returns `false` when it already was.
    pub(crate) fn archive(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_archived() {
            return false;
        }
        self.archived_at = Some(now);
        self.updated_at = now;
        true
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub initial_balance: i64,
    pub icon_key: String,
    pub archived_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            initial_balance: ActiveValue::Set(value.initial_balance),
            icon_key: ActiveValue::Set(value.icon.as_str().to_string()),
            archived_at: ActiveValue::Set(value.archived_at),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            icon: WalletIcon::try_from(model.icon_key.as_str())?,
            id: model.id,
            name: model.name,
            initial_balance: model.initial_balance,
            archived_at: model.archived_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn wallet() -> Wallet {
        Wallet::new(
            String::from("Cash"),
            10_000,
            WalletIcon::Wallet,
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    #[test]
    fn new_wallet_is_active() {
        let wallet = wallet();
        assert!(wallet.is_active());
        assert_eq!(wallet.created_at, wallet.updated_at);
        assert!(Uuid::parse_str(&wallet.id).is_ok());
    }

    #[test]
    fn archive_is_idempotent() {
        let mut wallet = wallet();
        let first = Utc.timestamp_opt(60, 0).unwrap();
        assert!(wallet.archive(first));
        assert!(!wallet.archive(first + Duration::hours(1)));
        assert_eq!(wallet.archived_at, Some(first));
        assert_eq!(wallet.updated_at, first);
    }

    #[test]
    fn icon_keys_round_trip() {
        for icon in WalletIcon::ALL {
            assert_eq!(WalletIcon::try_from(icon.as_str()).unwrap(), icon);
        }
        assert!(matches!(
            WalletIcon::try_from("rocket"),
            Err(EngineError::Validation(_))
        ));
    }
}
