//! Persisted UI state: the last used wallet context.
//!
//! The value is advisory. Nothing in the ledger reads it; consumers that use
//! it as a preselection go through `Engine::resolve_wallet_context`, which
//! re-checks the wallet is still active.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

pub(crate) const APP_STATE_ID: &str = "default";

const ALL_WALLETS: &str = "all";

/// Which wallets a view is filtered on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WalletContext {
    #[default]
    All,
    Wallet(String),
}

impl WalletContext {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_WALLETS,
            Self::Wallet(id) => id,
        }
    }

    /// Parse a stored context: `"all"` or a wallet id.
    pub fn parse(value: &str) -> Result<Self, EngineError> {
        let value = value.trim();
        match value {
            "" => Err(EngineError::validation("wallet context must not be empty")),
            ALL_WALLETS => Ok(Self::All),
            id => Ok(Self::Wallet(id.to_string())),
        }
    }

    #[must_use]
    pub fn wallet_id(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Wallet(id) => Some(id),
        }
    }
}

impl core::fmt::Display for WalletContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WalletContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WalletContext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub selected_wallet_context: WalletContext,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(context: WalletContext, now: DateTime<Utc>) -> Self {
        Self {
            selected_wallet_context: context,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "app_state")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub selected_wallet_context: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&AppState> for ActiveModel {
    fn from(value: &AppState) -> Self {
        Self {
            id: ActiveValue::Set(APP_STATE_ID.to_string()),
            selected_wallet_context: ActiveValue::Set(
                value.selected_wallet_context.as_str().to_string(),
            ),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for AppState {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            selected_wallet_context: WalletContext::parse(&model.selected_wallet_context)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_and_wallet_ids() {
        assert_eq!(WalletContext::parse("all").unwrap(), WalletContext::All);
        assert_eq!(
            WalletContext::parse(" 0195-abc ").unwrap(),
            WalletContext::Wallet("0195-abc".to_string())
        );
        assert!(WalletContext::parse("   ").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&WalletContext::Wallet("w1".to_string())).unwrap();
        assert_eq!(json, "\"w1\"");
        let back: WalletContext = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(back, WalletContext::All);
    }
}
