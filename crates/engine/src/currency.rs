//! Currency catalog and the persisted currency preference.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Fixed key of the singleton preference row.
pub(crate) const CURRENCY_PREFERENCE_ID: &str = "default";

/// ISO currency code supported by the ledger.
///
/// ## Minor units
///
/// Amounts are stored as `i64` **minor units**. `minor_units()` returns how
/// many decimal digits separate major from minor units.
///
/// Example: USD has 2 minor units, so `10.50 USD` ⇄ `1050`; JPY has none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Idr,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 5] = [
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
        CurrencyCode::Jpy,
        CurrencyCode::Idr,
    ];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Idr => "IDR",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            CurrencyCode::Usd => "$",
            CurrencyCode::Eur => "€",
            CurrencyCode::Gbp => "£",
            CurrencyCode::Jpy => "¥",
            CurrencyCode::Idr => "Rp",
        }
    }

    /// Number of fraction digits used when converting to major units.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            CurrencyCode::Jpy | CurrencyCode::Idr => 0,
            CurrencyCode::Usd | CurrencyCode::Eur | CurrencyCode::Gbp => 2,
        }
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let wanted = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|code| code.code() == wanted)
            .ok_or_else(|| EngineError::validation(format!("unsupported currency: {value}")))
    }
}

/// The user's selected display currency.
///
/// Symbol and fraction digits always come from [`CurrencyCode`], never from
/// user input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPreference {
    pub currency_code: CurrencyCode,
    pub currency_symbol: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CurrencyPreference {
    pub fn new(code: CurrencyCode, now: DateTime<Utc>) -> Self {
        Self {
            currency_code: code,
            currency_symbol: code.symbol().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn fraction_digits(&self) -> u8 {
        self.currency_code.minor_units()
    }

    /// Switch to `code`, keeping the original creation time.
    pub(crate) fn with_code(&self, code: CurrencyCode, now: DateTime<Utc>) -> Self {
        Self {
            currency_code: code,
            currency_symbol: code.symbol().to_string(),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "currency_preferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CurrencyPreference> for ActiveModel {
    fn from(value: &CurrencyPreference) -> Self {
        Self {
            id: ActiveValue::Set(CURRENCY_PREFERENCE_ID.to_string()),
            currency_code: ActiveValue::Set(value.currency_code.code().to_string()),
            currency_symbol: ActiveValue::Set(value.currency_symbol.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for CurrencyPreference {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            currency_code: CurrencyCode::try_from(model.currency_code.as_str())?,
            currency_symbol: model.currency_symbol,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(CurrencyCode::try_from(" eur ").unwrap(), CurrencyCode::Eur);
        assert_eq!(CurrencyCode::try_from("IDR").unwrap(), CurrencyCode::Idr);
    }

    #[test]
    fn rejects_unknown_code() {
        let err = CurrencyCode::try_from("XYZ").unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("unsupported currency: XYZ".to_string())
        );
    }

    #[test]
    fn preference_derives_symbol_and_digits() {
        let now = Utc::now();
        let pref = CurrencyPreference::new(CurrencyCode::Jpy, now);
        assert_eq!(pref.currency_symbol, "¥");
        assert_eq!(pref.fraction_digits(), 0);

        let switched = pref.with_code(CurrencyCode::Gbp, now);
        assert_eq!(switched.currency_symbol, "£");
        assert_eq!(switched.fraction_digits(), 2);
        assert_eq!(switched.created_at, pref.created_at);
    }
}
