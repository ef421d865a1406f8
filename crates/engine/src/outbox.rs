//! Outbox of pending mutations.
//!
//! Every domain mutation appends one entry describing what changed. The queue
//! is producer-only: nothing in this crate drains it, status changes and
//! removal exist for a future sync client.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Processing,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for OutboxStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::validation(format!(
                "invalid outbox status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxOperation {
    Create,
    Update,
    Delete,
}

impl OutboxOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl TryFrom<&str> for OutboxOperation {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(EngineError::validation(format!(
                "invalid outbox operation: {other}"
            ))),
        }
    }
}

/// Kind of entity an outbox entry refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxEntity {
    Wallet,
    Transaction,
    Transfer,
    CurrencyPreference,
    AppState,
}

impl OutboxEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Transaction => "transaction",
            Self::Transfer => "transfer",
            Self::CurrencyPreference => "currency_preference",
            Self::AppState => "app_state",
        }
    }
}

impl TryFrom<&str> for OutboxEntity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "wallet" => Ok(Self::Wallet),
            "transaction" => Ok(Self::Transaction),
            "transfer" => Ok(Self::Transfer),
            "currency_preference" => Ok(Self::CurrencyPreference),
            "app_state" => Ok(Self::AppState),
            other => Err(EngineError::validation(format!(
                "invalid outbox entity: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub id: String,
    pub operation: OutboxOperation,
    pub entity: OutboxEntity,
    pub entity_id: String,
    /// Opaque snapshot of the entity. Consumers must not rely on its shape.
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboxEntry {
    pub fn new(
        operation: OutboxOperation,
        entity: OutboxEntity,
        entity_id: impl Into<String>,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            operation,
            entity,
            entity_id: entity_id.into(),
            payload,
            status: OutboxStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "outbox")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub operation_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub payload: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&OutboxEntry> for ActiveModel {
    type Error = EngineError;

    fn try_from(entry: &OutboxEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(entry.id.clone()),
            operation_type: ActiveValue::Set(entry.operation.as_str().to_string()),
            entity_type: ActiveValue::Set(entry.entity.as_str().to_string()),
            entity_id: ActiveValue::Set(entry.entity_id.clone()),
            payload: ActiveValue::Set(serde_json::to_string(&entry.payload)?),
            status: ActiveValue::Set(entry.status.as_str().to_string()),
            created_at: ActiveValue::Set(entry.created_at),
            updated_at: ActiveValue::Set(entry.updated_at),
        })
    }
}

impl TryFrom<Model> for OutboxEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            operation: OutboxOperation::try_from(model.operation_type.as_str())?,
            entity: OutboxEntity::try_from(model.entity_type.as_str())?,
            status: OutboxStatus::try_from(model.status.as_str())?,
            payload: serde_json::from_str(&model.payload)?,
            id: model.id,
            entity_id: model.entity_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
