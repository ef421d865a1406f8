use chrono::Utc;

use crate::{
    EngineError, OutboxEntity, OutboxEntry, OutboxOperation, OutboxStatus, ResultEngine,
    util::require_id,
};

use super::{Engine, with_tx};

impl Engine {
    /// Append an entry with status `pending`.
    pub async fn enqueue_outbox(
        &self,
        operation: OutboxOperation,
        entity: OutboxEntity,
        entity_id: &str,
        payload: serde_json::Value,
    ) -> ResultEngine<OutboxEntry> {
        let entry = OutboxEntry::new(operation, entity, entity_id, payload, Utc::now());
        with_tx!(self, |db_tx| db_tx.insert_outbox(&entry).await)?;
        tracing::debug!(
            outbox_id = %entry.id,
            operation = entry.operation.as_str(),
            entity = entry.entity.as_str(),
            entity_id = %entry.entity_id,
            "outbox entry queued"
        );
        Ok(entry)
    }

    /// Pending entries, oldest first.
    pub async fn pending_outbox(&self) -> ResultEngine<Vec<OutboxEntry>> {
        with_tx!(self, |db_tx| {
            db_tx.outbox_entries(Some(OutboxStatus::Pending)).await
        })
    }

    /// Every entry regardless of status, oldest first.
    pub async fn outbox_entries(&self) -> ResultEngine<Vec<OutboxEntry>> {
        with_tx!(self, |db_tx| db_tx.outbox_entries(None).await)
    }

    /// Move an entry to `status`. No retry or requeue logic is attached.
    pub async fn set_outbox_status(
        &self,
        id: &str,
        status: OutboxStatus,
    ) -> ResultEngine<OutboxEntry> {
        let id = require_id(id, "outbox entry")?;
        let entry = with_tx!(self, |db_tx| {
            let mut entry = db_tx
                .outbox_entry(&id)
                .await?
                .ok_or_else(|| EngineError::not_found("outbox entry not exists"))?;
            entry.status = status;
            entry.updated_at = Utc::now();
            db_tx.update_outbox(&entry).await?;
            Ok(entry)
        })?;
        tracing::debug!(outbox_id = %entry.id, status = status.as_str(), "outbox status set");
        Ok(entry)
    }

    pub async fn remove_outbox(&self, id: &str) -> ResultEngine<()> {
        let id = require_id(id, "outbox entry")?;
        with_tx!(self, |db_tx| {
            match db_tx.delete_outbox(&id).await? {
                0 => Err(EngineError::not_found("outbox entry not exists")),
                _ => Ok(()),
            }
        })
    }

    /// Remove every outbox entry in one unit of work.
    pub async fn clear_outbox(&self) -> ResultEngine<u64> {
        let removed = with_tx!(self, |db_tx| db_tx.clear_outbox().await)?;
        tracing::info!(removed, "outbox cleared");
        Ok(removed)
    }

    /// Wipe all local data (ledger, preferences, outbox) in one unit of work.
    pub async fn reset_local_data(&self) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            db_tx.clear_outbox().await?;
            db_tx.clear_ledger().await
        })?;
        tracing::info!("local data reset");
        Ok(())
    }
}
