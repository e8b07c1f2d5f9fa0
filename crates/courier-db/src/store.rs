//! MessageStore: per-identity pending queue plus durable history.
//!
//! Invariants:
//! - an append lands in both history and the queue, or in neither;
//! - a drain is a swap-with-empty: concurrent drains of one identity split
//!   the queue between them, never duplicating or losing an envelope;
//! - every drained envelope is also in history, in the same relative order.

use std::sync::Arc;

use courier_common::{error::CourierResult, models::envelope::Envelope, time::now_millis};
use sqlx::SqlitePool;

use crate::locks::MailboxLocks;
use crate::repository::messages;

/// Ciphertext fields of an envelope before the store stamps it.
#[derive(Debug, Clone, Copy)]
pub struct NewEnvelope<'a> {
    pub sender_id: &'a str,
    pub encrypted_message: &'a str,
    pub encrypted_aes_key: &'a str,
}

#[derive(Clone)]
pub struct MessageStore {
    pool: SqlitePool,
    locks: Arc<MailboxLocks>,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(MailboxLocks::new()),
        }
    }

    /// Append to `recipient_id`'s queue and history in one transaction.
    pub async fn append(&self, recipient_id: &str, envelope: NewEnvelope<'_>) -> CourierResult<Envelope> {
        let _guard = self.locks.acquire(recipient_id).await;
        let created_at = now_millis();

        let mut tx = self.pool.begin().await?;
        let seq = messages::insert_history(
            &mut *tx,
            recipient_id,
            envelope.sender_id,
            envelope.encrypted_message,
            envelope.encrypted_aes_key,
            created_at,
        )
        .await?;
        messages::insert_pending(&mut *tx, seq).await?;
        tx.commit().await?;

        tracing::debug!(recipient = %recipient_id, sender = %envelope.sender_id, seq, "Envelope appended");

        Ok(Envelope {
            from: envelope.sender_id.to_owned(),
            encrypted_message: envelope.encrypted_message.to_owned(),
            encrypted_aes_key: envelope.encrypted_aes_key.to_owned(),
            timestamp: created_at,
        })
    }

    /// Take everything queued for `id`, oldest first, leaving the queue empty.
    pub async fn drain_pending(&self, id: &str) -> CourierResult<Vec<Envelope>> {
        let _guard = self.locks.acquire(id).await;
        let rows = messages::take_pending(&self.pool, id).await?;
        if !rows.is_empty() {
            tracing::debug!(recipient = %id, count = rows.len(), "Pending queue drained");
        }
        Ok(rows.into_iter().map(Envelope::from).collect())
    }

    /// Everything ever addressed to `id`, oldest first. Never mutates.
    pub async fn read_history(&self, id: &str) -> CourierResult<Vec<Envelope>> {
        let rows = messages::list_history(&self.pool, id).await?;
        Ok(rows.into_iter().map(Envelope::from).collect())
    }

    /// Envelopes currently waiting for `id`.
    pub async fn pending_count(&self, id: &str) -> CourierResult<i64> {
        Ok(messages::count_pending(&self.pool, id).await?)
    }
}
