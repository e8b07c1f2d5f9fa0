//! Message repository: raw queue and history statements.
//!
//! These functions do no locking of their own; go through
//! [`MessageStore`](crate::MessageStore), which serialises per identity.

use courier_common::models::envelope::Envelope;
use sqlx::{SqliteConnection, SqlitePool};

/// A stored envelope row. `seq` orders arrivals and ties queue rows to history rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnvelopeRow {
    pub seq: i64,
    pub recipient_id: String,
    pub sender_id: String,
    pub encrypted_message: String,
    pub encrypted_aes_key: String,
    pub created_at: i64,
}

impl From<EnvelopeRow> for Envelope {
    fn from(row: EnvelopeRow) -> Self {
        Self {
            from: row.sender_id,
            encrypted_message: row.encrypted_message,
            encrypted_aes_key: row.encrypted_aes_key,
            timestamp: row.created_at,
        }
    }
}

/// Insert into history, returning the assigned sequence number.
pub async fn insert_history(
    conn: &mut SqliteConnection,
    recipient_id: &str,
    sender_id: &str,
    encrypted_message: &str,
    encrypted_aes_key: &str,
    created_at: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO message_history (recipient_id, sender_id, encrypted_message, encrypted_aes_key, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING seq
        "#,
    )
    .bind(recipient_id)
    .bind(sender_id)
    .bind(encrypted_message)
    .bind(encrypted_aes_key)
    .bind(created_at)
    .fetch_one(conn)
    .await
}

/// Copy a history row into the pending queue under the same sequence number.
pub async fn insert_pending(conn: &mut SqliteConnection, seq: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO pending_messages (seq, recipient_id, sender_id, encrypted_message, encrypted_aes_key, created_at)
        SELECT seq, recipient_id, sender_id, encrypted_message, encrypted_aes_key, created_at
        FROM message_history WHERE seq = ?
        "#,
    )
    .bind(seq)
    .execute(conn)
    .await?;
    Ok(())
}

/// Remove and return every pending row for `recipient_id` in one statement.
///
/// `RETURNING` order is unspecified, so rows come back sorted by `seq` here.
pub async fn take_pending(pool: &SqlitePool, recipient_id: &str) -> Result<Vec<EnvelopeRow>, sqlx::Error> {
    let mut rows = sqlx::query_as::<_, EnvelopeRow>(
        r#"
        DELETE FROM pending_messages WHERE recipient_id = ?
        RETURNING seq, recipient_id, sender_id, encrypted_message, encrypted_aes_key, created_at
        "#,
    )
    .bind(recipient_id)
    .fetch_all(pool)
    .await?;
    rows.sort_by_key(|row| row.seq);
    Ok(rows)
}

/// Full history for `recipient_id`, oldest first.
pub async fn list_history(pool: &SqlitePool, recipient_id: &str) -> Result<Vec<EnvelopeRow>, sqlx::Error> {
    sqlx::query_as::<_, EnvelopeRow>(
        r#"
        SELECT seq, recipient_id, sender_id, encrypted_message, encrypted_aes_key, created_at
        FROM message_history WHERE recipient_id = ?
        ORDER BY seq ASC
        "#,
    )
    .bind(recipient_id)
    .fetch_all(pool)
    .await
}

/// Number of envelopes waiting for `recipient_id`.
pub async fn count_pending(pool: &SqlitePool, recipient_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pending_messages WHERE recipient_id = ?")
        .bind(recipient_id)
        .fetch_one(pool)
        .await
}
