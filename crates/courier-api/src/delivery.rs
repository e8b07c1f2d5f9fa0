//! DeliveryService: the network-facing message operations.
//!
//! Sits between the HTTP handlers and [`MessageStore`]: it validates what
//! senders submit, resolves recipients, and exposes the draining and
//! non-draining reads. It never touches plaintext.

use courier_common::{
    config::LimitsConfig,
    error::{CourierError, CourierResult},
    models::envelope::{Envelope, SendMessageRequest},
    validation::{validate_base64_field, validate_request},
};
use courier_db::{repository::identities, store::NewEnvelope, Database, MessageStore};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct DeliveryService {
    pool: SqlitePool,
    store: MessageStore,
    max_payload_bytes: usize,
}

impl DeliveryService {
    pub fn new(db: &Database, limits: &LimitsConfig) -> Self {
        Self {
            pool: db.pool.clone(),
            store: MessageStore::new(db.pool.clone()),
            max_payload_bytes: limits.max_payload_bytes,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Public key of `id`, for senders about to seal a message.
    pub async fn lookup_public_key(&self, id: &str) -> CourierResult<String> {
        identities::public_key(&self.pool, id)
            .await?
            .ok_or_else(|| CourierError::NotFound {
                resource: "User".into(),
            })
    }

    /// Queue an already-sealed message from `sender_id`.
    ///
    /// Nothing is stored unless every field is present and well-formed and the
    /// recipient exists.
    pub async fn submit(&self, sender_id: &str, request: &SendMessageRequest) -> CourierResult<Envelope> {
        validate_request(request)?;
        validate_base64_field(&request.encrypted_message, "encryptedMessage", self.max_payload_bytes)?;
        validate_base64_field(&request.encrypted_aes_key, "encryptedAESKey", self.max_payload_bytes)?;

        if !identities::exists(&self.pool, &request.to).await? {
            tracing::debug!(sender = %sender_id, recipient = %request.to, "Send to unknown recipient");
            return Err(CourierError::recipient_not_found());
        }

        self.store
            .append(
                &request.to,
                NewEnvelope {
                    sender_id,
                    encrypted_message: &request.encrypted_message,
                    encrypted_aes_key: &request.encrypted_aes_key,
                },
            )
            .await
    }

    /// Drain `caller_id`'s pending queue.
    ///
    /// Every successful call empties the queue for good; a client that loses
    /// the response must recover from history.
    pub async fn fetch_pending(&self, caller_id: &str) -> CourierResult<Vec<Envelope>> {
        self.store.drain_pending(caller_id).await
    }

    /// Everything ever delivered to `caller_id`. Does not touch the queue.
    pub async fn fetch_history(&self, caller_id: &str) -> CourierResult<Vec<Envelope>> {
        self.store.read_history(caller_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_db::repository::identities::NewIdentity;

    async fn service(ids: &[&str]) -> DeliveryService {
        let db = Database::in_memory().await.unwrap();
        for id in ids {
            let email = format!("{id}@example.test");
            identities::create_identity(
                &db.pool,
                NewIdentity {
                    id,
                    email: &email,
                    phone: id,
                    password_hash: "x",
                    public_key: &format!("pem for {id}"),
                    private_key: None,
                    created_at: 0,
                },
            )
            .await
            .unwrap();
        }
        DeliveryService::new(&db, &LimitsConfig { max_payload_bytes: 64 })
    }

    fn request(to: &str, message: &str, key: &str) -> SendMessageRequest {
        SendMessageRequest {
            to: to.into(),
            encrypted_message: message.into(),
            encrypted_aes_key: key.into(),
        }
    }

    #[tokio::test]
    async fn lookup_public_key_finds_registered_identity() {
        let delivery = service(&["aaaa1111"]).await;
        assert_eq!(delivery.lookup_public_key("aaaa1111").await.unwrap(), "pem for aaaa1111");
        assert!(matches!(
            delivery.lookup_public_key("zzzz9999").await,
            Err(CourierError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_recipient_is_rejected_and_nothing_stored() {
        let delivery = service(&["aaaa1111", "bbbb2222"]).await;
        let err = delivery
            .submit("aaaa1111", &request("zzzz9999", "Ym9keQ==", "a2V5"))
            .await
            .unwrap_err();
        assert!(matches!(err, CourierError::NotFound { ref resource } if resource == "Recipient"));

        for id in ["aaaa1111", "bbbb2222", "zzzz9999"] {
            assert!(delivery.fetch_history(id).await.unwrap().is_empty());
            assert_eq!(delivery.store().pending_count(id).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn missing_or_malformed_fields_are_validation_errors() {
        let delivery = service(&["aaaa1111", "bbbb2222"]).await;
        let cases = [
            request("", "Ym9keQ==", "a2V5"),
            request("bbbb2222", "", "a2V5"),
            request("bbbb2222", "Ym9keQ==", ""),
            request("bbbb2222", "not base64 at all", "a2V5"),
            request("bbbb2222", &"A".repeat(68), "a2V5"),
        ];
        for case in &cases {
            let err = delivery.submit("aaaa1111", case).await.unwrap_err();
            assert!(matches!(err, CourierError::Validation { .. }), "{case:?} gave {err:?}");
        }
        assert!(delivery.fetch_history("bbbb2222").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_pending_drains_but_history_keeps_everything() {
        let delivery = service(&["aaaa1111", "bbbb2222"]).await;
        let sent = delivery
            .submit("aaaa1111", &request("bbbb2222", "Ym9keQ==", "a2V5"))
            .await
            .unwrap();
        assert_eq!(sent.from, "aaaa1111");

        assert_eq!(delivery.fetch_pending("bbbb2222").await.unwrap(), vec![sent.clone()]);
        assert!(delivery.fetch_pending("bbbb2222").await.unwrap().is_empty());
        assert_eq!(delivery.fetch_history("bbbb2222").await.unwrap(), vec![sent]);
    }
}
