//! Background inbox sync.
//!
//! [`ClientSync`] owns the local, decrypted message list. On start it restores
//! the full history once, then drains the pending queue on a fixed interval
//! and prepends whatever arrived. Ciphertext that will not open still gets an
//! entry, shown as [`DECRYPTION_FAILED`].
//!
//! Because a drain is destructive on the server, a batch lost in transit is
//! only recoverable through a later history restore.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier_common::{crypto::open, models::envelope::Envelope};
use rsa::RsaPrivateKey;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Poll period used when the caller has no preference.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Display text for a message that could not be opened.
pub const DECRYPTION_FAILED: &str = "[Decryption failed]";

/// Where envelopes come from. The REST client in production, fakes in tests.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Drain the caller's pending queue.
    async fn fetch_pending(&self) -> Result<Vec<Envelope>>;
    /// Read the caller's full history without draining.
    async fn fetch_history(&self) -> Result<Vec<Envelope>>;
}

#[async_trait]
impl<T: MessageSource + ?Sized> MessageSource for Arc<T> {
    async fn fetch_pending(&self) -> Result<Vec<Envelope>> {
        (**self).fetch_pending().await
    }

    async fn fetch_history(&self) -> Result<Vec<Envelope>> {
        (**self).fetch_history().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Undecryptable,
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Undecryptable => f.write_str(DECRYPTION_FAILED),
        }
    }
}

/// One entry of the local message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub from: String,
    pub timestamp: i64,
    pub body: MessageBody,
    ciphertext: String,
}

impl ReceivedMessage {
    fn same_envelope(&self, envelope: &Envelope) -> bool {
        self.timestamp == envelope.timestamp
            && self.from == envelope.from
            && self.ciphertext == envelope.encrypted_message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The fetch completed; this many entries were added to the list.
    Applied(usize),
    /// Another sync was already in flight.
    Skipped,
}

/// Clears the in-flight flag on drop, including on early return.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ClientSync<S> {
    source: S,
    private_key: RsaPrivateKey,
    /// Newest first.
    messages: RwLock<Vec<ReceivedMessage>>,
    in_flight: AtomicBool,
}

impl<S: MessageSource> ClientSync<S> {
    pub fn new(source: S, private_key: RsaPrivateKey) -> Self {
        Self {
            source,
            private_key,
            messages: RwLock::new(Vec::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> SyncState {
        if self.in_flight.load(Ordering::Acquire) {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    /// Snapshot of the local list, newest first.
    pub async fn messages(&self) -> Vec<ReceivedMessage> {
        self.messages.read().await.clone()
    }

    /// Replace the local list with the decrypted server history.
    pub async fn restore_history(&self) -> Result<SyncOutcome> {
        let Some(_guard) = InFlight::try_acquire(&self.in_flight) else {
            return Ok(SyncOutcome::Skipped);
        };

        let envelopes = self.source.fetch_history().await?;
        let restored: Vec<_> = envelopes
            .into_iter()
            .rev()
            .map(|envelope| self.decrypt(envelope))
            .collect();
        let count = restored.len();

        *self.messages.write().await = restored;
        tracing::debug!(count, "History restored");
        Ok(SyncOutcome::Applied(count))
    }

    /// Drain the pending queue and prepend what arrived, newest first.
    pub async fn sync_pending(&self) -> Result<SyncOutcome> {
        let Some(_guard) = InFlight::try_acquire(&self.in_flight) else {
            return Ok(SyncOutcome::Skipped);
        };

        let envelopes = self.source.fetch_pending().await?;
        if envelopes.is_empty() {
            return Ok(SyncOutcome::Applied(0));
        }

        let mut messages = self.messages.write().await;
        let mut fresh: Vec<ReceivedMessage> = Vec::with_capacity(envelopes.len());
        for envelope in envelopes.into_iter().rev() {
            let seen = messages.iter().chain(fresh.iter()).any(|m| m.same_envelope(&envelope));
            if seen {
                continue;
            }
            fresh.push(self.decrypt(envelope));
        }

        let added = fresh.len();
        fresh.append(&mut messages);
        *messages = fresh;

        if added > 0 {
            tracing::debug!(added, "New messages received");
        }
        Ok(SyncOutcome::Applied(added))
    }

    fn decrypt(&self, envelope: Envelope) -> ReceivedMessage {
        let body = match open(
            &envelope.encrypted_message,
            &envelope.encrypted_aes_key,
            &self.private_key,
        )
        .map(String::from_utf8)
        {
            Ok(Ok(text)) => MessageBody::Text(text),
            Ok(Err(_)) | Err(_) => {
                tracing::debug!(from = %envelope.from, timestamp = envelope.timestamp, "Message could not be decrypted");
                MessageBody::Undecryptable
            }
        };

        ReceivedMessage {
            from: envelope.from,
            timestamp: envelope.timestamp,
            body,
            ciphertext: envelope.encrypted_message,
        }
    }
}

impl<S: MessageSource + 'static> ClientSync<S> {
    /// Restore history, then poll the pending queue every `every` until stopped.
    /// The first drain runs right after the restore.
    ///
    /// Fetch failures are logged and the next tick retries.
    pub fn spawn(self: Arc<Self>, every: Duration) -> SyncHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            tracing::info!(interval_ms = every.as_millis() as u64, "Sync started");

            if let Err(e) = self.restore_history().await {
                tracing::warn!(error = %e, "History restore failed");
            }

            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.sync_pending().await {
                            tracing::warn!(error = %e, "Fetching new messages failed");
                        }
                    }
                }
            }

            tracing::info!("Sync stopped");
        });

        SyncHandle { token, task }
    }
}

/// Control handle for a spawned sync task.
pub struct SyncHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop scheduling new fetches. A fetch already running completes.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the task to wind down.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Sync task ended abnormally");
        }
    }
}
