//! Per-identity critical sections.
//!
//! Appends to and drains of one identity's mailbox are serialised through
//! that identity's own async mutex. Different identities never contend here.
//! History reads take no lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Arena of mailbox locks keyed by identity code.
#[derive(Default)]
pub struct MailboxLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl MailboxLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`'s mailbox.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        // The map guard must be released before awaiting the slot.
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id.to_owned()).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of identities that have ever been locked.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
