//! Round-robin credential rotation across a fixed pool of provider API keys.
//!
//! The pool is built once at startup and shared by every gateway call site.
//! Each call to [`CredentialPool::next_credential`] advances the cursor by
//! exactly one position with a single atomic read-modify-write, so concurrent
//! callers never observe the same index and never skip one.

use crate::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::Config(
                "credential pool must contain at least one API key".to_string(),
            ));
        }

        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the credential under the cursor and advances it, wrapping at
    /// pool length.
    pub fn next_credential(&self) -> &str {
        &self.keys[self.next_slot()]
    }

    /// Advances the cursor and returns the slot it pointed at. Pair with
    /// [`credential_at`](Self::credential_at) to reuse one credential across
    /// several calls.
    pub fn next_slot(&self) -> usize {
        let len = self.keys.len();
        // The closure never returns None, so fetch_update cannot fail.
        let index = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
        {
            Ok(previous) | Err(previous) => previous,
        };
        tracing::trace!("Using credential {} of {}", index + 1, len);
        index
    }

    /// Credential at a slot returned by [`next_slot`](Self::next_slot).
    /// Does not move the cursor.
    pub fn credential_at(&self, slot: usize) -> &str {
        &self.keys[slot % self.keys.len()]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPool")
            .field("size", &self.keys.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}
