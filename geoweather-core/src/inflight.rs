//! Single-slot guard for requests that must not overlap.

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a request is already in flight")]
pub struct SlotBusy;

/// Holds at most one in-flight request. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct RequestSlot {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

/// Proof of occupancy; the slot frees itself when this is dropped.
#[derive(Debug)]
pub struct SlotGuard {
    token: CancellationToken,
    slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Result<SlotGuard, SlotBusy> {
        let mut current = self.current.lock();
        if current.is_some() {
            return Err(SlotBusy);
        }

        let token = CancellationToken::new();
        *current = Some(token.clone());
        Ok(SlotGuard {
            token,
            slot: Arc::clone(&self.current),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Cancel whatever is in flight. Returns false when the slot was empty.
    pub fn cancel(&self) -> bool {
        match self.current.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

impl SlotGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Run `fut` unless the slot is cancelled first.
    pub async fn run<F: std::future::Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        // The slot only ever holds the token of its single live guard.
        *self.slot.lock() = None;
    }
}
