//! One-request-in-flight guard for the HTTP shell.
//!
//! The shell runs each `handle` call on a spawned task and learns the outcome
//! through a oneshot channel, so it can keep answering status queries while
//! the call runs. The [`BusyFlag`] refuses a second call (and credential
//! changes) until the first one finishes.

use crate::error::Result;
use crate::orchestrator::Orchestrator;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

/// Shared "a request is in flight" flag, with the time it was raised.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    inner: Arc<AtomicBool>,
    since: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the flag busy, or return `None` if it already is.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.inner
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        *lock(&self.since) = Some(Utc::now());
        Some(BusyGuard { flag: self.clone() })
    }

    pub fn is_busy(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// When the in-flight request started, if there is one.
    pub fn since(&self) -> Option<DateTime<Utc>> {
        *lock(&self.since)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears the busy flag when dropped.
///
/// Dropping happens wherever the guard ends up, so a shell that stops waiting
/// (a disconnected HTTP client) still leaves the flag clean once the worker
/// finishes.
#[derive(Debug)]
pub struct BusyGuard {
    flag: BusyFlag,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        // Timestamp first: once the flag drops, a new guard may set it.
        *lock(&self.flag.since) = None;
        self.flag.inner.store(false, Ordering::Release);
    }
}

/// Run `handle` on a worker task and return a receiver for its outcome.
///
/// The guard is released by the worker after the call completes, whether or
/// not anyone is still waiting on the receiver.
pub fn spawn_handle(
    orchestrator: Arc<Orchestrator>,
    utterance: String,
    guard: BusyGuard,
) -> oneshot::Receiver<Result<String>> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = orchestrator.handle(&utterance).await;
        drop(guard);
        if tx.send(outcome).is_err() {
            debug!("Caller stopped waiting for the answer");
        }
    });

    rx
}
