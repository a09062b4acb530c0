//! # Notifier: synchronous publish/subscribe with deterministic unsubscribe.
//!
//! [`Notifier`] maps subscription ids to callbacks. Jobs use one to publish
//! [`JobEvent`](crate::JobEvent)s, registries use one to publish
//! [`RegistryEvent`](crate::RegistryEvent)s.
//!
//! ## What it guarantees
//! - `emit` copies the callback list under its lock and **releases the lock before
//!   invoking** any callback, so a callback may subscribe, unsubscribe or emit again.
//! - Per-notifier FIFO: callbacks run in subscription order, on the emitting thread.
//! - Panics inside callbacks are caught and logged (isolation); later callbacks still run.
//! - Once [`Subscription::cancel`] returns (or the subscription is dropped), no emit
//!   that starts afterwards reaches the callback.
//!
//! ## What it does **not** guarantee
//! - An emit already running on another thread may still be inside the callback
//!   when `cancel` returns. Owners that need a hard cut-off re-check their own
//!   state inside the callback (the registry checks membership).
//!
//! ## Diagram
//! ```text
//!    emit(&E)
//!        │  read-lock, clone (active, callback) pairs, unlock
//!        ├──► active? ─► catch_unwind(callback #1)
//!        ├──► active? ─► catch_unwind(callback #2)
//!        └──► active? ─► catch_unwind(callback #N)
//! ```

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// Shared callback type stored by a [`Notifier`].
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E> {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback<E>,
}

struct Slots<E> {
    next_id: AtomicU64,
    entries: RwLock<Vec<Entry<E>>>,
}

/// Type-erased removal hook held by a [`Subscription`].
trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<E: 'static> Detach for Slots<E> {
    fn detach(&self, id: u64) {
        self.entries.write().retain(|e| e.id != id);
    }
}

/// Callback registry for one event stream.
pub struct Notifier<E: 'static> {
    slots: Arc<Slots<E>>,
}

impl<E: 'static> Notifier<E> {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Slots {
                next_id: AtomicU64::new(1),
                entries: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Registers `callback`; it stays active until the returned handle is cancelled or dropped.
    pub fn subscribe(&self, callback: Callback<E>) -> Subscription {
        let id = self.slots.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.slots.entries.write().push(Entry {
            id,
            active: Arc::clone(&active),
            callback,
        });

        let owner: Weak<dyn Detach> = Arc::downgrade(&self.slots) as Weak<dyn Detach>;
        Subscription {
            id,
            active,
            owner: Some(owner),
        }
    }

    /// Convenience: subscribes a plain closure.
    pub fn subscribe_fn<F>(&self, f: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(f))
    }

    /// Invokes every active callback with `event`. Returns how many were invoked.
    pub fn emit(&self, event: &E) -> usize {
        let targets: Vec<(Arc<AtomicBool>, Callback<E>)> = self
            .slots
            .entries
            .read()
            .iter()
            .map(|e| (Arc::clone(&e.active), Arc::clone(&e.callback)))
            .collect();

        let mut invoked = 0;
        for (active, callback) in targets {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            invoked += 1;
            if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| callback(event))) {
                tracing::warn!(
                    panic = %panic_message(panic_err.as_ref()),
                    "notification callback panicked"
                );
            }
        }
        invoked
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.slots.entries.read().len()
    }

    /// True if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.slots.entries.read().is_empty()
    }
}

impl<E: 'static> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<E: 'static> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a live subscription.
///
/// Dropping the handle unsubscribes, so keep it for as long as the callback
/// should fire.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    owner: Option<Weak<dyn Detach>>,
}

impl Subscription {
    /// Unsubscribes. Irrevocable; equivalent to dropping the handle.
    pub fn cancel(mut self) {
        self.release();
    }

    /// True until the subscription is cancelled or its notifier is gone.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
            && self.owner.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    fn release(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(owner) = self.owner.take().and_then(|w| w.upgrade()) {
            owner.detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
