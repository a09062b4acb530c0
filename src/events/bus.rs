//! # Event bus for broadcasting registry events to async observers.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Every
//! [`JobRegistry`](crate::JobRegistry) owns one and publishes each
//! [`RegistryEvent`] on it right after the synchronous callbacks ran.
//!
//! ## Architecture
//! ```text
//! JobRegistry::emit(kind)
//!   ├──► Notifier (sync callbacks, on the emitting thread)
//!   └──► Bus ───────► JobRegistry::watch() receivers
//!                └──► SubscriberSet::attach(&registry, subs) ──► per-subscriber workers
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and needs no runtime.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::RegistryEvent;

/// Broadcast channel for registry events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<RegistryEvent>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<RegistryEvent>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: RegistryEvent) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// A receiver only gets events **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
