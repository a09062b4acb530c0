//! # Async subscriber contract
//!
//! `Subscribe` is the extension point for observers that must not run on the
//! thread that changed a job (I/O, UI refresh, batching). Each subscriber is
//! driven by its own worker task fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Slow subscribers never block job threads, the registry or other subscribers.
//! - Each subscriber declares its queue capacity via [`Subscribe::queue_capacity`].
//!   On overflow, events for that subscriber are **dropped** (warn).
//! - [`Subscribe::wants`] filters by [`RegistryEventKind`] before queueing, so a
//!   subscriber that only redraws on aggregate changes never fills its queue
//!   with membership events.
//!
//! ## Example
//! ```rust
//! use jobvisor::{RegistryEvent, RegistryEventKind, Subscribe};
//!
//! struct Redraw;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Redraw {
//!     async fn on_event(&self, _ev: &RegistryEvent) {
//!         // repaint the progress widget...
//!     }
//!     fn wants(&self, kind: RegistryEventKind) -> bool { kind.is_aggregate() }
//!     fn name(&self) -> &'static str { "redraw" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{RegistryEvent, RegistryEventKind};

/// Contract for async registry observers.
///
/// Called from a subscriber-dedicated worker task; prefer async I/O over blocking calls.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single registry event.
    async fn on_event(&self, event: &RegistryEvent);

    /// Whether events of `kind` should be delivered at all.
    fn wants(&self, kind: RegistryEventKind) -> bool {
        let _ = kind;
        true
    }

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
