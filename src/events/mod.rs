//! Notifications: event types, synchronous fan-out and the async bus.
//!
//! ## Contents
//! - [`Property`], [`JobEvent`], [`RegistryEvent`] event classification and payload
//! - [`Notifier`], [`Subscription`] synchronous publish/subscribe with deterministic unsubscribe
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast` for async observers
//!
//! ## Quick reference
//! - **Publishers**: jobs (via [`JobSignals`](crate::JobSignals)), `JobRegistry`.
//! - **Consumers**: `JobRegistry` (job events), `RegistryJob` (registry events),
//!   user observers, `SubscriberSet` (bus).

mod bus;
mod event;
mod notifier;

pub use bus::Bus;
pub use event::{JobEvent, JobEventKind, Property, RegistryEvent, RegistryEventKind};
pub(crate) use notifier::panic_message;
pub use notifier::{Callback, Notifier, Subscription};
