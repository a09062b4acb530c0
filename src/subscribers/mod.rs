//! # Async observers of registry events.
//!
//! Synchronous callbacks ([`JobRegistry::subscribe`](crate::JobRegistry::subscribe))
//! run on the thread that changed a job. Observers that do I/O plug in here instead:
//! every registry event is also published on the registry's [`Bus`](crate::Bus),
//! and a [`SubscriberSet`] fans it out to [`Subscribe`] implementations.
//!
//! ## Architecture
//! ```text
//! JobRegistry ── publish(RegistryEvent) ──► Bus
//!                                            │ SubscriberSet::attach(&registry, subs)
//!                                            ▼
//!                                      SubscriberSet ── wants(kind)?
//!                                   ┌────────┼────────┐
//!                                   ▼        ▼        ▼
//!                               LogWriter  Redraw   Custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
