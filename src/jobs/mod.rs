//! # Job abstractions.
//!
//! This module provides the core job-related types:
//! - [`Job`] - capability contract every tracked unit of work implements
//! - [`ChangeNotifier`] - optional capability: announces field changes
//! - [`JobRef`] - shared reference to a job (`Arc<dyn Job>`)
//! - [`JobId`] - identity used by registries
//! - [`JobSignals`] - change/finished notifiers with the one-shot finished guard

mod job;
mod signals;

#[cfg(test)]
pub(crate) mod testing;

pub use job::{ChangeNotifier, Job, JobId, JobRef};
pub use signals::JobSignals;
