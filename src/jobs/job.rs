//! # Job capability contract.
//!
//! This module defines the [`Job`] trait every tracked unit of work implements,
//! the optional [`ChangeNotifier`] capability, the shared handle [`JobRef`]
//! (`Arc<dyn Job>`) and the identity type [`JobId`].
//!
//! A registry depends only on this contract. A raw computation wrapper
//! ([`TaskJob`](crate::TaskJob)), a nested registry ([`RegistryJob`](crate::RegistryJob))
//! or a test double are interchangeable to it.
//!
//! ## Capability flags vs permission flags
//! - `supports_*` are static per instance: can this job *ever* do it?
//! - `can_*` are dynamic: can it do it *right now*? (a cancellable job may be
//!   momentarily non-cancellable)

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::JobError;
use crate::events::{Callback, JobEvent, Subscription};
use crate::status::JobStatus;

/// Global counter for job identities.
static JOB_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a job.
///
/// A registry tracks jobs by this id: a job is registered at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        Self(JOB_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Shared handle to a job.
pub type JobRef = Arc<dyn Job>;

/// # Unit of work as seen by a registry.
///
/// Implementations must emit a finished notification **exactly once**, when the
/// status moves into [`JobStatus::Succeeded`] or [`JobStatus::Faulted`].
/// [`JobSignals`](crate::JobSignals) enforces this and is the easiest way to
/// implement the notification half of the trait.
///
/// # Example
/// ```
/// use jobvisor::{
///     Callback, ChangeNotifier, Job, JobError, JobEvent, JobId, JobSignals, JobStatus,
///     Operation, Subscription,
/// };
///
/// struct Upload {
///     signals: JobSignals,
/// }
///
/// impl Job for Upload {
///     fn id(&self) -> JobId { self.signals.id() }
///     fn supports_cancellation(&self) -> bool { false }
///     fn supports_pausing(&self) -> bool { false }
///     fn supports_progress(&self) -> bool { false }
///     fn progress(&self) -> f64 { 0.0 }
///     fn status(&self) -> JobStatus { JobStatus::Running }
///     fn title(&self) -> String { "upload".into() }
///     fn description(&self) -> String { String::new() }
///     fn can_cancel(&self) -> bool { false }
///     fn can_pause(&self) -> bool { false }
///     fn can_resume(&self) -> bool { false }
///     fn cancel(&self) -> Result<(), JobError> {
///         Err(JobError::Unsupported { operation: Operation::Cancel })
///     }
///     fn pause(&self) -> Result<(), JobError> {
///         Err(JobError::Unsupported { operation: Operation::Pause })
///     }
///     fn resume(&self) -> Result<(), JobError> {
///         Err(JobError::Unsupported { operation: Operation::Resume })
///     }
///     fn subscribe_finished(&self, callback: Callback<JobEvent>) -> Subscription {
///         self.signals.subscribe_finished(callback)
///     }
///     fn change_notifier(&self) -> Option<&dyn ChangeNotifier> {
///         Some(&self.signals)
///     }
/// }
/// ```
pub trait Job: Send + Sync + 'static {
    /// Stable identity of this job.
    fn id(&self) -> JobId;

    /// Whether this job supports cancellation at all.
    fn supports_cancellation(&self) -> bool;

    /// Whether this job supports pausing at all.
    fn supports_pausing(&self) -> bool;

    /// Whether [`progress`](Job::progress) carries meaning.
    fn supports_progress(&self) -> bool;

    /// Fractional progress in `[0, 1]` (if supported).
    fn progress(&self) -> f64;

    /// Current lifecycle state.
    fn status(&self) -> JobStatus;

    /// Display title.
    fn title(&self) -> String;

    /// Longer display description.
    fn description(&self) -> String;

    /// Whether the job can be cancelled right now.
    fn can_cancel(&self) -> bool;

    /// Whether the job can be paused right now.
    fn can_pause(&self) -> bool;

    /// Whether the job can be resumed right now.
    fn can_resume(&self) -> bool;

    /// Cancels the job (if supported).
    fn cancel(&self) -> Result<(), JobError>;

    /// Pauses the job (if supported).
    fn pause(&self) -> Result<(), JobError>;

    /// Resumes the job (if supported).
    fn resume(&self) -> Result<(), JobError>;

    /// Subscribes to the one-shot finished notification.
    fn subscribe_finished(&self, callback: Callback<JobEvent>) -> Subscription;

    /// Whether the finished notification has already been emitted.
    ///
    /// A registry asks this right after subscribing, so a job that finished
    /// before it was registered still gets its finish handled. Jobs that can
    /// finish on their own before registration should override it
    /// ([`JobSignals::has_finished`](crate::JobSignals::has_finished)).
    fn has_finished(&self) -> bool {
        false
    }

    /// Optional change-notification capability.
    ///
    /// Checked once, at registration. Jobs returning `None` are still tracked,
    /// but the registry only learns about their changes when it is asked.
    fn change_notifier(&self) -> Option<&dyn ChangeNotifier> {
        None
    }
}

/// Capability: the job announces changes of its observable fields.
pub trait ChangeNotifier: Send + Sync {
    /// Subscribes to `Changed(property)` notifications.
    fn subscribe_changes(&self, callback: Callback<JobEvent>) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = JobId::next();
        let b = JobId::next();
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(a.to_string(), format!("job-{}", a.as_u64()));
    }
}
