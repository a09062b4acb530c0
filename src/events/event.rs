//! # Notifications emitted by jobs and registries.
//!
//! Two event families flow through the crate:
//! - [`JobEvent`] emitted by a single job: a [`Property`] changed, or the job finished;
//! - [`RegistryEvent`] emitted by a [`JobRegistry`](crate::JobRegistry): membership
//!   changed, or one of the derived aggregate values may have changed.
//!
//! Events only say **what** changed; observers read the current value through
//! the accessors of the job or registry.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order
//! (for example across the async [`Bus`](crate::Bus)).
//!
//! ## Example
//! ```rust
//! use jobvisor::{JobEvent, JobEventKind, JobId, Property, RegistryEvent, RegistryEventKind};
//!
//! let id = JobId::next();
//! let ev = JobEvent::changed(id, Property::Progress);
//! assert_eq!(ev.kind, JobEventKind::Changed(Property::Progress));
//!
//! let reg = RegistryEvent::new(RegistryEventKind::MemberAdded).with_job(id);
//! assert_eq!(reg.job, Some(id));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::jobs::JobId;
use crate::status::JobStatus;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

#[inline]
fn next_seq() -> u64 {
    EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Observable field of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// [`Job::supports_cancellation`](crate::Job::supports_cancellation).
    SupportsCancellation,
    /// [`Job::supports_pausing`](crate::Job::supports_pausing).
    SupportsPausing,
    /// [`Job::supports_progress`](crate::Job::supports_progress).
    SupportsProgress,
    /// [`Job::progress`](crate::Job::progress).
    Progress,
    /// [`Job::status`](crate::Job::status).
    Status,
    /// [`Job::title`](crate::Job::title).
    Title,
    /// [`Job::description`](crate::Job::description).
    Description,
    /// [`Job::can_cancel`](crate::Job::can_cancel).
    CanCancel,
    /// [`Job::can_pause`](crate::Job::can_pause).
    CanPause,
    /// [`Job::can_resume`](crate::Job::can_resume).
    CanResume,
}

impl Property {
    /// Stable snake_case name, used as a log field value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::SupportsCancellation => "supports_cancellation",
            Property::SupportsPausing => "supports_pausing",
            Property::SupportsProgress => "supports_progress",
            Property::Progress => "progress",
            Property::Status => "status",
            Property::Title => "title",
            Property::Description => "description",
            Property::CanCancel => "can_cancel",
            Property::CanPause => "can_pause",
            Property::CanResume => "can_resume",
        }
    }
}

/// Classification of job events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEventKind {
    /// An observable field changed.
    Changed(Property),
    /// The job reached a terminal status. Emitted at most once per job.
    Finished(JobStatus),
}

/// Notification emitted by a single job.
#[derive(Debug, Clone)]
pub struct JobEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// The emitting job.
    pub job: JobId,
    /// Event classification.
    pub kind: JobEventKind,
}

impl JobEvent {
    /// Creates a new event with current timestamp and next sequence number.
    pub fn new(job: JobId, kind: JobEventKind) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            job,
            kind,
        }
    }

    /// `Changed(property)` event for `job`.
    #[inline]
    pub fn changed(job: JobId, property: Property) -> Self {
        Self::new(job, JobEventKind::Changed(property))
    }

    /// `Finished(status)` event for `job`.
    #[inline]
    pub fn finished(job: JobId, status: JobStatus) -> Self {
        Self::new(job, JobEventKind::Finished(status))
    }

    /// Returns the changed property, if this is a change event.
    #[inline]
    pub fn property(&self) -> Option<Property> {
        match self.kind {
            JobEventKind::Changed(p) => Some(p),
            JobEventKind::Finished(_) => None,
        }
    }
}

/// Classification of registry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryEventKind {
    // === Membership ===
    /// A job was registered.
    ///
    /// Sets:
    /// - `job`: the registered job
    MemberAdded,

    /// A job was deregistered (explicitly or by the finish handler).
    ///
    /// Sets:
    /// - `job`: the removed job
    MemberRemoved,

    /// Number of tracked jobs changed.
    CountChanged,

    // === Aggregate ===
    /// `overall_status` may have changed.
    OverallStatusChanged,

    /// `overall_progress` may have changed.
    OverallProgressChanged,

    /// `can_display_overall_progress` may have changed.
    CanDisplayOverallProgressChanged,
}

impl RegistryEventKind {
    /// True for the three derived-value notifications.
    #[inline]
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            RegistryEventKind::OverallStatusChanged
                | RegistryEventKind::OverallProgressChanged
                | RegistryEventKind::CanDisplayOverallProgressChanged
        )
    }

    /// Stable snake_case name, used as a log field value.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryEventKind::MemberAdded => "member_added",
            RegistryEventKind::MemberRemoved => "member_removed",
            RegistryEventKind::CountChanged => "count_changed",
            RegistryEventKind::OverallStatusChanged => "overall_status_changed",
            RegistryEventKind::OverallProgressChanged => "overall_progress_changed",
            RegistryEventKind::CanDisplayOverallProgressChanged => {
                "can_display_overall_progress_changed"
            }
        }
    }
}

/// Notification emitted by a registry.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `job`: set depending on the [`RegistryEventKind`]
#[derive(Debug, Clone)]
pub struct RegistryEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: RegistryEventKind,
    /// Job the event is about, if applicable.
    pub job: Option<JobId>,
}

impl RegistryEvent {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: RegistryEventKind) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            kind,
            job: None,
        }
    }

    /// Attaches the job the event is about.
    #[inline]
    pub fn with_job(mut self, job: JobId) -> Self {
        self.job = Some(job);
        self
    }
}
