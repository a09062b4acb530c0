//! # Notification plumbing shared by job implementations.
//!
//! [`JobSignals`] bundles a job's identity with its two notification streams:
//! - **changes**: `Changed(property)` events, any number of times;
//! - **finished**: `Finished(status)`, at most once.
//!
//! ## Rules
//! - `notify_finished` fires only for terminal statuses and only the first time.
//! - Emission never happens under a lock owned by `JobSignals`.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::events::{Callback, JobEvent, Notifier, Property, Subscription};
use crate::jobs::job::{ChangeNotifier, JobId};
use crate::status::JobStatus;

/// Identity plus change/finished notifiers for one job.
pub struct JobSignals {
    id: JobId,
    changes: Notifier<JobEvent>,
    finished: Notifier<JobEvent>,
    finished_fired: AtomicBool,
}

impl JobSignals {
    /// Creates signals with a freshly allocated [`JobId`].
    pub fn new() -> Self {
        Self {
            id: JobId::next(),
            changes: Notifier::new(),
            finished: Notifier::new(),
            finished_fired: AtomicBool::new(false),
        }
    }

    /// Identity of the owning job.
    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Announces that `property` changed.
    pub fn notify_changed(&self, property: Property) {
        self.changes.emit(&JobEvent::changed(self.id, property));
    }

    /// Announces several changed properties, in order.
    pub fn notify_all(&self, properties: &[Property]) {
        for p in properties {
            self.notify_changed(*p);
        }
    }

    /// Emits the finished notification.
    ///
    /// Returns `false` (and emits nothing) if `status` is not terminal or the
    /// job already finished.
    pub fn notify_finished(&self, status: JobStatus) -> bool {
        if !status.is_terminal() {
            return false;
        }
        if self.finished_fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.finished.emit(&JobEvent::finished(self.id, status));
        true
    }

    /// True once the finished notification has been emitted.
    pub fn has_finished(&self) -> bool {
        self.finished_fired.load(Ordering::Acquire)
    }

    /// Subscribes to the finished notification.
    pub fn subscribe_finished(&self, callback: Callback<JobEvent>) -> Subscription {
        self.finished.subscribe(callback)
    }
}

impl Default for JobSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for JobSignals {
    fn subscribe_changes(&self, callback: Callback<JobEvent>) -> Subscription {
        self.changes.subscribe(callback)
    }
}
