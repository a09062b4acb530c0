//! # Registry-backed job (`RegistryJob`)
//!
//! [`RegistryJob`] presents a whole [`JobRegistry`] as a single [`Job`], so a
//! group of jobs can be tracked by an outer registry as one entry.
//!
//! ## Mapping
//! ```text
//! registry event                        │ adapter notification
//! ──────────────────────────────────────┼──────────────────────────────────
//! CanDisplayOverallProgressChanged      │ Changed(SupportsProgress)
//! OverallProgressChanged                │ Changed(Progress)
//! OverallStatusChanged                  │ Changed(Status) [+ Finished if terminal, once]
//! ```
//!
//! ## Rules
//! - The finished notification fires at most once, the first time the derived
//!   status is terminal. An emptied registry reports `Succeeded`, which finishes it.
//! - Cancelling and pausing are not supported.
//! - Never register a `RegistryJob` into its own registry (directly or transitively).

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{JobError, Operation};
use crate::events::{Callback, JobEvent, Property, RegistryEvent, RegistryEventKind, Subscription};
use crate::jobs::{ChangeNotifier, Job, JobId, JobSignals};
use crate::registry::JobRegistry;
use crate::status::JobStatus;

/// A [`JobRegistry`] viewed as one job.
pub struct RegistryJob {
    registry: JobRegistry,
    signals: JobSignals,
    title: RwLock<String>,
    description: RwLock<String>,
    _watch: Subscription,
}

impl RegistryJob {
    /// Wraps `registry` and starts mirroring its events.
    pub fn new(registry: JobRegistry, title: impl Into<String>) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<RegistryJob>| {
            let me = me.clone();
            let watch = registry.subscribe_fn(move |ev: &RegistryEvent| {
                if let Some(job) = me.upgrade() {
                    job.on_registry_event(ev);
                }
            });
            RegistryJob {
                registry,
                signals: JobSignals::new(),
                title: RwLock::new(title.into()),
                description: RwLock::new(String::new()),
                _watch: watch,
            }
        })
    }

    /// The wrapped registry.
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Sets the display title and notifies `Changed(Title)`.
    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.write() = title.into();
        self.signals.notify_changed(Property::Title);
    }

    /// Sets the display description and notifies `Changed(Description)`.
    pub fn set_description(&self, description: impl Into<String>) {
        *self.description.write() = description.into();
        self.signals.notify_changed(Property::Description);
    }

    fn on_registry_event(&self, ev: &RegistryEvent) {
        match ev.kind {
            RegistryEventKind::CanDisplayOverallProgressChanged => {
                self.signals.notify_changed(Property::SupportsProgress);
            }
            RegistryEventKind::OverallProgressChanged => {
                self.signals.notify_changed(Property::Progress);
            }
            RegistryEventKind::OverallStatusChanged => {
                self.signals.notify_changed(Property::Status);
                let status = self.registry.overall_status();
                if self.signals.notify_finished(status) {
                    tracing::debug!(job = %self.id(), status = %status, "composite job finished");
                }
            }
            RegistryEventKind::MemberAdded
            | RegistryEventKind::MemberRemoved
            | RegistryEventKind::CountChanged => {}
        }
    }
}

impl Job for RegistryJob {
    fn id(&self) -> JobId {
        self.signals.id()
    }

    fn supports_cancellation(&self) -> bool {
        false
    }

    fn supports_pausing(&self) -> bool {
        false
    }

    fn supports_progress(&self) -> bool {
        self.registry.can_display_overall_progress()
    }

    fn progress(&self) -> f64 {
        self.registry.overall_progress()
    }

    fn status(&self) -> JobStatus {
        self.registry.overall_status()
    }

    fn title(&self) -> String {
        self.title.read().clone()
    }

    fn description(&self) -> String {
        self.description.read().clone()
    }

    fn can_cancel(&self) -> bool {
        false
    }

    fn can_pause(&self) -> bool {
        false
    }

    fn can_resume(&self) -> bool {
        false
    }

    fn cancel(&self) -> Result<(), JobError> {
        Err(JobError::Unsupported {
            operation: Operation::Cancel,
        })
    }

    fn pause(&self) -> Result<(), JobError> {
        Err(JobError::Unsupported {
            operation: Operation::Pause,
        })
    }

    fn resume(&self) -> Result<(), JobError> {
        Err(JobError::Unsupported {
            operation: Operation::Resume,
        })
    }

    fn subscribe_finished(&self, callback: Callback<JobEvent>) -> Subscription {
        self.signals.subscribe_finished(callback)
    }

    fn has_finished(&self) -> bool {
        self.signals.has_finished()
    }

    fn change_notifier(&self) -> Option<&dyn ChangeNotifier> {
        Some(&self.signals)
    }
}

impl std::fmt::Debug for RegistryJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryJob")
            .field("id", &self.id())
            .field("title", &*self.title.read())
            .field("registry", &self.registry)
            .finish()
    }
}
