//! # Job registry - concurrent set of jobs with a derived aggregate view.
//!
//! The registry tracks jobs and derives three values from their changing states:
//! - `overall_status`: dominant status among members ([`StatusOrdering`]);
//! - `overall_progress`: mean progress of members with the dominant status
//!   that support progress;
//! - `can_display_overall_progress`: whether that subset is non-empty.
//!
//! ## Architecture
//! ```text
//! register(job) ──► members (RwLock<BTreeMap<JobId, Member>>)
//!                     └─► Member { job, changed: Subscription, finished: Subscription }
//!
//! job Changed(property) ──► on_member_changed()
//!                              ├─► Status           → OverallStatus/Progress/CanDisplay changed
//!                              ├─► Progress         → OverallProgress changed   (if job.status == overall)
//!                              ├─► SupportsProgress → CanDisplay + Progress     (if job.status == overall)
//!                              └─► other            → nothing
//!
//! job Finished ──► on_member_finished() ──► FinishHandler (default: deregister if Succeeded)
//!
//! emit(RegistryEvent) ──► Notifier (sync callbacks) ──► Bus (async receivers)
//! ```
//!
//! ## Rules
//! - Reads (accessors, `count`, `jobs`) share the lock; `register`/`deregister` take it exclusively.
//! - Subscribing, unsubscribing and **every** emission happen outside the lock, so a
//!   callback may call back into the registry (a finish handler calling `deregister`).
//! - Callbacks hold weak references to the job and the registry: no reference cycles.
//! - Callbacks from a job that is no longer a member are ignored.
//!
//! ## Forbidden usage
//! Registering a registry into itself, directly or transitively through a
//! [`RegistryJob`](crate::RegistryJob), produces unbounded recursive notification.
//! This is **not** detected at runtime; avoid it by construction.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::config::RegistryConfig;
use crate::events::{
    Bus, Callback, JobEvent, Notifier, Property, RegistryEvent, RegistryEventKind, Subscription,
};
use crate::jobs::{Job, JobId, JobRef};
use crate::registry::aggregate::{Aggregate, Sample, mean_progress};
use crate::registry::finish::{self, FinishHandler};
use crate::status::{JobStatus, StatusOrdering};

/// Tracking entry for one job.
struct Member {
    job: JobRef,
    /// Distinguishes this registration from an earlier one of the same job.
    epoch: u64,
    changed: Option<Subscription>,
    finished: Option<Subscription>,
}

struct Shared {
    members: RwLock<BTreeMap<JobId, Member>>,
    epochs: AtomicU64,
    ordering: StatusOrdering,
    notifier: Notifier<RegistryEvent>,
    bus: Bus,
    finish_handler: RwLock<FinishHandler>,
    cfg: RegistryConfig,
}

/// Thread-safe registry of jobs.
///
/// Cloning is cheap and yields a handle to the **same** registry.
///
/// ## Example
/// ```rust
/// use jobvisor::{JobRegistry, JobStatus};
///
/// let registry = JobRegistry::new();
/// assert_eq!(registry.overall_status(), JobStatus::Succeeded);
/// assert!(!registry.can_display_overall_progress());
/// assert_eq!(registry.count(), 0);
/// ```
#[derive(Clone)]
pub struct JobRegistry {
    shared: Arc<Shared>,
}

impl JobRegistry {
    /// Creates a registry with [`RegistryConfig::default`].
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates a registry with the given configuration.
    pub fn with_config(cfg: RegistryConfig) -> Self {
        let handler = default_finish_handler(&cfg);
        Self {
            shared: Arc::new(Shared {
                members: RwLock::new(BTreeMap::new()),
                epochs: AtomicU64::new(0),
                ordering: StatusOrdering,
                notifier: Notifier::new(),
                bus: Bus::new(cfg.bus_capacity_clamped()),
                finish_handler: RwLock::new(handler),
                cfg,
            }),
        }
    }

    /// Configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.shared.cfg
    }

    // ---------------------------
    // Membership
    // ---------------------------

    /// Starts tracking `job`.
    ///
    /// Returns `false` (silent no-op) if the job is already tracked. On first
    /// insertion subscribes to the job's notifications, then emits `MemberAdded`,
    /// `CountChanged` and the three aggregate notifications.
    ///
    /// A job that already emitted its finished notification (see
    /// [`Job::has_finished`]) has its finish handled right after registration,
    /// exactly once.
    pub fn register(&self, job: JobRef) -> bool {
        let id = job.id();
        let epoch = self.shared.epochs.fetch_add(1, Ordering::Relaxed);
        {
            let mut members = self.shared.members.write();
            if members.contains_key(&id) {
                return false;
            }
            members.insert(
                id,
                Member {
                    job: Arc::clone(&job),
                    epoch,
                    changed: None,
                    finished: None,
                },
            );
        }

        let finish_claimed = Arc::new(AtomicBool::new(false));
        let (changed, finished) = self.subscribe_member(&job, Arc::clone(&finish_claimed));
        let leftover = {
            let mut members = self.shared.members.write();
            match members.get_mut(&id) {
                Some(member) if member.epoch == epoch => {
                    member.changed = changed;
                    member.finished = Some(finished);
                    None
                }
                // Deregistered concurrently; release the fresh subscriptions below.
                _ => Some((changed, finished)),
            }
        };
        drop(leftover);

        tracing::debug!(job = %id, title = %job.title(), "job registered");
        self.emit(RegistryEvent::new(RegistryEventKind::MemberAdded).with_job(id));
        self.emit(RegistryEvent::new(RegistryEventKind::CountChanged));
        self.emit_aggregate();

        // Finished before we subscribed: the notification is gone, handle it now.
        if job.has_finished() && !finish_claimed.swap(true, Ordering::AcqRel) {
            tracing::debug!(job = %id, "job finished before registration");
            self.on_member_finished(id, &job);
        }
        true
    }

    /// Stops tracking `job`.
    ///
    /// Returns `false` (silent no-op) if the job is not tracked. Both
    /// subscriptions are released before this returns; no callback from the
    /// job reaches the registry afterwards.
    pub fn deregister(&self, job: &dyn Job) -> bool {
        self.deregister_id(job.id())
    }

    /// Stops tracking the job with the given id. See [`deregister`](Self::deregister).
    pub fn deregister_id(&self, id: JobId) -> bool {
        let removed = self.shared.members.write().remove(&id);
        let Some(member) = removed else {
            return false;
        };

        let Member {
            job,
            changed,
            finished,
            ..
        } = member;
        drop(changed);
        drop(finished);

        tracing::debug!(job = %id, title = %job.title(), "job deregistered");
        self.emit(RegistryEvent::new(RegistryEventKind::MemberRemoved).with_job(id));
        self.emit(RegistryEvent::new(RegistryEventKind::CountChanged));
        self.emit_aggregate();
        true
    }

    /// Number of tracked jobs.
    pub fn count(&self) -> usize {
        self.shared.members.read().len()
    }

    /// True if no job is tracked.
    pub fn is_empty(&self) -> bool {
        self.shared.members.read().is_empty()
    }

    /// True if the job with `id` is tracked.
    pub fn contains(&self, id: JobId) -> bool {
        self.shared.members.read().contains_key(&id)
    }

    /// Snapshot of the tracked jobs, ordered by [`JobId`].
    ///
    /// The returned vector is a copy: mutating the registry afterwards does not affect it.
    pub fn jobs(&self) -> Vec<JobRef> {
        self.shared
            .members
            .read()
            .values()
            .map(|m| Arc::clone(&m.job))
            .collect()
    }

    // ---------------------------
    // Derived values
    // ---------------------------

    /// Dominant status among tracked jobs; `Succeeded` when empty.
    pub fn overall_status(&self) -> JobStatus {
        let members = self.shared.members.read();
        self.shared
            .ordering
            .dominant(members.values().map(|m| m.job.status()))
    }

    /// Mean progress over jobs whose status equals [`overall_status`](Self::overall_status)
    /// and that support progress.
    ///
    /// `NaN` when no such job exists (see [`can_display_overall_progress`](Self::can_display_overall_progress)).
    pub fn overall_progress(&self) -> f64 {
        let status = self.overall_status();
        let members = self.shared.members.read();
        mean_progress(members.values().map(|m| sample(&m.job)), status).unwrap_or(f64::NAN)
    }

    /// Whether at least one job with the dominant status supports progress.
    pub fn can_display_overall_progress(&self) -> bool {
        let status = self.overall_status();
        let members = self.shared.members.read();
        members
            .values()
            .any(|m| m.job.status() == status && m.job.supports_progress())
    }

    /// Derived values from a single scan under one read lock.
    pub fn aggregate(&self) -> Aggregate {
        let samples: Vec<Sample> = {
            let members = self.shared.members.read();
            members.values().map(|m| sample(&m.job)).collect()
        };
        Aggregate::from_samples(&self.shared.ordering, &samples)
    }

    // ---------------------------
    // Observers
    // ---------------------------

    /// Subscribes a synchronous observer to registry events.
    ///
    /// Callbacks run on the thread that caused the change, outside every
    /// registry lock; they may call back into the registry.
    pub fn subscribe(&self, callback: Callback<RegistryEvent>) -> Subscription {
        self.shared.notifier.subscribe(callback)
    }

    /// Convenience: subscribes a plain closure.
    pub fn subscribe_fn<F>(&self, f: F) -> Subscription
    where
        F: Fn(&RegistryEvent) + Send + Sync + 'static,
    {
        self.shared.notifier.subscribe_fn(f)
    }

    /// Creates an async receiver for registry events.
    pub fn watch(&self) -> broadcast::Receiver<RegistryEvent> {
        self.shared.bus.subscribe()
    }

    /// The async event bus of this registry.
    pub fn bus(&self) -> &Bus {
        &self.shared.bus
    }

    /// Replaces the handler run when a tracked job finishes.
    pub fn set_finish_handler(&self, handler: FinishHandler) {
        *self.shared.finish_handler.write() = handler;
    }

    /// Restores the default finish handler (per [`RegistryConfig::remove_succeeded`]).
    pub fn reset_finish_handler(&self) {
        self.set_finish_handler(default_finish_handler(&self.shared.cfg));
    }

    // ---------------------------
    // Change propagation
    // ---------------------------

    fn subscribe_member(
        &self,
        job: &JobRef,
        finish_claimed: Arc<AtomicBool>,
    ) -> (Option<Subscription>, Subscription) {
        let id = job.id();
        let weak_reg: Weak<Shared> = Arc::downgrade(&self.shared);
        let weak_job: Weak<dyn Job> = Arc::downgrade(job);

        let changed = job.change_notifier().map(|notifier| {
            let weak_reg = weak_reg.clone();
            let weak_job = weak_job.clone();
            notifier.subscribe_changes(Arc::new(move |ev: &JobEvent| {
                let Some(property) = ev.property() else {
                    return;
                };
                if let (Some(shared), Some(job)) = (weak_reg.upgrade(), weak_job.upgrade()) {
                    JobRegistry { shared }.on_member_changed(id, &job, property);
                }
            }))
        });

        let finished = job.subscribe_finished(Arc::new(move |_ev: &JobEvent| {
            if finish_claimed.swap(true, Ordering::AcqRel) {
                return;
            }
            if let (Some(shared), Some(job)) = (weak_reg.upgrade(), weak_job.upgrade()) {
                JobRegistry { shared }.on_member_finished(id, &job);
            }
        }));

        (changed, finished)
    }

    fn on_member_changed(&self, id: JobId, job: &JobRef, property: Property) {
        if !self.contains(id) {
            tracing::trace!(job = %id, property = property.as_str(), "change from untracked job ignored");
            return;
        }
        tracing::trace!(job = %id, property = property.as_str(), "member changed");

        match property {
            Property::Status => self.emit_aggregate(),
            Property::Progress => {
                if job.status() == self.overall_status() {
                    self.emit(RegistryEvent::new(RegistryEventKind::OverallProgressChanged));
                }
            }
            Property::SupportsProgress => {
                if job.status() == self.overall_status() {
                    self.emit(RegistryEvent::new(
                        RegistryEventKind::CanDisplayOverallProgressChanged,
                    ));
                    self.emit(RegistryEvent::new(RegistryEventKind::OverallProgressChanged));
                }
            }
            _ => {}
        }
    }

    fn on_member_finished(&self, id: JobId, job: &JobRef) {
        if !self.contains(id) {
            return;
        }
        tracing::debug!(job = %id, status = %job.status(), "member finished");

        let handler = Arc::clone(&*self.shared.finish_handler.read());
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(self, job)));
        if let Err(panic_err) = outcome {
            tracing::warn!(
                job = %id,
                panic = %crate::events::panic_message(panic_err.as_ref()),
                "finish handler panicked"
            );
        }
    }

    fn emit_aggregate(&self) {
        self.emit(RegistryEvent::new(RegistryEventKind::OverallStatusChanged));
        self.emit(RegistryEvent::new(RegistryEventKind::OverallProgressChanged));
        self.emit(RegistryEvent::new(
            RegistryEventKind::CanDisplayOverallProgressChanged,
        ));
    }

    fn emit(&self, event: RegistryEvent) {
        self.shared.notifier.emit(&event);
        self.shared.bus.publish(event);
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRegistry")
            .field("count", &self.count())
            .field("config", &self.shared.cfg)
            .finish()
    }
}

fn sample(job: &JobRef) -> Sample {
    Sample {
        status: job.status(),
        supports_progress: job.supports_progress(),
        progress: job.progress(),
    }
}

fn default_finish_handler(cfg: &RegistryConfig) -> FinishHandler {
    if cfg.remove_succeeded {
        finish::remove_succeeded()
    } else {
        finish::keep_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::StubJob;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn recorder(registry: &JobRegistry) -> (Arc<Mutex<Vec<RegistryEventKind>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sub = {
            let seen = Arc::clone(&seen);
            registry.subscribe_fn(move |ev| seen.lock().push(ev.kind))
        };
        (seen, sub)
    }

    fn count_of(seen: &Mutex<Vec<RegistryEventKind>>, kind: RegistryEventKind) -> usize {
        seen.lock().iter().filter(|k| **k == kind).count()
    }

    #[test]
    fn test_empty_registry() {
        let registry = JobRegistry::new();
        assert_eq!(registry.overall_status(), JobStatus::Succeeded);
        assert!(!registry.can_display_overall_progress());
        assert!(registry.overall_progress().is_nan());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_faulted_dominates() {
        let registry = JobRegistry::new();
        registry.register(StubJob::new(JobStatus::Running, None));
        registry.register(StubJob::new(JobStatus::Paused, None));
        registry.register(StubJob::new(JobStatus::Succeeded, None));
        assert_eq!(registry.overall_status(), JobStatus::Running);

        registry.register(StubJob::new(JobStatus::Faulted, None));
        assert_eq!(registry.overall_status(), JobStatus::Faulted);
    }

    #[test]
    fn test_paused_and_succeeded_only() {
        let registry = JobRegistry::new();
        registry.register(StubJob::new(JobStatus::Succeeded, None));
        assert_eq!(registry.overall_status(), JobStatus::Succeeded);
        registry.register(StubJob::new(JobStatus::Paused, None));
        assert_eq!(registry.overall_status(), JobStatus::Paused);
    }

    #[test]
    fn test_overall_progress_mean_over_dominant_subset() {
        let registry = JobRegistry::new();
        registry.register(StubJob::new(JobStatus::Running, Some(0.2)));
        registry.register(StubJob::new(JobStatus::Running, Some(0.8)));
        registry.register(StubJob::new(JobStatus::Succeeded, Some(1.0)));

        assert_eq!(registry.overall_status(), JobStatus::Running);
        assert!((registry.overall_progress() - 0.5).abs() < 1e-12);
        assert!(registry.can_display_overall_progress());

        let agg = registry.aggregate();
        assert_eq!(agg.status, JobStatus::Running);
        assert_eq!(agg.count, 3);
        assert!((agg.progress.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_displayable_progress_when_dominant_subset_lacks_support() {
        let registry = JobRegistry::new();
        registry.register(StubJob::new(JobStatus::Running, None));
        registry.register(StubJob::new(JobStatus::Paused, Some(0.5)));
        assert!(!registry.can_display_overall_progress());
        assert!(registry.overall_progress().is_nan());
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = JobRegistry::new();
        let job = StubJob::new(JobStatus::Running, None);
        let (seen, _sub) = recorder(&registry);

        assert!(registry.register(job.clone()));
        assert!(!registry.register(job.clone()));
        assert_eq!(registry.count(), 1);
        assert_eq!(count_of(&seen, RegistryEventKind::MemberAdded), 1);
        assert_eq!(count_of(&seen, RegistryEventKind::CountChanged), 1);
    }

    #[test]
    fn test_deregister_absent_is_noop() {
        let registry = JobRegistry::new();
        registry.register(StubJob::new(JobStatus::Running, None));
        let stranger = StubJob::new(JobStatus::Running, None);

        assert!(!registry.deregister(&*stranger));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_register_emits_membership_then_aggregate() {
        let registry = JobRegistry::new();
        let (seen, _sub) = recorder(&registry);
        registry.register(StubJob::new(JobStatus::Running, None));

        assert_eq!(
            *seen.lock(),
            vec![
                RegistryEventKind::MemberAdded,
                RegistryEventKind::CountChanged,
                RegistryEventKind::OverallStatusChanged,
                RegistryEventKind::OverallProgressChanged,
                RegistryEventKind::CanDisplayOverallProgressChanged,
            ]
        );
    }

    #[test]
    fn test_succeeded_job_self_cleans() {
        let registry = JobRegistry::new();
        let job = StubJob::new(JobStatus::Running, Some(0.1));
        registry.register(job.clone());

        job.set_status(JobStatus::Succeeded);

        assert_eq!(registry.count(), 0);
        assert!(registry.jobs().iter().all(|j| j.id() != job.id()));
    }

    #[test]
    fn test_faulted_job_stays_tracked() {
        let registry = JobRegistry::new();
        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());

        job.set_status(JobStatus::Faulted);

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.overall_status(), JobStatus::Faulted);
        assert!(registry.jobs().iter().any(|j| j.id() == job.id()));
    }

    #[test]
    fn test_keep_all_config_keeps_succeeded_jobs() {
        let registry = JobRegistry::with_config(RegistryConfig {
            remove_succeeded: false,
            ..RegistryConfig::default()
        });
        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());
        job.set_status(JobStatus::Succeeded);
        assert_eq!(registry.count(), 1);

        registry.reset_finish_handler();
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_custom_finish_handler() {
        let registry = JobRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = Arc::clone(&calls);
            registry.set_finish_handler(Arc::new(move |reg: &JobRegistry, job: &JobRef| {
                calls.fetch_add(1, Ordering::SeqCst);
                reg.deregister(job.as_ref());
            }));
        }

        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());
        job.set_status(JobStatus::Faulted);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_progress_change_on_non_dominant_job_is_silent() {
        let registry = JobRegistry::new();
        let running = StubJob::new(JobStatus::Running, Some(0.1));
        let paused = StubJob::new(JobStatus::Paused, Some(0.1));
        registry.register(running.clone());
        registry.register(paused.clone());
        let (seen, _sub) = recorder(&registry);

        paused.set_progress(0.9);
        assert_eq!(count_of(&seen, RegistryEventKind::OverallProgressChanged), 0);

        running.set_progress(0.7);
        assert_eq!(count_of(&seen, RegistryEventKind::OverallProgressChanged), 1);
    }

    #[test]
    fn test_supports_progress_change_is_guarded() {
        let registry = JobRegistry::new();
        let running = StubJob::new(JobStatus::Running, None);
        let paused = StubJob::new(JobStatus::Paused, None);
        registry.register(running.clone());
        registry.register(paused.clone());
        let (seen, _sub) = recorder(&registry);

        paused.set_supports_progress(true);
        assert!(seen.lock().is_empty());

        running.set_supports_progress(true);
        assert_eq!(
            *seen.lock(),
            vec![
                RegistryEventKind::CanDisplayOverallProgressChanged,
                RegistryEventKind::OverallProgressChanged,
            ]
        );
        assert!(registry.can_display_overall_progress());
    }

    #[test]
    fn test_status_change_emits_all_three() {
        let registry = JobRegistry::new();
        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());
        let (seen, _sub) = recorder(&registry);

        job.set_status(JobStatus::Paused);
        assert_eq!(
            *seen.lock(),
            vec![
                RegistryEventKind::OverallStatusChanged,
                RegistryEventKind::OverallProgressChanged,
                RegistryEventKind::CanDisplayOverallProgressChanged,
            ]
        );
    }

    #[test]
    fn test_title_change_is_not_aggregated() {
        let registry = JobRegistry::new();
        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());
        let (seen, _sub) = recorder(&registry);

        job.set_title("renamed");
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_no_callbacks_after_deregister() {
        let registry = JobRegistry::new();
        let job = StubJob::new(JobStatus::Running, Some(0.0));
        registry.register(job.clone());
        registry.deregister(&*job);
        let (seen, _sub) = recorder(&registry);

        job.set_progress(0.5);
        job.set_status(JobStatus::Succeeded);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_job_without_change_capability_is_still_aggregated() {
        let registry = JobRegistry::new();
        let job = StubJob::silent(JobStatus::Paused);
        assert!(registry.register(job.clone()));
        assert_eq!(registry.overall_status(), JobStatus::Paused);

        job.set_status(JobStatus::Succeeded);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_observer_may_reenter_registry() {
        let registry = JobRegistry::new();
        let observed = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let reg = registry.clone();
            let observed = Arc::clone(&observed);
            registry.subscribe_fn(move |ev| {
                if ev.kind == RegistryEventKind::OverallStatusChanged {
                    observed.lock().push((reg.overall_status(), reg.count()));
                }
            })
        };

        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());
        job.set_status(JobStatus::Succeeded);

        let observed = observed.lock();
        assert_eq!(observed.first(), Some(&(JobStatus::Running, 1)));
        assert_eq!(observed.last(), Some(&(JobStatus::Succeeded, 0)));
    }

    #[test]
    fn test_panicking_observer_does_not_poison_registry() {
        let registry = JobRegistry::new();
        let _bad = registry.subscribe_fn(|_| panic!("observer bug"));

        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());
        job.set_status(JobStatus::Succeeded);

        assert_eq!(registry.count(), 0);
        registry.register(StubJob::new(JobStatus::Paused, None));
        assert_eq!(registry.overall_status(), JobStatus::Paused);
    }

    #[test]
    fn test_dropping_registry_releases_jobs() {
        let job = StubJob::new(JobStatus::Running, None);
        {
            let registry = JobRegistry::new();
            registry.register(job.clone());
            assert_eq!(Arc::strong_count(&job), 2);
        }
        assert_eq!(Arc::strong_count(&job), 1);
        job.set_status(JobStatus::Succeeded);
    }

    #[test]
    fn test_snapshot_is_detached_from_registry() {
        let registry = JobRegistry::new();
        let a = StubJob::new(JobStatus::Running, None);
        let b = StubJob::new(JobStatus::Running, None);
        registry.register(a.clone());
        registry.register(b.clone());

        let snapshot = registry.jobs();
        registry.deregister(&*a);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.jobs().len(), 1);
        assert_eq!(snapshot[0].id(), a.id());
    }

    #[test]
    fn test_concurrent_register_deregister() {
        let registry = JobRegistry::new();
        let threads = 8;
        let per_thread = 200;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let mut kept = Vec::new();
                    for i in 0..per_thread {
                        let job = StubJob::new(JobStatus::Running, Some(0.5));
                        registry.register(job.clone());
                        registry.register(job.clone());
                        let _ = registry.overall_progress();
                        if (i + t) % 2 == 0 {
                            registry.deregister(&*job);
                            registry.deregister(&*job);
                        } else {
                            kept.push(job);
                        }
                    }
                    kept
                })
            })
            .collect();

        let kept: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(registry.count(), kept.len());
        assert_eq!(registry.count(), threads * per_thread / 2);
        assert_eq!(registry.overall_status(), JobStatus::Running);
    }

    #[test]
    fn test_concurrent_finishes_self_clean() {
        let registry = JobRegistry::new();
        let jobs: Vec<_> = (0..64)
            .map(|_| {
                let job = StubJob::new(JobStatus::Running, Some(0.0));
                registry.register(job.clone());
                job
            })
            .collect();

        let handles: Vec<_> = jobs
            .chunks(8)
            .map(|chunk| {
                let chunk = chunk.to_vec();
                std::thread::spawn(move || {
                    for job in chunk {
                        job.set_progress(1.0);
                        job.set_status(JobStatus::Succeeded);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(registry.is_empty());
        assert_eq!(registry.overall_status(), JobStatus::Succeeded);
    }

    #[test]
    fn test_job_finished_before_registration_self_cleans() {
        let registry = JobRegistry::new();
        let (seen, _sub) = recorder(&registry);
        let job = StubJob::new(JobStatus::Running, None);
        job.set_status(JobStatus::Succeeded);

        assert!(registry.register(job.clone()));
        assert!(registry.is_empty());
        assert_eq!(count_of(&seen, RegistryEventKind::MemberAdded), 1);
        assert_eq!(count_of(&seen, RegistryEventKind::MemberRemoved), 1);
    }

    #[test]
    fn test_finish_before_registration_handled_once() {
        let registry = JobRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = Arc::clone(&calls);
            registry.set_finish_handler(Arc::new(move |_: &JobRegistry, _: &JobRef| {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }

        let job = StubJob::new(JobStatus::Running, None);
        job.set_status(JobStatus::Faulted);
        registry.register(job.clone());
        job.set_status(JobStatus::Faulted);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_terminal_job_that_never_finished_stays() {
        let registry = JobRegistry::new();
        registry.register(StubJob::new(JobStatus::Succeeded, Some(1.0)));
        assert_eq!(registry.count(), 1);
    }

    #[tokio::test]
    async fn test_watch_receives_events() {
        let registry = JobRegistry::new();
        let mut rx = registry.watch();
        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, RegistryEventKind::MemberAdded);
        assert_eq!(first.job, Some(job.id()));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, RegistryEventKind::CountChanged);
        assert!(first.seq < second.seq);
    }
}
