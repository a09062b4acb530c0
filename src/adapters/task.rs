//! # Task-backed job (`TaskJob`)
//!
//! [`TaskJob`] wraps one future spawned on tokio and presents it as a [`Job`].
//! Cancellation ([`CancellationToken`]) and pausing ([`PauseTokenSource`]) are
//! optional controls; progress is reported through [`ProgressReporter`] or
//! [`TaskJob::set_progress`].
//!
//! ## Lifecycle
//! ```text
//! Created ──spawn()──► WaitingToRun ──poll──► Running ──┬── Ok(())                 ──► RanToCompletion
//!                                                        ├── Err(Canceled)          ──► Canceled
//!                                                        ├── Err(_) after cancel()  ──► Canceled
//!                                                        └── Err(_) / panic         ──► Faulted
//! ```
//!
//! ## Status mapping
//! - `Faulted`, `Canceled` → [`JobStatus::Faulted`]
//! - `RanToCompletion` → [`JobStatus::Succeeded`]
//! - otherwise → [`JobStatus::Paused`] while the pause control is paused, else [`JobStatus::Running`]
//!
//! ## Rules
//! - Pausing and cancelling are **cooperative**: the future checks its [`TaskContext`].
//! - Every pause/resume transition of the pause control emits `Changed(Status)`,
//!   `Changed(CanPause)` and `Changed(CanResume)`, including transitions made
//!   through a clone of the [`PauseTokenSource`] kept by the caller.
//! - A terminal transition emits `Changed(Status)`, `Changed(CanCancel)`,
//!   `Changed(CanPause)`, `Changed(CanResume)`, then the finished notification.
//!
//! ## Example
//! ```rust
//! use jobvisor::{JobRegistry, JobStatus, TaskError, TaskJob};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = JobRegistry::new();
//! let job = TaskJob::builder("download")
//!     .with_progress()
//!     .spawn(|ctx| async move {
//!         for step in 1..=4 {
//!             ctx.pause.wait_while_paused().await;
//!             ctx.progress.report(step as f64 / 4.0);
//!         }
//!         Ok::<_, TaskError>(())
//!     });
//! registry.register(job.clone());
//!
//! assert_eq!(job.join().await, JobStatus::Succeeded);
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::adapters::pause::{PauseToken, PauseTokenSource};
use crate::error::{JobError, Operation, TaskError};
use crate::events::{Callback, JobEvent, Property, Subscription, panic_message};
use crate::jobs::{ChangeNotifier, Job, JobId, JobSignals};
use crate::status::JobStatus;

/// Execution state of the wrapped future.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Built, not yet handed to the runtime.
    Created = 0,
    /// Spawned, not yet polled.
    WaitingToRun = 1,
    /// Being polled.
    Running = 2,
    /// Returned `Ok(())`.
    RanToCompletion = 3,
    /// Ended because of cancellation.
    Canceled = 4,
    /// Returned an error or panicked.
    Faulted = 5,
}

impl RunState {
    /// Decodes a stored state.
    pub fn from_u8(value: u8) -> Result<Self, JobError> {
        match value {
            0 => Ok(RunState::Created),
            1 => Ok(RunState::WaitingToRun),
            2 => Ok(RunState::Running),
            3 => Ok(RunState::RanToCompletion),
            4 => Ok(RunState::Canceled),
            5 => Ok(RunState::Faulted),
            value => Err(JobError::InvalidRunState { value }),
        }
    }

    /// True once the future has ended.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::RanToCompletion | RunState::Canceled | RunState::Faulted
        )
    }

    /// Stable snake_case name, used as a log field value.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Created => "created",
            RunState::WaitingToRun => "waiting_to_run",
            RunState::Running => "running",
            RunState::RanToCompletion => "ran_to_completion",
            RunState::Canceled => "canceled",
            RunState::Faulted => "faulted",
        }
    }
}

/// Handles passed to the wrapped future.
///
/// Tokens are always present; when the matching control was not supplied they
/// are fresh and never fire.
#[derive(Clone, Debug)]
pub struct TaskContext {
    pub cancel: CancellationToken,
    pub pause: PauseToken,
    pub progress: ProgressReporter,
}

/// Reports progress of the owning [`TaskJob`].
///
/// Holds a weak reference: reporting after the job is gone is a no-op.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    job: Weak<TaskJob>,
}

impl ProgressReporter {
    /// Sets the job's progress (see [`TaskJob::set_progress`]).
    pub fn report(&self, fraction: f64) {
        if let Some(job) = self.job.upgrade() {
            job.set_progress(fraction);
        }
    }
}

/// Builder for [`TaskJob`].
#[derive(Debug)]
pub struct TaskJobBuilder {
    title: String,
    description: String,
    supports_progress: bool,
    cancel: Option<CancellationToken>,
    pause: Option<PauseTokenSource>,
}

impl TaskJobBuilder {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            supports_progress: false,
            cancel: None,
            pause: None,
        }
    }

    /// Sets the display description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares that the task reports meaningful progress.
    pub fn with_progress(mut self) -> Self {
        self.supports_progress = true;
        self
    }

    /// Supplies the cancellation control.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Supplies the pause control.
    pub fn with_pausing(mut self, source: PauseTokenSource) -> Self {
        self.pause = Some(source);
        self
    }

    /// Spawns the future produced by `f` on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime (as `tokio::spawn` does).
    pub fn spawn<F, Fut>(self, f: F) -> Arc<TaskJob>
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let (done, _rx) = watch::channel(None);
        let job = Arc::new_cyclic(|me: &Weak<TaskJob>| {
            let pause_watch = self.pause.as_ref().map(|source| {
                let me = me.clone();
                source.on_transition(move |paused: &bool| {
                    if let Some(job) = me.upgrade() {
                        job.on_pause_transition(*paused);
                    }
                })
            });
            TaskJob {
                signals: JobSignals::new(),
                title: self.title,
                description: self.description,
                supports_progress: self.supports_progress,
                progress: AtomicU64::new(0.0_f64.to_bits()),
                state: AtomicU8::new(RunState::Created as u8),
                cancel: self.cancel,
                pause: self.pause,
                _pause_watch: pause_watch,
                done,
            }
        });

        let ctx = TaskContext {
            cancel: job.cancel.clone().unwrap_or_default(),
            pause: job.pause.clone().unwrap_or_default().token(),
            progress: ProgressReporter {
                job: Arc::downgrade(&job),
            },
        };
        let token = ctx.cancel.clone();

        job.set_run_state(RunState::WaitingToRun);
        tracing::debug!(job = %job.id(), title = %job.title, "task spawned");

        let driver = Arc::clone(&job);
        tokio::spawn(async move {
            driver.set_run_state(RunState::Running);
            let outcome = std::panic::AssertUnwindSafe(f(ctx)).catch_unwind().await;
            let end = match outcome {
                Ok(Ok(())) => RunState::RanToCompletion,
                Ok(Err(TaskError::Canceled)) => RunState::Canceled,
                Ok(Err(err)) if token.is_cancelled() => {
                    tracing::debug!(job = %driver.id(), error = %err, "task failed after cancellation");
                    RunState::Canceled
                }
                Ok(Err(err)) => {
                    tracing::warn!(job = %driver.id(), error = %err, "task failed");
                    RunState::Faulted
                }
                Err(panic_err) => {
                    tracing::warn!(
                        job = %driver.id(),
                        panic = %panic_message(panic_err.as_ref()),
                        "task panicked"
                    );
                    RunState::Faulted
                }
            };
            driver.complete(end);
        });

        job
    }
}

/// Job backed by a spawned future.
pub struct TaskJob {
    signals: JobSignals,
    title: String,
    description: String,
    supports_progress: bool,
    /// `f64` bits.
    progress: AtomicU64,
    /// [`RunState`] as `u8`.
    state: AtomicU8,
    cancel: Option<CancellationToken>,
    pause: Option<PauseTokenSource>,
    /// Mirrors transitions of `pause`, whoever flips it.
    _pause_watch: Option<Subscription>,
    done: watch::Sender<Option<JobStatus>>,
}

impl TaskJob {
    /// Starts building a task job with the given title.
    pub fn builder(title: impl Into<String>) -> TaskJobBuilder {
        TaskJobBuilder::new(title)
    }

    /// Current execution state.
    pub fn run_state(&self) -> Result<RunState, JobError> {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Status derived from the run state.
    ///
    /// Fails with [`JobError::InvalidRunState`] if the stored state is corrupt.
    pub fn try_status(&self) -> Result<JobStatus, JobError> {
        Ok(match self.run_state()? {
            RunState::Faulted | RunState::Canceled => JobStatus::Faulted,
            RunState::RanToCompletion => JobStatus::Succeeded,
            RunState::Created | RunState::WaitingToRun | RunState::Running => {
                if self.is_paused() {
                    JobStatus::Paused
                } else {
                    JobStatus::Running
                }
            }
        })
    }

    /// Sets progress, clamped to `[0, 1]`.
    ///
    /// Setting the current value (or `NaN`) is a no-op and notifies nobody.
    pub fn set_progress(&self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        let bits = fraction.clamp(0.0, 1.0).to_bits();
        if self.progress.swap(bits, Ordering::AcqRel) != bits {
            self.signals.notify_changed(Property::Progress);
        }
    }

    /// Waits for the future to end and returns the final status.
    pub async fn join(&self) -> JobStatus {
        let mut rx = self.done.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(status) => (*status).unwrap_or(JobStatus::Faulted),
            Err(_) => self.status(),
        }
    }

    fn is_paused(&self) -> bool {
        self.pause.as_ref().is_some_and(PauseTokenSource::is_paused)
    }

    /// Terminal, or in a state that cannot be decoded.
    fn is_finished(&self) -> bool {
        self.run_state().map_or(true, |s| s.is_terminal())
    }

    fn on_pause_transition(&self, paused: bool) {
        if self.is_finished() {
            return;
        }
        tracing::debug!(job = %self.id(), paused, "task pause state changed");
        self.signals.notify_all(&[
            Property::Status,
            Property::CanPause,
            Property::CanResume,
        ]);
    }

    fn set_run_state(&self, state: RunState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn complete(&self, end: RunState) {
        self.set_run_state(end);
        let status = self.status();
        tracing::debug!(job = %self.id(), state = end.as_str(), status = %status, "task ended");

        self.signals.notify_all(&[
            Property::Status,
            Property::CanCancel,
            Property::CanPause,
            Property::CanResume,
        ]);
        self.signals.notify_finished(status);
        self.done.send_replace(Some(status));
    }

    #[cfg(test)]
    fn force_raw_state(&self, value: u8) {
        self.state.store(value, Ordering::Release);
    }
}

impl Job for TaskJob {
    fn id(&self) -> JobId {
        self.signals.id()
    }

    fn supports_cancellation(&self) -> bool {
        self.cancel.is_some()
    }

    fn supports_pausing(&self) -> bool {
        self.pause.is_some()
    }

    fn supports_progress(&self) -> bool {
        self.supports_progress
    }

    fn progress(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::Acquire))
    }

    fn status(&self) -> JobStatus {
        match self.try_status() {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(job = %self.id(), error = %err, "cannot derive task status");
                JobStatus::Faulted
            }
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn can_cancel(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|t| !t.is_cancelled() && !self.is_finished())
    }

    fn can_pause(&self) -> bool {
        self.pause
            .as_ref()
            .is_some_and(|p| !p.is_paused() && !self.is_finished())
    }

    fn can_resume(&self) -> bool {
        self.pause
            .as_ref()
            .is_some_and(|p| p.is_paused() && !self.is_finished())
    }

    fn cancel(&self) -> Result<(), JobError> {
        let token = self.cancel.as_ref().ok_or(JobError::ControlMissing {
            operation: Operation::Cancel,
        })?;
        if self.is_finished() || token.is_cancelled() {
            return Ok(());
        }
        token.cancel();
        tracing::debug!(job = %self.id(), "task cancellation requested");
        self.signals.notify_changed(Property::CanCancel);
        Ok(())
    }

    fn pause(&self) -> Result<(), JobError> {
        let source = self.pause.as_ref().ok_or(JobError::ControlMissing {
            operation: Operation::Pause,
        })?;
        if !self.is_finished() {
            source.pause();
        }
        Ok(())
    }

    fn resume(&self) -> Result<(), JobError> {
        let source = self.pause.as_ref().ok_or(JobError::ControlMissing {
            operation: Operation::Resume,
        })?;
        if !self.is_finished() {
            source.resume();
        }
        Ok(())
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

impl std::fmt::Debug for TaskJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskJob")
            .field("id", &self.id())
            .field("title", &self.title)
            .field("state", &self.run_state())
            .field("progress", &self.progress())
            .finish()
    }
}
