//! # jobvisor
//!
//! **Jobvisor** tracks concurrently running jobs and condenses them into one
//! overall status, one overall progress figure and a flag telling whether that
//! progress is meaningful to display: the kind of summary a taskbar button,
//! tray icon or status bar shows for "everything the application is doing".
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskJob    │   │  RegistryJob │   │  custom Job  │
//!     │ (tokio task) │   │ (sub-group)  │   │  (any impl)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ Changed(property) / Finished(status) │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  JobRegistry                                                      │
//! │  - members: RwLock<BTreeMap<JobId, Member>>                       │
//! │  - StatusOrdering (Succeeded < Paused < Running < Faulted)        │
//! │  - FinishHandler (default: drop succeeded jobs)                   │
//! │  - Notifier (sync callbacks)  +  Bus (tokio broadcast)            │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        ▼                                              ▼
//!   subscribe(callback)                          watch() / SubscriberSet
//!   (runs on the job's thread,                   (per-subscriber queues,
//!    outside every lock)                          async workers)
//! ```
//!
//! ### Derived values
//! ```text
//! overall_status                = max by StatusOrdering over members   (Succeeded if empty)
//! overall_progress              = mean(progress) over members with
//!                                 status == overall_status && supports_progress
//! can_display_overall_progress  = that subset is non-empty
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Jobs**          | Capability contract any unit of work implements.             | [`Job`], [`ChangeNotifier`], [`JobSignals`] |
//! | **Registry**      | Concurrent job set with aggregate status and progress.      | [`JobRegistry`], [`Aggregate`]            |
//! | **Adapters**      | Futures and whole registries viewed as jobs.                 | [`TaskJob`], [`RegistryJob`]              |
//! | **Events**        | Sync callbacks and an async bus for observers.               | [`Notifier`], [`Bus`], [`Subscribe`]      |
//! | **Errors**        | Typed errors for job control and task futures.               | [`JobError`], [`TaskError`]               |
//! | **Configuration** | Registry settings.                                           | [`RegistryConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports a `tracing`-backed [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use jobvisor::{IndicatorState, JobRegistry, JobStatus, TaskError, TaskJob};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let registry = JobRegistry::new();
//!
//!     let (go, wait) = tokio::sync::oneshot::channel::<()>();
//!     let upload = TaskJob::builder("upload")
//!         .with_progress()
//!         .spawn(|ctx| async move {
//!             ctx.progress.report(0.5);
//!             let _ = wait.await;
//!             Ok::<_, TaskError>(())
//!         });
//!     registry.register(upload.clone());
//!     tokio::task::yield_now().await;
//!
//!     assert_eq!(registry.overall_status(), JobStatus::Running);
//!     assert_eq!(registry.aggregate().indicator().state, IndicatorState::Normal);
//!
//!     let _ = go.send(());
//!     upload.join().await;
//!     // Succeeded jobs remove themselves.
//!     assert!(registry.is_empty());
//! }
//! ```

mod adapters;
mod config;
mod error;
mod events;
mod jobs;
mod registry;
mod status;
mod subscribers;

// ---- Public re-exports ----

pub use adapters::{
    PauseToken, PauseTokenSource, ProgressReporter, RegistryJob, RunState, TaskContext, TaskJob,
    TaskJobBuilder,
};
pub use config::RegistryConfig;
pub use error::{JobError, Operation, TaskError};
pub use events::{
    Bus, Callback, JobEvent, JobEventKind, Notifier, Property, RegistryEvent, RegistryEventKind,
    Subscription,
};
pub use jobs::{ChangeNotifier, Job, JobId, JobRef, JobSignals};
pub use registry::{
    Aggregate, FinishHandler, IndicatorState, JobRegistry, ProgressIndicator, finish,
};
pub use status::{JobStatus, StatusOrdering};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
