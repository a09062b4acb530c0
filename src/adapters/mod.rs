//! # Ready-made [`Job`](crate::Job) implementations.
//!
//! - [`RegistryJob`] - a whole [`JobRegistry`](crate::JobRegistry) viewed as one job
//! - [`TaskJob`] - one tokio future viewed as a job, with optional cancel/pause controls
//! - [`PauseTokenSource`] / [`PauseToken`] - cooperative pause control used by [`TaskJob`]

mod composite;
mod pause;
mod task;

pub use composite::RegistryJob;
pub use pause::{PauseToken, PauseTokenSource};
pub use task::{ProgressReporter, RunState, TaskContext, TaskJob, TaskJobBuilder};
