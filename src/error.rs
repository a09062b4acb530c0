//! Error types used by jobs, adapters and task futures.
//!
//! This module defines two enums:
//!
//! - [`JobError`] errors raised by job control operations and adapters.
//! - [`TaskError`] errors returned by a future wrapped in a [`TaskJob`](crate::TaskJob).
//!
//! Both types provide `as_label` / `as_message` helpers for logs.
//!
//! Registering a job twice or deregistering an absent job are **not** errors:
//! both are idempotent no-ops on [`JobRegistry`](crate::JobRegistry).

use std::fmt;

use thiserror::Error;

/// Control operation that can be requested on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`Job::cancel`](crate::Job::cancel).
    Cancel,
    /// [`Job::pause`](crate::Job::pause).
    Pause,
    /// [`Job::resume`](crate::Job::resume).
    Resume,
}

impl Operation {
    /// Lowercase operation name, as it appears in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Cancel => "cancel",
            Operation::Pause => "pause",
            Operation::Resume => "resume",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Errors produced by job control operations.
///
/// All variants are surfaced synchronously to the caller and never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The job declares no support for this operation at all.
    #[error("{operation} is not supported by this job")]
    Unsupported {
        /// The rejected operation.
        operation: Operation,
    },

    /// The job was built without the control object this operation delegates to.
    #[error("{operation} requested but no {operation} control was supplied")]
    ControlMissing {
        /// The rejected operation.
        operation: Operation,
    },

    /// An adapter observed a run-state value outside its known mapping.
    ///
    /// This is a programmer error: the stored state was corrupted or a new
    /// state was added without updating the mapping.
    #[error("invalid run state value {value}")]
    InvalidRunState {
        /// The raw value that could not be mapped.
        value: u8,
    },
}

impl JobError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use jobvisor::{JobError, Operation};
    ///
    /// let err = JobError::Unsupported { operation: Operation::Pause };
    /// assert_eq!(err.as_label(), "job_unsupported");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Unsupported { .. } => "job_unsupported",
            JobError::ControlMissing { .. } => "job_control_missing",
            JobError::InvalidRunState { .. } => "job_invalid_run_state",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Unsupported { operation } => format!("unsupported: {operation}"),
            JobError::ControlMissing { operation } => format!("no control for: {operation}"),
            JobError::InvalidRunState { value } => format!("invalid run state: {value}"),
        }
    }

    /// True for both flavours of "this job cannot do that".
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            JobError::Unsupported { .. } | JobError::ControlMissing { .. }
        )
    }
}

/// # Errors returned by a task future.
///
/// The variant decides the terminal run state of the wrapping
/// [`TaskJob`](crate::TaskJob): `Canceled` ends in
/// [`RunState::Canceled`](crate::RunState::Canceled), `Fail` in
/// [`RunState::Faulted`](crate::RunState::Faulted).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed its cancellation token and stopped.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Convenience constructor for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use jobvisor::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}
