//! # Lifecycle state of a job.
//!
//! - [`JobStatus::Running`] the job is executing.
//! - [`JobStatus::Paused`] execution is suspended and can be resumed.
//! - [`JobStatus::Succeeded`] the job completed successfully (terminal).
//! - [`JobStatus::Faulted`] the job failed or was canceled (terminal).
//!
//! The declaration order here carries **no** meaning for aggregation; the
//! ranking lives in [`StatusOrdering`](crate::StatusOrdering).

use std::fmt;

/// Current lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// The job is currently executed.
    Running,
    /// The execution of the job is paused.
    Paused,
    /// The job successfully completed.
    Succeeded,
    /// An error occurred during the execution of the job.
    Faulted,
}

impl JobStatus {
    /// Every status value, in declaration order.
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Running,
        JobStatus::Paused,
        JobStatus::Succeeded,
        JobStatus::Faulted,
    ];

    /// Check if the status is terminal (`Succeeded` or `Faulted`).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Faulted)
    }

    /// Get a simple status string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Paused => "paused",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Faulted => "faulted",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
