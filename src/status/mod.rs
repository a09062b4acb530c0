//! Job status values and the ordering used to aggregate them.
//!
//! ## Contents
//! - [`JobStatus`] lifecycle state of a single job
//! - [`StatusOrdering`] total order picking the dominant status among many jobs
//!
//! ## Quick wiring
//! ```text
//! JobRegistry::overall_status()
//!      └─► StatusOrdering::dominant(members.map(Job::status))
//!            Succeeded < Paused < Running < Faulted
//! ```

mod job_status;
mod ordering;

pub use job_status::JobStatus;
pub use ordering::StatusOrdering;
