//! # Status ordering for aggregation.
//!
//! [`StatusOrdering`] is a total order over [`JobStatus`] values used to pick the
//! **dominant** status of a set of jobs:
//!
//! ```text
//! Succeeded  <  Paused  <  Running  <  Faulted
//!   (rank 1)    (rank 2)   (rank 3)    (rank 4)
//! ```
//!
//! - any `Faulted` job dominates (failures surface first);
//! - otherwise any `Running` job dominates (show activity);
//! - otherwise any `Paused` job dominates (show idle-paused);
//! - an all-`Succeeded` or empty set yields `Succeeded` (neutral "done").
//!
//! The ranks are an explicit table, independent of the enum declaration order,
//! so reordering [`JobStatus`] variants cannot silently change aggregation.
//!
//! # Example
//! ```rust
//! use std::cmp::Ordering;
//! use jobvisor::{JobStatus, StatusOrdering};
//!
//! let ord = StatusOrdering::default();
//! assert_eq!(ord.compare(JobStatus::Paused, JobStatus::Running), Ordering::Less);
//!
//! let dominant = ord.dominant([JobStatus::Succeeded, JobStatus::Running, JobStatus::Paused]);
//! assert_eq!(dominant, JobStatus::Running);
//!
//! assert_eq!(ord.dominant(std::iter::empty()), JobStatus::Succeeded);
//! ```

use std::cmp::Ordering;

use crate::status::JobStatus;

/// Rank table: higher rank dominates.
const RANKS: [(JobStatus, u8); 4] = [
    (JobStatus::Succeeded, 1),
    (JobStatus::Paused, 2),
    (JobStatus::Running, 3),
    (JobStatus::Faulted, 4),
];

/// Total order over job statuses.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusOrdering;

impl StatusOrdering {
    /// Returns the rank of `status` in the aggregation order.
    pub fn rank(&self, status: JobStatus) -> u8 {
        RANKS
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, rank)| *rank)
            .unwrap_or(0)
    }

    /// Compares two statuses by dominance.
    #[inline]
    pub fn compare(&self, a: JobStatus, b: JobStatus) -> Ordering {
        self.rank(a).cmp(&self.rank(b))
    }

    /// Returns the dominant status in `statuses` with a single linear scan.
    ///
    /// An empty input yields [`JobStatus::Succeeded`].
    pub fn dominant<I>(&self, statuses: I) -> JobStatus
    where
        I: IntoIterator<Item = JobStatus>,
    {
        let mut iter = statuses.into_iter();
        let Some(mut max) = iter.next() else {
            return JobStatus::Succeeded;
        };
        for status in iter {
            if self.compare(max, status) == Ordering::Less {
                max = status;
            }
        }
        max
    }
}
