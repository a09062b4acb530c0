//! # Finish handlers: what a registry does when a tracked job finishes.
//!
//! A [`FinishHandler`] is invoked (outside every registry lock) each time a
//! tracked job emits its finished notification. It receives the registry, so
//! it may call back into it, typically [`JobRegistry::deregister`].
//!
//! - [`remove_succeeded`] (default): succeeded jobs self-clean, faulted jobs stay
//!   visible until removed explicitly.
//! - [`keep_all`]: finished jobs stay until removed explicitly.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use jobvisor::{JobRef, JobRegistry};
//!
//! let registry = JobRegistry::new();
//! // Drop every finished job, faulted ones included.
//! registry.set_finish_handler(Arc::new(|reg: &JobRegistry, job: &JobRef| {
//!     reg.deregister(job.as_ref());
//! }));
//! ```

use std::sync::Arc;

use crate::jobs::JobRef;
use crate::registry::JobRegistry;
use crate::status::JobStatus;

/// Callback run when a tracked job finishes.
pub type FinishHandler = Arc<dyn Fn(&JobRegistry, &JobRef) + Send + Sync>;

/// Default policy: deregister the job if it finished with [`JobStatus::Succeeded`].
pub fn remove_succeeded() -> FinishHandler {
    Arc::new(|registry: &JobRegistry, job: &JobRef| {
        if job.status() == JobStatus::Succeeded {
            registry.deregister(job.as_ref());
        }
    })
}

/// Keeps every finished job tracked.
pub fn keep_all() -> FinishHandler {
    Arc::new(|_: &JobRegistry, _: &JobRef| {})
}
