//! # Job registry and its derived view.
//!
//! - [`JobRegistry`] - concurrent set of jobs with overall status/progress
//! - [`Aggregate`] - consistent snapshot of the derived values
//! - [`ProgressIndicator`] / [`IndicatorState`] - mapping for progress widgets
//! - [`finish`] - pluggable reaction to a tracked job finishing

mod aggregate;
pub mod finish;
#[allow(clippy::module_inception)]
mod registry;

pub use aggregate::{Aggregate, IndicatorState, ProgressIndicator};
pub use finish::FinishHandler;
pub use registry::JobRegistry;
