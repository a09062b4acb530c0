//! # Aggregate snapshot and progress-indicator mapping.
//!
//! [`Aggregate`] holds the derived registry values computed from **one** scan
//! under one read lock, for callers that must not mix values from different
//! moments (the individual accessors on [`JobRegistry`](crate::JobRegistry)
//! may interleave with concurrent mutation).
//!
//! [`ProgressIndicator`] maps an aggregate onto the five states a typical
//! progress widget (taskbar button, tray icon, status bar) understands:
//!
//! ```text
//! overall status │ displayable progress │ indicator
//! ───────────────┼──────────────────────┼──────────────
//! Running        │ yes                  │ Normal(value)
//! Running        │ no                   │ Indeterminate
//! Paused         │ any                  │ Paused(value)
//! Succeeded      │ any                  │ None
//! Faulted        │ any                  │ Error(value)
//! ```

use crate::status::{JobStatus, StatusOrdering};

/// Per-member values sampled under the registry lock.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub(crate) status: JobStatus,
    pub(crate) supports_progress: bool,
    pub(crate) progress: f64,
}

/// Consistent view of the derived registry values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    /// Dominant status (`Succeeded` when empty).
    pub status: JobStatus,
    /// Mean progress over members with the dominant status that support progress.
    ///
    /// `None` when no such member exists.
    pub progress: Option<f64>,
    /// Number of tracked jobs.
    pub count: usize,
}

impl Aggregate {
    pub(crate) fn from_samples(ordering: &StatusOrdering, samples: &[Sample]) -> Self {
        let status = ordering.dominant(samples.iter().map(|s| s.status));
        let progress = mean_progress(samples.iter().copied(), status);
        Self {
            status,
            progress,
            count: samples.len(),
        }
    }

    /// Whether a progress figure is meaningful to show.
    #[inline]
    pub fn can_display_progress(&self) -> bool {
        self.progress.is_some()
    }

    /// Maps this aggregate onto a progress indicator.
    pub fn indicator(&self) -> ProgressIndicator {
        let value = self.progress.unwrap_or(0.0);
        let state = match self.status {
            JobStatus::Running if self.can_display_progress() => IndicatorState::Normal,
            JobStatus::Running => IndicatorState::Indeterminate,
            JobStatus::Paused => IndicatorState::Paused,
            JobStatus::Succeeded => IndicatorState::None,
            JobStatus::Faulted => IndicatorState::Error,
        };
        ProgressIndicator { state, value }
    }
}

/// Arithmetic mean of `progress` over samples matching `status` that support progress.
pub(crate) fn mean_progress<I>(samples: I, status: JobStatus) -> Option<f64>
where
    I: IntoIterator<Item = Sample>,
{
    let (sum, n) = samples
        .into_iter()
        .filter(|s| s.status == status && s.supports_progress)
        .fold((0.0_f64, 0_usize), |(sum, n), s| (sum + s.progress, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Visual state of a progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorState {
    /// Nothing to show.
    None,
    /// Work is ongoing but its extent is unknown.
    Indeterminate,
    /// Work is ongoing with a known fraction done.
    Normal,
    /// Work is paused.
    Paused,
    /// Something failed.
    Error,
}

/// State plus value for a progress widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressIndicator {
    /// How the widget should be drawn.
    pub state: IndicatorState,
    /// Fraction in `[0, 1]`; `0.0` when no progress can be displayed.
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: JobStatus, progress: Option<f64>) -> Sample {
        Sample {
            status,
            supports_progress: progress.is_some(),
            progress: progress.unwrap_or(0.0),
        }
    }

    #[test]
    fn test_empty_aggregate() {
        let agg = Aggregate::from_samples(&StatusOrdering, &[]);
        assert_eq!(agg.status, JobStatus::Succeeded);
        assert_eq!(agg.progress, None);
        assert_eq!(agg.count, 0);
        assert_eq!(agg.indicator().state, IndicatorState::None);
    }

    #[test]
    fn test_mean_only_over_dominant_status() {
        let samples = [
            sample(JobStatus::Running, Some(0.2)),
            sample(JobStatus::Running, Some(0.8)),
            sample(JobStatus::Succeeded, Some(1.0)),
        ];
        let agg = Aggregate::from_samples(&StatusOrdering, &samples);
        assert_eq!(agg.status, JobStatus::Running);
        assert!((agg.progress.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(agg.count, 3);
    }

    #[test]
    fn test_members_without_progress_are_ignored() {
        let samples = [
            sample(JobStatus::Running, None),
            sample(JobStatus::Running, Some(0.4)),
        ];
        let agg = Aggregate::from_samples(&StatusOrdering, &samples);
        assert_eq!(agg.progress, Some(0.4));
    }

    #[test]
    fn test_indicator_mapping() {
        let running = Aggregate {
            status: JobStatus::Running,
            progress: Some(0.3),
            count: 1,
        };
        assert_eq!(
            running.indicator(),
            ProgressIndicator {
                state: IndicatorState::Normal,
                value: 0.3
            }
        );

        let unknown = Aggregate {
            progress: None,
            ..running
        };
        assert_eq!(unknown.indicator().state, IndicatorState::Indeterminate);
        assert_eq!(unknown.indicator().value, 0.0);

        let paused = Aggregate {
            status: JobStatus::Paused,
            ..running
        };
        assert_eq!(paused.indicator().state, IndicatorState::Paused);

        let faulted = Aggregate {
            status: JobStatus::Faulted,
            progress: None,
            count: 2,
        };
        assert_eq!(faulted.indicator().state, IndicatorState::Error);
    }
}
