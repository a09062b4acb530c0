//! # Logging subscriber for debugging and demos.
//!
//! [`LogWriter`] writes registry events through `tracing` in a compact form.
//! When built [`with_registry`](LogWriter::with_registry) it also reports the
//! derived values after every aggregate notification.
//!
//! ## Output format
//! ```text
//! INFO  member_added job=job-3
//! DEBUG count_changed
//! INFO  overall_status_changed status=running progress=0.42 count=2
//! INFO  member_removed job=job-3
//! ```

use async_trait::async_trait;

use crate::events::{RegistryEvent, RegistryEventKind};
use crate::registry::JobRegistry;
use crate::subscribers::Subscribe;

/// `tracing`-backed logging subscriber.
///
/// Enabled via the `logging` feature.
#[derive(Debug, Default)]
pub struct LogWriter {
    registry: Option<JobRegistry>,
}

impl LogWriter {
    /// Logs events only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs events plus the derived values of `registry`.
    pub fn with_registry(registry: JobRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &RegistryEvent) {
        match e.kind {
            RegistryEventKind::MemberAdded | RegistryEventKind::MemberRemoved => {
                if let Some(job) = e.job {
                    tracing::info!(seq = e.seq, job = %job, "{}", e.kind.as_str());
                }
            }
            RegistryEventKind::CountChanged => {
                tracing::debug!(seq = e.seq, "{}", e.kind.as_str());
            }
            RegistryEventKind::OverallStatusChanged => match &self.registry {
                Some(registry) => {
                    let agg = registry.aggregate();
                    tracing::info!(
                        seq = e.seq,
                        status = %agg.status,
                        progress = agg.progress.unwrap_or(f64::NAN),
                        count = agg.count,
                        "{}",
                        e.kind.as_str()
                    );
                }
                None => tracing::info!(seq = e.seq, "{}", e.kind.as_str()),
            },
            RegistryEventKind::OverallProgressChanged
            | RegistryEventKind::CanDisplayOverallProgressChanged => {
                tracing::debug!(seq = e.seq, "{}", e.kind.as_str());
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
