//! # SubscriberSet: async observers attached to one registry
//!
//! [`SubscriberSet::attach`] connects a group of [`Subscribe`] implementations
//! to a [`JobRegistry`]: one listener task reads the registry's bus and routes
//! each event to the subscribers that [`want`](Subscribe::wants) its kind.
//!
//! ## What it guarantees
//! - Job threads and the registry never wait for a subscriber.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//! - [`shutdown`](SubscriberSet::shutdown) delivers every event published
//!   before it was called, then waits for all queues to drain.
//! - When the registry is dropped, the listener ends on its own.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries: a full queue drops the event for that subscriber (warn), and a
//!   listener lagging behind the bus skips the missed events (warn).
//!
//! ## Diagram
//! ```text
//! JobRegistry ──► Bus ──► listener ──┬── wants(kind)? ──► [queue S1] ─► worker S1 ─► on_event()
//!                           ▲        ├── wants(kind)? ──► [queue S2] ─► worker S2 ─► on_event()
//!               stop token ─┘        └── wants(kind)? ──► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use jobvisor::{JobRegistry, RegistryEvent, Subscribe, SubscriberSet};
//!
//! struct Count(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Count {
//!     async fn on_event(&self, _ev: &RegistryEvent) {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = JobRegistry::new();
//! let set = SubscriberSet::attach(&registry, vec![Arc::new(Count(Default::default())) as _]);
//! // ... register jobs ...
//! set.shutdown().await;
//! # }
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::Subscribe;
use crate::events::{RegistryEvent, panic_message};
use crate::registry::JobRegistry;

/// Queue into one subscriber's worker, plus its filter.
struct Route {
    sub: Arc<dyn Subscribe>,
    queue: mpsc::Sender<RegistryEvent>,
}

impl Route {
    fn offer(&self, ev: &RegistryEvent) {
        if !self.sub.wants(ev.kind) {
            return;
        }
        match self.queue.try_send(ev.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(ev)) => {
                tracing::warn!(
                    subscriber = self.sub.name(),
                    seq = ev.seq,
                    kind = ev.kind.as_str(),
                    "queue full, event dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                tracing::warn!(
                    subscriber = self.sub.name(),
                    seq = ev.seq,
                    kind = ev.kind.as_str(),
                    "worker gone, event dropped"
                );
            }
        }
    }
}

/// Async subscribers attached to one registry.
pub struct SubscriberSet {
    routes: Arc<[Route]>,
    workers: Vec<JoinHandle<()>>,
    listener: JoinHandle<()>,
    stop: CancellationToken,
    /// Stops the listener if the set is dropped without `shutdown`.
    _stop_on_drop: DropGuard,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber and a listener on `registry`'s bus.
    ///
    /// Only events published after this call are delivered. Must be called
    /// within a tokio runtime.
    #[must_use = "dropping the set stops delivering events"]
    pub fn attach(registry: &JobRegistry, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let (routes, workers): (Vec<Route>, Vec<JoinHandle<()>>) =
            subs.into_iter().map(spawn_worker).unzip();
        let routes: Arc<[Route]> = routes.into();

        let stop = CancellationToken::new();
        let listener = tokio::spawn(listen(
            registry.watch(),
            Arc::clone(&routes),
            stop.clone(),
        ));
        tracing::debug!(subscribers = routes.len(), "subscriber set attached");

        Self {
            routes,
            workers,
            listener,
            _stop_on_drop: stop.clone().drop_guard(),
            stop,
        }
    }

    /// Stops listening, delivers the events already published, and waits
    /// until every subscriber has processed its queue.
    pub async fn shutdown(self) {
        let SubscriberSet {
            routes,
            workers,
            listener,
            stop,
            _stop_on_drop,
        } = self;

        stop.cancel();
        let _ = listener.await;
        drop(routes);
        for worker in workers {
            let _ = worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

fn spawn_worker(sub: Arc<dyn Subscribe>) -> (Route, JoinHandle<()>) {
    let (queue, mut rx) = mpsc::channel::<RegistryEvent>(sub.queue_capacity().max(1));
    let worker_sub = Arc::clone(&sub);

    let handle = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let handled = std::panic::AssertUnwindSafe(worker_sub.on_event(&ev))
                .catch_unwind()
                .await;
            if let Err(panic_err) = handled {
                tracing::warn!(
                    subscriber = worker_sub.name(),
                    seq = ev.seq,
                    panic = %panic_message(panic_err.as_ref()),
                    "subscriber panicked"
                );
            }
        }
    });

    (Route { sub, queue }, handle)
}

async fn listen(
    mut rx: broadcast::Receiver<RegistryEvent>,
    routes: Arc<[Route]>,
    stop: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            next = rx.recv() => next,
        };
        match next {
            Ok(ev) => routes.iter().for_each(|r| r.offer(&ev)),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "subscriber set lagged behind the registry");
            }
            Err(RecvError::Closed) => return,
        }
    }

    // Stop requested: hand over what was published before it.
    loop {
        match rx.try_recv() {
            Ok(ev) => routes.iter().for_each(|r| r.offer(&ev)),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "subscriber set lagged behind the registry");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RegistryEventKind;
    use crate::jobs::testing::StubJob;
    use crate::status::JobStatus;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Collect {
        seen: Arc<Mutex<Vec<RegistryEventKind>>>,
        aggregate_only: bool,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, ev: &RegistryEvent) {
            self.seen.lock().push(ev.kind);
        }
        fn wants(&self, kind: RegistryEventKind) -> bool {
            !self.aggregate_only || kind.is_aggregate()
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Explode;

    #[async_trait]
    impl Subscribe for Explode {
        async fn on_event(&self, _ev: &RegistryEvent) {
            panic!("boom");
        }
    }

    fn collector(aggregate_only: bool) -> (Arc<Mutex<Vec<RegistryEventKind>>>, Arc<dyn Subscribe>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sub = Arc::new(Collect {
            seen: Arc::clone(&seen),
            aggregate_only,
        });
        (seen, sub)
    }

    #[tokio::test]
    async fn test_registry_events_reach_subscribers_in_order() {
        let registry = JobRegistry::new();
        let (seen, sub) = collector(false);
        let explode: Arc<dyn Subscribe> = Arc::new(Explode);
        let set = SubscriberSet::attach(&registry, vec![explode, sub]);
        assert_eq!(set.len(), 2);

        registry.register(StubJob::new(JobStatus::Running, None));
        set.shutdown().await;

        assert_eq!(
            *seen.lock(),
            vec![
                RegistryEventKind::MemberAdded,
                RegistryEventKind::CountChanged,
                RegistryEventKind::OverallStatusChanged,
                RegistryEventKind::OverallProgressChanged,
                RegistryEventKind::CanDisplayOverallProgressChanged,
            ]
        );
    }

    #[tokio::test]
    async fn test_kind_filter_skips_membership_events() {
        let registry = JobRegistry::new();
        let (seen, sub) = collector(true);
        let set = SubscriberSet::attach(&registry, vec![sub]);

        let job = StubJob::new(JobStatus::Running, None);
        registry.register(job.clone());
        job.set_status(JobStatus::Succeeded);
        set.shutdown().await;

        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(RegistryEventKind::is_aggregate));
    }

    #[tokio::test]
    async fn test_listener_ends_with_registry() {
        let registry = JobRegistry::new();
        let (seen, sub) = collector(false);
        let set = SubscriberSet::attach(&registry, vec![sub]);

        registry.register(StubJob::new(JobStatus::Paused, None));
        drop(registry);
        set.shutdown().await;
        assert_eq!(seen.lock().len(), 5);
    }
}
